pub mod auth;
pub mod config;
pub mod db;
pub mod format;
pub mod share_code;
pub mod validators;
