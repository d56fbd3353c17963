pub mod blob_store;
pub mod export;
pub mod map_renderer;
pub mod rate_limiter;
pub mod share_lifecycle;
pub mod share_service;
pub mod statistics;
