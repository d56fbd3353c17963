use anyhow::{anyhow, Result};
use chrono::{Datelike, Utc};
use url::Url;

use crate::data::regions;
use crate::utils::share_code::SHARE_CODE_ALPHABET;

pub const SHARE_CODE_LENGTH: usize = 8;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_NOTES_LENGTH: usize = 2000;
pub const EARLIEST_VISIT_YEAR: i32 = 1900;

/// Validate that a string is an http(s) URL and return it without a trailing slash
pub fn validate_base_url(url_str: &str) -> Result<String> {
    let url = Url::parse(url_str).map_err(|e| anyhow!("Invalid URL format: {}", e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!(
            "URL must use http or https scheme, got: {}",
            url.scheme()
        ));
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL must have a host"));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Share codes are exactly 8 characters from the unambiguous alphabet
pub fn is_valid_share_code(code: &str) -> bool {
    code.len() == SHARE_CODE_LENGTH && code.bytes().all(|b| SHARE_CODE_ALPHABET.contains(&b))
}

pub fn validate_rating(rating: i32, field: &str) -> Result<()> {
    if !(0..=5).contains(&rating) {
        return Err(anyhow!("{} must be between 0 and 5", field));
    }
    Ok(())
}

pub fn validate_visit_year(year: i32) -> Result<()> {
    let latest = Utc::now().year() + 1;
    if year < EARLIEST_VISIT_YEAR || year > latest {
        return Err(anyhow!(
            "Visit year must be between {} and {}",
            EARLIEST_VISIT_YEAR,
            latest
        ));
    }
    Ok(())
}

pub fn validate_region(region_id: &str) -> Result<()> {
    if regions::find(region_id).is_none() {
        return Err(anyhow!("Unknown region '{}'", region_id));
    }
    Ok(())
}

pub fn validate_notes(notes: &str) -> Result<()> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(anyhow!(
            "Notes must be at most {} characters",
            MAX_NOTES_LENGTH
        ));
    }
    Ok(())
}

/// Validate a share title and return the trimmed value
pub fn validate_share_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Title is required"));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(anyhow!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional description; blank descriptions become `None`
pub fn validate_share_description(description: Option<&str>) -> Result<Option<String>> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(anyhow!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_LENGTH
        ));
    }
    Ok(Some(description.to_string()))
}
