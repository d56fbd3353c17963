use std::sync::Arc;

use crate::repositories::{ShareStore, VisitStore};
use crate::services::blob_store::BlobStore;
use crate::services::rate_limiter::FixedWindowRateLimiter;
use crate::services::share_service::ShareService;
use crate::utils::config::Config;

/// Shared handler state, registered once as `web::Data<AppState>`
pub struct AppState {
    pub visits: Arc<dyn VisitStore>,
    pub shares: ShareService,
    pub share_rate_limiter: FixedWindowRateLimiter,
}

impl AppState {
    pub fn new(
        visits: Arc<dyn VisitStore>,
        shares: Arc<dyn ShareStore>,
        blobs: Arc<dyn BlobStore>,
        config: &Config,
    ) -> Self {
        let window = chrono::Duration::seconds(config.share_rate_limit_window_secs as i64);

        Self {
            shares: ShareService::new(
                shares,
                Arc::clone(&visits),
                blobs,
                config.export_pixel_ratio,
                config.export_max_bytes,
            ),
            visits,
            share_rate_limiter: FixedWindowRateLimiter::new(config.share_rate_limit_max, window),
        }
    }
}
