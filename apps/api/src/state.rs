use std::sync::Arc;

use crate::checkout::CheckoutGateway;
use crate::config::Config;
use crate::render::RenderOptions;
use crate::storage::ArtifactStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<ArtifactStore>,
    /// Present only when a payment credential was configured at startup.
    pub checkout: Option<Arc<dyn CheckoutGateway>>,
    /// Locale, styles and page geometry for every rendered document.
    pub render: Arc<RenderOptions>,
}
