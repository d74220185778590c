use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::store::UserStore;
use crate::email::Mailer;

/// Shared application state handed to every handler.
///
/// Configuration is injected here once at startup instead of being read
/// from the process environment at call time, so tests can construct the
/// whole router with fixture config, an in-memory store and a recording
/// mailer.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub mailer: Arc<dyn Mailer>,
}
