//! Shared application state.

use std::sync::Arc;

use pos_db::Gateway;

use crate::auth::JwtManager;

/// State handed to every handler. Cheap to clone: everything is behind
/// an Arc.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, jwt: JwtManager) -> Self {
        AppState {
            gateway,
            jwt: Arc::new(jwt),
        }
    }
}
