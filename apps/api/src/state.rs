use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::editor::EditorRegistry;
use crate::generation::TextGenerationService;
use crate::persistence::PersistenceGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Resume storage plus the import staging and backup slots.
    pub gateway: PersistenceGateway,
    pub authenticator: Arc<dyn Authenticator>,
    pub generator: Arc<dyn TextGenerationService>,
    pub editors: EditorRegistry,
    pub config: Config,
}
