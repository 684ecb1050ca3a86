use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::gateway::CheckoutGateway;
use crate::realtime::Realtime;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub realtime: Realtime,
    pub gateway: Arc<dyn CheckoutGateway>,
    pub config: AppConfig,
}
