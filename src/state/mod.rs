use std::sync::Arc;

use mongodb::Database;

use crate::realtime::dispatcher::UpdateQueue;
use crate::realtime::registry::SubscriptionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub registry: Arc<SubscriptionRegistry>,
    pub updates: UpdateQueue,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        registry: Arc<SubscriptionRegistry>,
        updates: UpdateQueue,
    ) -> Self {
        Self {
            db,
            registry,
            updates,
        }
    }
}
