use std::sync::Arc;

use sqslite_queue::Dispatcher;

/// Shared application state handed to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}
