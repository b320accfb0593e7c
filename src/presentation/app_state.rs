// Application state for HTTP handlers
use crate::application::sync_core::SyncCore;

pub struct AppState {
    pub core: SyncCore,
}
