// Application layer - The data synchronization core
pub mod bucket_cache;
pub mod bulk_loader;
pub mod coordinator;
pub mod scheduler;
pub mod status;
pub mod sync_core;
pub mod telemetry_client;
