// Domain layer - Pure value types, no I/O
pub mod reading;
pub mod region;
pub mod snapshot;
