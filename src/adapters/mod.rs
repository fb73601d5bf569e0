// Adapters layer: concrete implementations of the domain ports.

pub mod audit;
pub mod memory;
pub mod storage;

pub use audit::TracingAuditListener;
pub use memory::{InMemoryPlatform, PlatformSnapshot};
pub use storage::LocalStorage;
