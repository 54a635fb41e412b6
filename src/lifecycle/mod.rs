//! Process lifecycle: explicit startup wiring and graceful shutdown.

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{init_app_state, StartupError};
