//! Utility modules for bitext-agent
//!
//! Currently this holds the structured logging setup; anything else that is
//! useful across modules but belongs to none of them lands here.

pub mod logging;

// Re-export commonly used items
pub use logging::{init_default, init_from_env, init_logging, LoggingConfig};
