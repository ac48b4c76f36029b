pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::{MindEaseConfig, Secrets};
pub use error::{MindEaseError, Result};
pub use events::SessionEvent;
pub use types::*;
