//! Player lifecycle
//!
//! [`LivePlayer`] validates a [`PlayerConfig`], spawns the event loop and
//! exposes manual reconnect and destroy. The loop itself lives in
//! [`Orchestrator`].

pub mod callbacks;
pub mod config;
pub mod handle;
pub mod orchestrator;

pub use callbacks::Callbacks;
pub use config::PlayerConfig;
pub use handle::{LivePlayer, PlayerBackend};
pub use orchestrator::Orchestrator;
