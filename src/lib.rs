mod client;
mod diff;
mod error;
mod logger;
mod protocol;
mod retry;
mod state;
mod types;
pub mod vocabulary;
pub mod zones;

pub use client::{SkyFiClient, SkyFiClientBuilder};
pub use diff::Change;
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use protocol::{parse_response, CURRENT_SETTINGS, DEFAULT_PORT, HTTP_RESOURCES, ZONES};
pub use retry::{retry, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
pub use state::DeviceState;
pub use types::*;
