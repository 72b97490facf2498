// accessly-api: Async Rust client for the UniFi Access developer API.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::AccessClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
