pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;

pub use client::{SpaceXApi, SpaceXClient};
pub use config::{CliArgs, ClientConfig, Command, DEFAULT_ENDPOINT};
pub use error::{ClientError, StoreError};
pub use logging::{LoggingConfig, init_logging};
pub use store::QueryStore;
