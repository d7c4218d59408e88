pub mod client;
pub mod config;
pub mod frame;
pub mod stream;

pub use client::StreamClient;
pub use config::{BackendConfig, ConfigParamsBuilder, ParamsConfig};
pub use stream::SessionStream;
