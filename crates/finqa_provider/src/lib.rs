mod config;
mod error;
mod provider;
mod request;
mod response;
mod retry;

pub use config::*;
pub use error::*;
pub use provider::*;
pub use retry::*;
