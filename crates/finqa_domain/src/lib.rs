mod answer;
mod chat;
mod error;
mod format;
mod message;
mod record;
mod retry_config;
mod session;
mod transcript;
mod transformer;

pub use answer::*;
pub use chat::*;
pub use error::*;
pub use format::*;
pub use message::*;
pub use record::*;
pub use retry_config::*;
pub use session::*;
pub use transcript::*;
pub use transformer::*;
