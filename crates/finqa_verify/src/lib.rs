mod config;
mod matcher;
mod number;
mod similarity;

pub use config::*;
pub use matcher::*;
pub use number::*;
pub use similarity::*;
