mod cli;
mod display;
mod evaluate;
mod logging;

pub use cli::*;
pub use display::*;
pub use evaluate::*;
pub use logging::*;
