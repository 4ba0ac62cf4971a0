mod agent;
mod extractor;
mod loader;
mod parser;
mod prompt;
mod refinement;
mod report;
mod retry;
mod runner;

pub use agent::*;
pub use extractor::*;
pub use loader::*;
pub use parser::*;
pub use prompt::*;
pub use refinement::*;
pub use report::*;
pub use retry::*;
pub use runner::*;
