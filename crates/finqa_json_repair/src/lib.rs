mod error;
mod parser;
mod resilient;

pub use error::{JsonRepairError, Result};
pub use parser::{close_unbalanced, extract_json_block, json_repair};
pub use resilient::from_str;
