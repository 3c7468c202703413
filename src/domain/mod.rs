mod claude;
mod parse;
mod project;
mod relative_time;
mod stats;
mod types;
mod usage;

pub use claude::*;
pub use parse::*;
pub use project::*;
pub use relative_time::*;
pub use stats::*;
pub use types::*;
pub use usage::*;
