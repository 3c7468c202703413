mod claude;
mod codex;
mod history;
mod refresh;
mod stats;
mod watch;

pub use claude::*;
pub use codex::*;
pub use history::*;
pub use refresh::*;
pub use stats::*;
pub use watch::*;
