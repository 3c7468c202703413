mod html;
mod panel;
mod tree;

pub use html::*;
pub use panel::*;
pub use tree::*;
