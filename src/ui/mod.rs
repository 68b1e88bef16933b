mod help;
mod pane;
mod reader;
mod thread;

pub use help::*;
pub use pane::*;
pub use reader::*;
pub use thread::*;
