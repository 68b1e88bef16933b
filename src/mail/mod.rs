mod navigation;
mod path;
mod quote;
mod source;
mod threading;
mod types;

pub use navigation::*;
pub use path::*;
pub use quote::*;
pub use source::*;
pub use threading::*;
pub use types::*;
