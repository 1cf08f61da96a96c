mod replay;
mod root;

pub use replay::{replay, ReplayCommand, ReplayStep};
pub use root::{Cli, Commands};
