pub mod signal;
pub mod walker;

pub use signal::{InterruptFlag, NeverStop, StopSignal};
pub use walker::{SourceFile, TreeWalker};
