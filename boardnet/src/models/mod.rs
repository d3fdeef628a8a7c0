mod analysis;
mod graph;
mod member;

pub use analysis::*;
pub use graph::*;
pub use member::*;
