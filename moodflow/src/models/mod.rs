mod common;
mod entry;
mod insight;
mod place;
mod report;

pub use common::*;
pub use entry::*;
pub use insight::*;
pub use place::*;
pub use report::*;
