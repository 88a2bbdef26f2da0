//! Structural equivalence of presence-tracking trees.

pub mod engine;
pub mod options;
pub mod result;

pub use engine::{compare, compare_documents};
pub use options::{ComparisonMode, ComparisonOptions};
pub use result::{ComparisonResult, Difference};
