mod replacement;

pub use replacement::{Replacement, ReplacementKind};
