//! Ports to the outside world

use super::error::FrontEndError;
use crate::shared::models::TypeDeclaration;

/// Parsing front end: turns one source file into declaration trees
///
/// Implementations must attach spans to every declaration and fill in
/// canonical statement/expression text (the `builders` module does this for
/// front ends that build models programmatically). An empty `file_path` on a
/// returned declaration is filled with `path`.
pub trait FrontEnd: Send + Sync {
    fn parse(&self, path: &str, source: &str) -> Result<Vec<TypeDeclaration>, FrontEndError>;
}
