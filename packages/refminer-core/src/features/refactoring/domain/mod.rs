mod refactoring;
mod report;

pub use refactoring::{ClaimGroup, DeclarationPair, Refactoring, RefactoringKind};
pub use report::{CodeElement, RefactoringReport};
