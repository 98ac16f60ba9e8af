/*
 * Refminer Core - Structural Refactoring Detection Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Declaration model (Model, TypeDeclaration, Operation, Statement, Expression, Span)
 * - features/    : Vertical slices (replacement → body_mapper → model_diff → refactoring)
 * - config/      : Presets, stage configs, YAML loading
 * - pipeline/    : Orchestration (front-end port, cancellation, parallel join)
 *
 * Performance:
 * - Rayon work-stealing over type pairs and speculative body mappings
 * - Two-phase candidate filtering before any body mapping
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Matching helpers take both snapshots plus context
#![allow(clippy::type_complexity)] // Candidate tuples are local and short-lived
#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::collapsible_else_if)] // else if clarity
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::derivable_impls)] // Manual impl for documentation
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::needless_range_loop)] // Range loop for indexing
#![allow(clippy::match_like_matches_macro)] // Match for readability
#![allow(clippy::large_enum_variant)] // Refactoring variants are stored once per run

pub mod config;
pub mod errors;
pub mod features;
pub mod pipeline;
pub mod shared;

pub use errors::{MinerError, Result};
pub use features::refactoring::{Refactoring, RefactoringKind, RefactoringReport};
pub use pipeline::{
    CancellationToken, FrontEnd, FrontEndError, MinedSnapshots, MiningResult,
    RefactoringDetectionUseCase, RefactoringMiner, SkippedFile, SourceSnapshot,
};
pub use shared::models::{
    Annotation, Attribute, AttributeRef, Body, Branch, BranchKind, Expression, ExpressionKind,
    LiteralKind, LocalVariable, Model, Modifier, Operation, OperationRef, Parameter, Span,
    Statement, StatementKind, TypeDeclaration, TypeKind, TypeRef, Visibility,
};
