mod arena;
mod mapping;

pub use arena::{MapperArena, MapperId};
pub use mapping::{BodyMapping, Fragment, MappingEdge, MatchPass, StatementId};
