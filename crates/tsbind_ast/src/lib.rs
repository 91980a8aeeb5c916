//! tsbind_ast: syntax tree consumed by the binder.
//!
//! Nodes live in a per-file `NodeArena` and are addressed by `NodeId`.
//! `AstBuilder` constructs trees (with consistent text ranges) for tests and
//! tools that do not go through a parser.

pub mod builder;
pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod utilities;
pub mod visitor;

pub use builder::AstBuilder;
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
pub use visitor::{children, for_each_child};
