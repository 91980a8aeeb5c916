//! tsbind_binder: semantic binding for a TypeScript-style syntax tree.
//!
//! The binder walks a parsed file once and produces:
//! - symbols for every declaration, merged by name per their flags
//! - the symbol tables (locals, exports, members) of each container
//! - a control flow graph for later narrowing
//! - strict-mode, duplicate-declaration and reachability diagnostics
//!
//! Binding is a pure function of the tree and the compiler options; see
//! [`bind_source_file`] and, for many files at once, [`bind_program`].

mod binder;
pub mod binding;
pub mod container;
pub mod flow;
pub mod narrowing;
pub mod program;
pub mod symbol;

pub use binding::{bind_source_file, Binding, BoundFile, Pattern, PatternAmbientModule};
pub use container::{container_flags, ContainerFlags};
pub use flow::{FlowGraph, FlowNode, FlowNodeKind};
pub use program::{bind_program, FileBindStats, ProgramBindStats};
pub use symbol::{internal_names, Symbol, SymbolTable};
