//! tsbind_core: Core utilities shared by the binder crates.
//!
//! Provides string interning, text ranges and line maps used by the AST,
//! the diagnostics and the binder itself.

pub mod intern;
pub mod text;

pub use intern::{InternedString, StringInterner};
pub use text::{LineMap, TextRange, TextSpan};

/// Hash map with the fast, deterministic Fx hasher.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
/// Hash set with the fast, deterministic Fx hasher.
pub type FxHashSet<T> = rustc_hash::FxHashSet<T>;
