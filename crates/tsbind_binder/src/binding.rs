//! Per-file binder output.
//!
//! The AST is never written to. Everything the binder learns about a file
//! lands in a [`Binding`]: the symbol arena, side tables keyed by `NodeId`,
//! the flow graph and the diagnostics.

use crate::binder::Binder;
use crate::flow::FlowGraph;
use crate::symbol::{Symbol, SymbolTable};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::sync::OnceLock;
use tsbind_ast::node::SourceFile;
use tsbind_ast::types::{FlowNodeId, NodeFlags, NodeId, SymbolId};
use tsbind_core::intern::{InternedString, StringInterner};
use tsbind_core::FxHashMap;
use tsbind_diagnostics::{Diagnostic, DiagnosticCollection};
use tsbind_options::CompilerOptions;

/// A module name pattern with at most one `*`, as in
/// `declare module "*.css"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub prefix: String,
    /// Text after the `*`; `None` when the pattern has no wildcard.
    pub suffix: Option<String>,
}

impl Pattern {
    /// Returns `None` when `text` has more than one `*`.
    pub fn parse(text: &str) -> Option<Pattern> {
        let mut parts = text.splitn(3, '*');
        let prefix = parts.next().unwrap_or_default().to_string();
        let suffix = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return None;
        }
        Some(Pattern { prefix, suffix })
    }

    pub fn has_wildcard(&self) -> bool {
        self.suffix.is_some()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.suffix {
            None => candidate == self.prefix,
            Some(suffix) => {
                candidate.len() >= self.prefix.len() + suffix.len()
                    && candidate.starts_with(&self.prefix)
                    && candidate.ends_with(suffix.as_str())
            }
        }
    }
}

/// An ambient module declared with a wildcard name.
#[derive(Debug, Clone)]
pub struct PatternAmbientModule {
    pub pattern: Pattern,
    pub symbol: SymbolId,
}

/// Everything binding one file produced.
pub struct Binding {
    pub(crate) interner: StringInterner,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) file_symbol: Option<SymbolId>,
    pub(crate) node_symbols: Vec<Option<SymbolId>>,
    pub(crate) local_symbols: FxHashMap<NodeId, SymbolId>,
    pub(crate) locals: FxHashMap<NodeId, SymbolTable>,
    pub(crate) parents: Vec<Option<NodeId>>,
    pub(crate) node_flags: Vec<NodeFlags>,
    pub(crate) flow: FlowGraph,
    pub(crate) flow_nodes: Vec<Option<FlowNodeId>>,
    pub(crate) end_flow_nodes: FxHashMap<NodeId, FlowNodeId>,
    pub(crate) return_flow_nodes: FxHashMap<NodeId, FlowNodeId>,
    pub(crate) fallthrough_flow_nodes: FxHashMap<NodeId, FlowNodeId>,
    pub(crate) possibly_exhaustive: FxHashMap<NodeId, bool>,
    pub(crate) classifiable_names: IndexSet<InternedString, FxBuildHasher>,
    pub(crate) pattern_ambient_modules: Vec<PatternAmbientModule>,
    pub(crate) container_chain: Vec<NodeId>,
    pub(crate) diagnostics: DiagnosticCollection,
    pub(crate) suggestions: Vec<Diagnostic>,
}

impl Binding {
    // ========================================================================
    // Symbols
    // ========================================================================

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// The symbol a declaration was merged into.
    pub fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(node.index()).copied().flatten()
    }

    /// The local `EXPORT_VALUE` half of an exported declaration.
    pub fn local_symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.local_symbols.get(&node).copied()
    }

    pub fn locals_of(&self, container: NodeId) -> Option<&SymbolTable> {
        self.locals.get(&container)
    }

    /// The symbol of an external module file.
    pub fn file_symbol(&self) -> Option<SymbolId> {
        self.file_symbol
    }

    /// Resolve a symbol's name.
    pub fn name_of(&self, id: SymbolId) -> &str {
        self.interner.resolve(self.symbol(id).name)
    }

    /// Look up `name` in a table without interning it first.
    pub fn lookup(&self, table: &SymbolTable, name: &str) -> Option<SymbolId> {
        table.get(self.interner.intern(name))
    }

    /// Look up a name among a container's locals.
    pub fn local(&self, container: NodeId, name: &str) -> Option<SymbolId> {
        self.locals_of(container).and_then(|table| self.lookup(table, name))
    }

    /// Look up a name among a symbol's exports.
    pub fn export(&self, symbol: SymbolId, name: &str) -> Option<SymbolId> {
        self.symbol(symbol)
            .exports
            .as_ref()
            .and_then(|table| self.lookup(table, name))
    }

    /// Look up a name among a symbol's members.
    pub fn member(&self, symbol: SymbolId, name: &str) -> Option<SymbolId> {
        self.symbol(symbol)
            .members
            .as_ref()
            .and_then(|table| self.lookup(table, name))
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Names of classes, interfaces and other type-bearing declarations,
    /// in first-declared order.
    pub fn classifiable_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.classifiable_names.iter().map(|name| self.interner.resolve(*name))
    }

    pub fn pattern_ambient_modules(&self) -> &[PatternAmbientModule] {
        &self.pattern_ambient_modules
    }

    /// Every container that owns locals, in the order they were entered.
    pub fn container_chain(&self) -> &[NodeId] {
        &self.container_chain
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(node.index()).copied().flatten()
    }

    /// Flags the binder computed for `node`; parser flags stay on the AST.
    pub fn binder_flags(&self, node: NodeId) -> NodeFlags {
        self.node_flags.get(node.index()).copied().unwrap_or_default()
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    pub fn flow(&self) -> &FlowGraph {
        &self.flow
    }

    /// The flow node current when `node` was reached.
    pub fn flow_node_of(&self, node: NodeId) -> Option<FlowNodeId> {
        self.flow_nodes.get(node.index()).copied().flatten()
    }

    pub fn end_flow_of(&self, node: NodeId) -> Option<FlowNodeId> {
        self.end_flow_nodes.get(&node).copied()
    }

    pub fn return_flow_of(&self, node: NodeId) -> Option<FlowNodeId> {
        self.return_flow_nodes.get(&node).copied()
    }

    pub fn fallthrough_flow_of(&self, clause: NodeId) -> Option<FlowNodeId> {
        self.fallthrough_flow_nodes.get(&clause).copied()
    }

    /// For a switch statement: no `default` clause and no clause falls out
    /// of the switch.
    pub fn is_possibly_exhaustive(&self, switch_statement: NodeId) -> bool {
        self.possibly_exhaustive.get(&switch_statement).copied().unwrap_or(false)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn suggestions(&self) -> &[Diagnostic] {
        &self.suggestions
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("symbols", &self.symbols.len())
            .field("flow_nodes", &self.flow.len())
            .field("diagnostics", &self.diagnostics.len())
            .field("suggestions", &self.suggestions.len())
            .finish_non_exhaustive()
    }
}

/// Bind one source file.
#[tracing::instrument(level = "debug", skip_all, fields(file = %file.file_name))]
pub fn bind_source_file(file: &SourceFile, options: &CompilerOptions) -> Binding {
    Binder::new(file, options).bind_file()
}

/// A source file together with its binding, computed on first use.
#[derive(Debug)]
pub struct BoundFile {
    pub source: SourceFile,
    binding: OnceLock<Binding>,
}

impl BoundFile {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            binding: OnceLock::new(),
        }
    }

    /// Bind the file unless it already is; later calls return the first
    /// binding whatever options they pass.
    pub fn bind(&self, options: &CompilerOptions) -> &Binding {
        self.binding.get_or_init(|| bind_source_file(&self.source, options))
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.get()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_without_wildcard_matches_exactly() {
        let pattern = Pattern::parse("fs").unwrap();
        assert!(!pattern.has_wildcard());
        assert!(pattern.matches("fs"));
        assert!(!pattern.matches("fs/promises"));
    }

    #[test]
    fn test_pattern_with_wildcard() {
        let pattern = Pattern::parse("*.css").unwrap();
        assert!(pattern.has_wildcard());
        assert_eq!(pattern.prefix, "");
        assert!(pattern.matches("app.css"));
        assert!(!pattern.matches("app.scss.map"));
    }

    #[test]
    fn test_pattern_prefix_and_suffix_do_not_overlap() {
        let pattern = Pattern::parse("ab*ba").unwrap();
        assert!(pattern.matches("abba"));
        assert!(!pattern.matches("aba"), "Expected prefix and suffix to need their own characters");
    }

    #[test]
    fn test_pattern_rejects_two_wildcards() {
        assert!(Pattern::parse("*/*").is_none());
    }
}
