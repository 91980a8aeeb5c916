//! Symbol and symbol table definitions.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tsbind_ast::types::{NodeId, SymbolFlags, SymbolId};
use tsbind_core::intern::InternedString;

/// Reserved names for symbols that have no source name of their own.
pub mod internal_names {
    pub const CALL: &str = "__call";
    pub const CONSTRUCTOR: &str = "__constructor";
    pub const NEW: &str = "__new";
    pub const INDEX: &str = "__index";
    pub const EXPORT_STAR: &str = "__export";
    pub const GLOBAL: &str = "__global";
    pub const MISSING: &str = "__missing";
    pub const TYPE: &str = "__type";
    pub const OBJECT: &str = "__object";
    pub const CLASS: &str = "__class";
    pub const FUNCTION: &str = "__function";
    pub const COMPUTED: &str = "__computed";
    pub const DEFAULT: &str = "default";
    pub const EXPORT_EQUALS: &str = "export=";
    pub const PROTOTYPE: &str = "prototype";
}

/// A symbol represents a named entity in the program (variable, function,
/// class, interface, type, etc.) and collects every declaration of it.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Unique identifier for this symbol within its file.
    pub id: SymbolId,
    /// The name of this symbol (interned).
    pub name: InternedString,
    /// Union of the flags of every declaration merged into this symbol.
    pub flags: SymbolFlags,
    /// The declarations that contribute to this symbol, in bind order.
    pub declarations: Vec<NodeId>,
    /// The declaration that supplies the runtime value, if any.
    pub value_declaration: Option<NodeId>,
    /// Instance members (classes, interfaces, type and object literals).
    pub members: Option<SymbolTable>,
    /// Exports (modules, enums) and static members (classes).
    pub exports: Option<SymbolTable>,
    /// `export as namespace` declarations of a module file.
    pub global_exports: Option<SymbolTable>,
    /// The symbol whose table owns this one. Set once, never changed.
    pub parent: Option<SymbolId>,
    /// For the local half of an exported declaration, its export half.
    pub export_symbol: Option<SymbolId>,
    /// Whether a namespace holds nothing but const enums. `None` until a
    /// namespace declaration has been merged in.
    pub const_enum_only_module: Option<bool>,
}

impl Symbol {
    pub fn new(id: SymbolId, name: InternedString, flags: SymbolFlags) -> Self {
        Self {
            id,
            name,
            flags,
            declarations: Vec::new(),
            value_declaration: None,
            members: None,
            exports: None,
            global_exports: None,
            parent: None,
            export_symbol: None,
            const_enum_only_module: None,
        }
    }

    #[inline]
    pub fn has_flags(&self, flags: SymbolFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn is_const_enum_only_module(&self) -> bool {
        self.const_enum_only_module == Some(true)
    }

    /// Record the const-enum-only state, mirroring it into the flag bits.
    pub(crate) fn set_const_enum_only_module(&mut self, value: bool) {
        self.const_enum_only_module = Some(value);
        self.flags.set(SymbolFlags::CONST_ENUM_ONLY_MODULE, value);
    }

    /// The symbol that holds this one's value: the export half for an
    /// exported local, otherwise the symbol itself.
    pub fn export_or_self(&self) -> SymbolId {
        self.export_symbol.unwrap_or(self.id)
    }
}

/// A symbol table maps names to symbols.
///
/// Iteration follows insertion order so that every walk over a table is
/// deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: IndexMap<InternedString, SymbolId, FxBuildHasher>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: InternedString) -> Option<SymbolId> {
        self.table.get(&name).copied()
    }

    pub fn set(&mut self, name: InternedString, symbol: SymbolId) {
        self.table.insert(name, symbol);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InternedString, SymbolId)> + '_ {
        self.table.iter().map(|(name, id)| (*name, *id))
    }

    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.table.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbind_core::StringInterner;

    #[test]
    fn test_table_keeps_insertion_order() {
        let interner = StringInterner::new();
        let mut table = SymbolTable::new();
        for (i, name) in ["zeta", "alpha", "mid"].iter().enumerate() {
            table.set(interner.intern(name), SymbolId::from_index(i));
        }
        let names: Vec<&str> = table.iter().map(|(name, _)| interner.resolve(name)).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let interner = StringInterner::new();
        let mut table = SymbolTable::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        table.set(a, SymbolId(0));
        table.set(b, SymbolId(1));
        table.set(a, SymbolId(2));
        assert_eq!(table.get(a), Some(SymbolId(2)));
        assert_eq!(table.symbols().collect::<Vec<_>>(), vec![SymbolId(2), SymbolId(1)]);
    }

    #[test]
    fn test_const_enum_only_mirrors_flag() {
        let interner = StringInterner::new();
        let mut symbol = Symbol::new(SymbolId(0), interner.intern("N"), SymbolFlags::VALUE_MODULE);
        assert!(!symbol.is_const_enum_only_module());
        symbol.set_const_enum_only_module(true);
        assert!(symbol.has_flags(SymbolFlags::CONST_ENUM_ONLY_MODULE));
        symbol.set_const_enum_only_module(false);
        assert!(!symbol.has_flags(SymbolFlags::CONST_ENUM_ONLY_MODULE));
        assert_eq!(symbol.const_enum_only_module, Some(false));
    }
}
