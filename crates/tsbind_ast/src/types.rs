//! Flag sets and id handles shared by the AST and the binder.
//!
//! `NodeFlags` and `ModifierFlags` are written by the parser (and partly by
//! the binder); `SymbolFlags` and `FlowFlags` are binder output. The
//! `*_EXCLUDES` sets on `SymbolFlags` drive declaration merging: a new
//! declaration conflicts with an existing symbol when the symbol's flags
//! intersect the declaration's excludes.

use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Flags on AST nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct NodeFlags: u32 {
        const NONE                          = 0;
        const LET                           = 1 << 0;
        const CONST                         = 1 << 1;
        const USING                         = 1 << 2;
        const AWAIT_USING                   = 1 << 3;
        const NESTED_NAMESPACE              = 1 << 4;
        const NAMESPACE                     = 1 << 5;
        const OPTIONAL_CHAIN                = 1 << 6;
        const EXPORT_CONTEXT                = 1 << 7;
        const CONTAINS_THIS                 = 1 << 8;
        const HAS_IMPLICIT_RETURN           = 1 << 9;
        const HAS_EXPLICIT_RETURN           = 1 << 10;
        const GLOBAL_AUGMENTATION           = 1 << 11;
        const YIELD_CONTEXT                 = 1 << 12;
        const AWAIT_CONTEXT                 = 1 << 13;
        const AMBIENT                       = 1 << 14;
        const THIS_NODE_HAS_ERROR           = 1 << 15;
        const THIS_NODE_OR_ANY_SUB_NODES_HAS_ERROR = 1 << 16;

        const BLOCK_SCOPED = Self::LET.bits() | Self::CONST.bits() | Self::USING.bits() | Self::AWAIT_USING.bits();

        /// Flags the binder computes rather than reads.
        const BINDER_FLAGS = Self::EXPORT_CONTEXT.bits()
            | Self::CONTAINS_THIS.bits()
            | Self::HAS_IMPLICIT_RETURN.bits()
            | Self::HAS_EXPLICIT_RETURN.bits()
            | Self::THIS_NODE_OR_ANY_SUB_NODES_HAS_ERROR.bits();
    }
}

bitflags::bitflags! {
    /// Modifier flags for declarations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModifierFlags: u32 {
        const NONE              = 0;
        const EXPORT            = 1 << 0;
        const AMBIENT           = 1 << 1;
        const PUBLIC            = 1 << 2;
        const PRIVATE           = 1 << 3;
        const PROTECTED         = 1 << 4;
        const STATIC            = 1 << 5;
        const READONLY          = 1 << 6;
        const ACCESSOR          = 1 << 7;
        const ABSTRACT          = 1 << 8;
        const ASYNC             = 1 << 9;
        const DEFAULT           = 1 << 10;
        const CONST             = 1 << 11;
        const OVERRIDE          = 1 << 12;
        const IN                = 1 << 13;
        const OUT               = 1 << 14;
        const DECORATOR         = 1 << 15;

        const ACCESSIBILITY_MODIFIER = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        const PARAMETER_PROPERTY_MODIFIER = Self::ACCESSIBILITY_MODIFIER.bits() | Self::READONLY.bits() | Self::OVERRIDE.bits();
        const EXPORT_DEFAULT = Self::EXPORT.bits() | Self::DEFAULT.bits();
    }
}

impl ModifierFlags {
    /// Keyword text for each modifier, in the order a parser accepts them.
    pub const KEYWORDS: [(ModifierFlags, &'static str); 15] = [
        (ModifierFlags::EXPORT, "export"),
        (ModifierFlags::DEFAULT, "default"),
        (ModifierFlags::AMBIENT, "declare"),
        (ModifierFlags::PUBLIC, "public"),
        (ModifierFlags::PRIVATE, "private"),
        (ModifierFlags::PROTECTED, "protected"),
        (ModifierFlags::STATIC, "static"),
        (ModifierFlags::OVERRIDE, "override"),
        (ModifierFlags::READONLY, "readonly"),
        (ModifierFlags::ABSTRACT, "abstract"),
        (ModifierFlags::ACCESSOR, "accessor"),
        (ModifierFlags::ASYNC, "async"),
        (ModifierFlags::CONST, "const"),
        (ModifierFlags::IN, "in"),
        (ModifierFlags::OUT, "out"),
    ];
}

bitflags::bitflags! {
    /// Symbol flags: what kinds of declaration a symbol merges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SymbolFlags: u32 {
        const NONE                          = 0;
        const FUNCTION_SCOPED_VARIABLE      = 1 << 0;
        const BLOCK_SCOPED_VARIABLE         = 1 << 1;
        const PROPERTY                      = 1 << 2;
        const ENUM_MEMBER                   = 1 << 3;
        const FUNCTION                      = 1 << 4;
        const CLASS                         = 1 << 5;
        const INTERFACE                     = 1 << 6;
        const CONST_ENUM                    = 1 << 7;
        const REGULAR_ENUM                  = 1 << 8;
        const VALUE_MODULE                  = 1 << 9;
        const NAMESPACE_MODULE              = 1 << 10;
        const TYPE_LITERAL                  = 1 << 11;
        const OBJECT_LITERAL                = 1 << 12;
        const METHOD                        = 1 << 13;
        const CONSTRUCTOR                   = 1 << 14;
        const GET_ACCESSOR                  = 1 << 15;
        const SET_ACCESSOR                  = 1 << 16;
        const SIGNATURE                     = 1 << 17;
        const TYPE_PARAMETER                = 1 << 18;
        const TYPE_ALIAS                    = 1 << 19;
        const EXPORT_VALUE                  = 1 << 20;
        const ALIAS                         = 1 << 21;
        const PROTOTYPE                     = 1 << 22;
        const EXPORT_STAR                   = 1 << 23;
        const OPTIONAL                      = 1 << 24;
        const TRANSIENT                     = 1 << 25;
        const ASSIGNMENT                    = 1 << 26;
        const MODULE_EXPORTS                = 1 << 27;
        /// Module symbol whose instantiated content is only const enums.
        const CONST_ENUM_ONLY_MODULE        = 1 << 28;
        /// Property placeholder that a later method declaration may replace.
        const REPLACEABLE_BY_METHOD         = 1 << 29;
        const GLOBAL_LOOKUP                 = 1 << 30;

        const ALL = (1 << 31) - 1;

        const ENUM = Self::REGULAR_ENUM.bits() | Self::CONST_ENUM.bits();
        const VARIABLE = Self::FUNCTION_SCOPED_VARIABLE.bits() | Self::BLOCK_SCOPED_VARIABLE.bits();
        const VALUE = Self::VARIABLE.bits()
            | Self::PROPERTY.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::OBJECT_LITERAL.bits()
            | Self::FUNCTION.bits()
            | Self::CLASS.bits()
            | Self::ENUM.bits()
            | Self::VALUE_MODULE.bits()
            | Self::METHOD.bits()
            | Self::GET_ACCESSOR.bits()
            | Self::SET_ACCESSOR.bits();
        const TYPE = Self::CLASS.bits()
            | Self::INTERFACE.bits()
            | Self::ENUM.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::TYPE_LITERAL.bits()
            | Self::TYPE_PARAMETER.bits()
            | Self::TYPE_ALIAS.bits();
        const NAMESPACE = Self::VALUE_MODULE.bits()
            | Self::NAMESPACE_MODULE.bits()
            | Self::ENUM.bits();
        const MODULE = Self::VALUE_MODULE.bits() | Self::NAMESPACE_MODULE.bits();
        const ACCESSOR = Self::GET_ACCESSOR.bits() | Self::SET_ACCESSOR.bits();

        const CLASS_MEMBER = Self::METHOD.bits()
            | Self::ACCESSOR.bits()
            | Self::PROPERTY.bits();

        const CLASSIFIABLE = Self::CLASS.bits()
            | Self::ENUM.bits()
            | Self::TYPE_ALIAS.bits()
            | Self::INTERFACE.bits()
            | Self::TYPE_PARAMETER.bits()
            | Self::MODULE.bits()
            | Self::ALIAS.bits();

        // Merge exclusions. Variables merge with each other; interfaces,
        // namespaces, classes and functions merge along the usual lines.
        const FUNCTION_SCOPED_VARIABLE_EXCLUDES = Self::VALUE.bits() & !Self::FUNCTION_SCOPED_VARIABLE.bits();
        const BLOCK_SCOPED_VARIABLE_EXCLUDES = Self::VALUE.bits();
        const PARAMETER_EXCLUDES = Self::VALUE.bits();
        const PROPERTY_EXCLUDES = Self::NONE.bits();
        const ENUM_MEMBER_EXCLUDES = Self::VALUE.bits() | Self::TYPE.bits();
        const FUNCTION_EXCLUDES = Self::VALUE.bits()
            & !(Self::FUNCTION.bits() | Self::VALUE_MODULE.bits() | Self::CLASS.bits());
        const CLASS_EXCLUDES = (Self::VALUE.bits() | Self::TYPE.bits())
            & !(Self::VALUE_MODULE.bits() | Self::INTERFACE.bits() | Self::FUNCTION.bits());
        const INTERFACE_EXCLUDES = Self::TYPE.bits() & !(Self::INTERFACE.bits() | Self::CLASS.bits());
        const REGULAR_ENUM_EXCLUDES = (Self::VALUE.bits() | Self::TYPE.bits())
            & !(Self::REGULAR_ENUM.bits() | Self::VALUE_MODULE.bits());
        const CONST_ENUM_EXCLUDES = (Self::VALUE.bits() | Self::TYPE.bits()) & !Self::CONST_ENUM.bits();
        const VALUE_MODULE_EXCLUDES = Self::VALUE.bits()
            & !(Self::FUNCTION.bits() | Self::CLASS.bits() | Self::REGULAR_ENUM.bits() | Self::VALUE_MODULE.bits());
        const NAMESPACE_MODULE_EXCLUDES = Self::NONE.bits();
        const METHOD_EXCLUDES = Self::VALUE.bits() & !Self::METHOD.bits();
        const GET_ACCESSOR_EXCLUDES = Self::VALUE.bits() & !Self::SET_ACCESSOR.bits();
        const SET_ACCESSOR_EXCLUDES = Self::VALUE.bits() & !Self::GET_ACCESSOR.bits();
        const ACCESSOR_EXCLUDES = Self::VALUE.bits() & !Self::ACCESSOR.bits();
        const TYPE_PARAMETER_EXCLUDES = Self::TYPE.bits() & !Self::TYPE_PARAMETER.bits();
        const TYPE_ALIAS_EXCLUDES = Self::TYPE.bits();
        const ALIAS_EXCLUDES = Self::ALIAS.bits();
    }
}

bitflags::bitflags! {
    /// Flow node flags for control flow analysis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FlowFlags: u16 {
        const UNREACHABLE      = 1 << 0;
        const START            = 1 << 1;
        const BRANCH_LABEL     = 1 << 2;
        const LOOP_LABEL       = 1 << 3;
        const ASSIGNMENT       = 1 << 4;
        const TRUE_CONDITION   = 1 << 5;
        const FALSE_CONDITION  = 1 << 6;
        const SWITCH_CLAUSE    = 1 << 7;
        const ARRAY_MUTATION   = 1 << 8;
        const CALL             = 1 << 9;
        const REDUCE_LABEL     = 1 << 10;
        const REFERENCED       = 1 << 11;
        const SHARED           = 1 << 12;

        const LABEL = Self::BRANCH_LABEL.bits() | Self::LOOP_LABEL.bits();
        const CONDITION = Self::TRUE_CONDITION.bits() | Self::FALSE_CONDITION.bits();
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Index of a node in its `NodeArena`.
    NodeId
);
define_id!(
    /// Index of a symbol in a file's symbol arena.
    SymbolId
);
define_id!(
    /// Index of a flow node in a file's flow graph.
    FlowNodeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_excludes() {
        // var + var merge, var + let do not
        assert!(!SymbolFlags::FUNCTION_SCOPED_VARIABLE_EXCLUDES
            .intersects(SymbolFlags::FUNCTION_SCOPED_VARIABLE));
        assert!(SymbolFlags::BLOCK_SCOPED_VARIABLE_EXCLUDES.intersects(SymbolFlags::FUNCTION_SCOPED_VARIABLE));
        assert!(SymbolFlags::FUNCTION_SCOPED_VARIABLE_EXCLUDES.intersects(SymbolFlags::FUNCTION));
    }

    #[test]
    fn test_declaration_merging_excludes() {
        assert!(!SymbolFlags::INTERFACE_EXCLUDES.intersects(SymbolFlags::CLASS));
        assert!(!SymbolFlags::CLASS_EXCLUDES.intersects(SymbolFlags::INTERFACE | SymbolFlags::VALUE_MODULE));
        assert!(!SymbolFlags::VALUE_MODULE_EXCLUDES.intersects(SymbolFlags::FUNCTION | SymbolFlags::REGULAR_ENUM));
        assert!(SymbolFlags::CONST_ENUM_EXCLUDES.intersects(SymbolFlags::REGULAR_ENUM));
        assert!(SymbolFlags::GET_ACCESSOR_EXCLUDES.intersects(SymbolFlags::GET_ACCESSOR));
        assert!(!SymbolFlags::GET_ACCESSOR_EXCLUDES.intersects(SymbolFlags::SET_ACCESSOR));
    }

    #[test]
    fn test_all_covers_every_flag() {
        assert!(SymbolFlags::ALL.contains(SymbolFlags::GLOBAL_LOOKUP));
        assert!(SymbolFlags::ALL.contains(SymbolFlags::VALUE | SymbolFlags::TYPE | SymbolFlags::ALIAS));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(NodeId(3).to_string(), "NodeId(3)");
        assert_eq!(FlowNodeId::from_index(7).index(), 7);
    }
}
