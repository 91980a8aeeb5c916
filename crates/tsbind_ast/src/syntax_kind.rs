//! SyntaxKind: every token and node kind the binder distinguishes.
//!
//! Kinds are ordered so that token, keyword, assignment and statement
//! groups are contiguous; range checks use the `FIRST_*`/`LAST_*` markers.

use serde::{Deserialize, Serialize};

/// The kind of a syntax token or node in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // Literals
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    NoSubstitutionTemplateLiteral,

    // Operators
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    ExclamationToken,
    TildeToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionQuestionToken,
    CommaToken,
    QuestionToken,
    DotDotDotToken,
    QuestionDotToken,

    // Assignments
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    BarBarEqualsToken,
    AmpersandAmpersandEqualsToken,
    QuestionQuestionEqualsToken,

    // Identifiers
    Identifier,
    PrivateIdentifier,

    // ========================================================================
    // Keywords
    // ========================================================================

    // Reserved words
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    EnumKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SuperKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,

    // Strict mode reserved words
    ImplementsKeyword,
    InterfaceKeyword,
    LetKeyword,
    PackageKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    StaticKeyword,
    YieldKeyword,

    // Contextual keywords
    AbstractKeyword,
    AccessorKeyword,
    AsKeyword,
    AssertsKeyword,
    AnyKeyword,
    AsyncKeyword,
    AwaitKeyword,
    BooleanKeyword,
    ConstructorKeyword,
    DeclareKeyword,
    GetKeyword,
    InferKeyword,
    IsKeyword,
    KeyOfKeyword,
    ModuleKeyword,
    NamespaceKeyword,
    NeverKeyword,
    ReadonlyKeyword,
    RequireKeyword,
    NumberKeyword,
    ObjectKeyword,
    SetKeyword,
    StringKeyword,
    SymbolKeyword,
    TypeKeyword,
    UndefinedKeyword,
    UniqueKeyword,
    UnknownKeyword,
    FromKeyword,
    GlobalKeyword,
    BigIntKeyword,
    OverrideKeyword,
    OfKeyword,

    // ========================================================================
    // Nodes
    // ========================================================================

    // Names
    QualifiedName,
    ComputedPropertyName,

    // Signature elements
    TypeParameter,
    Parameter,

    // Type members
    PropertySignature,
    PropertyDeclaration,
    MethodSignature,
    MethodDeclaration,
    ClassStaticBlockDeclaration,
    Constructor,
    GetAccessor,
    SetAccessor,
    CallSignature,
    ConstructSignature,
    IndexSignature,

    // Types
    TypeReference,
    FunctionType,
    ConstructorType,
    TypeQuery,
    TypeLiteral,
    ArrayType,
    TupleType,
    UnionType,
    IntersectionType,
    ConditionalType,
    InferType,
    ParenthesizedType,
    ThisType,
    TypeOperator,
    IndexedAccessType,
    MappedType,
    LiteralType,

    // Binding patterns
    ObjectBindingPattern,
    ArrayBindingPattern,
    BindingElement,

    // Expressions
    ArrayLiteralExpression,
    ObjectLiteralExpression,
    PropertyAccessExpression,
    ElementAccessExpression,
    CallExpression,
    NewExpression,
    ParenthesizedExpression,
    FunctionExpression,
    ArrowFunction,
    DeleteExpression,
    TypeOfExpression,
    VoidExpression,
    AwaitExpression,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    BinaryExpression,
    ConditionalExpression,
    YieldExpression,
    SpreadElement,
    ClassExpression,
    OmittedExpression,
    ExpressionWithTypeArguments,
    AsExpression,
    NonNullExpression,
    MetaProperty,
    SatisfiesExpression,

    // Statements
    Block,
    EmptyStatement,
    VariableStatement,
    ExpressionStatement,
    IfStatement,
    DoStatement,
    WhileStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    ContinueStatement,
    BreakStatement,
    ReturnStatement,
    WithStatement,
    SwitchStatement,
    LabeledStatement,
    ThrowStatement,
    TryStatement,
    DebuggerStatement,

    // Declarations
    VariableDeclaration,
    VariableDeclarationList,
    FunctionDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    EnumDeclaration,
    ModuleDeclaration,
    ModuleBlock,
    CaseBlock,
    NamespaceExportDeclaration,
    ImportEqualsDeclaration,
    ImportDeclaration,
    ImportClause,
    NamespaceImport,
    NamedImports,
    ImportSpecifier,
    ExportAssignment,
    ExportDeclaration,
    NamedExports,
    NamespaceExport,
    ExportSpecifier,
    ExternalModuleReference,

    // Clauses
    CaseClause,
    DefaultClause,
    HeritageClause,
    CatchClause,

    // Property assignments
    PropertyAssignment,
    ShorthandPropertyAssignment,
    SpreadAssignment,

    // Enum
    EnumMember,

    // Top level
    SourceFile,
}

// Marker constants for SyntaxKind ranges.
impl SyntaxKind {
    pub const FIRST_ASSIGNMENT: SyntaxKind = SyntaxKind::EqualsToken;
    pub const LAST_ASSIGNMENT: SyntaxKind = SyntaxKind::QuestionQuestionEqualsToken;
    pub const FIRST_COMPOUND_ASSIGNMENT: SyntaxKind = SyntaxKind::PlusEqualsToken;
    pub const LAST_COMPOUND_ASSIGNMENT: SyntaxKind = SyntaxKind::QuestionQuestionEqualsToken;
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::OfKeyword;
    pub const FIRST_FUTURE_RESERVED_WORD: SyntaxKind = SyntaxKind::ImplementsKeyword;
    pub const LAST_FUTURE_RESERVED_WORD: SyntaxKind = SyntaxKind::YieldKeyword;
    pub const FIRST_TOKEN: SyntaxKind = SyntaxKind::Unknown;
    pub const LAST_TOKEN: SyntaxKind = SyntaxKind::OfKeyword;
    pub const FIRST_LITERAL_TOKEN: SyntaxKind = SyntaxKind::NumericLiteral;
    pub const LAST_LITERAL_TOKEN: SyntaxKind = SyntaxKind::NoSubstitutionTemplateLiteral;
    pub const FIRST_STATEMENT: SyntaxKind = SyntaxKind::VariableStatement;
    pub const LAST_STATEMENT: SyntaxKind = SyntaxKind::DebuggerStatement;
    pub const FIRST_NODE: SyntaxKind = SyntaxKind::QualifiedName;
}

impl SyntaxKind {
    /// Whether this kind is a token (including keywords) rather than a node.
    #[inline]
    pub fn is_token(self) -> bool {
        self <= SyntaxKind::LAST_TOKEN
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        self >= SyntaxKind::FIRST_KEYWORD && self <= SyntaxKind::LAST_KEYWORD
    }

    /// Whether this keyword is reserved only in strict mode code.
    #[inline]
    pub fn is_future_reserved_word(self) -> bool {
        self >= SyntaxKind::FIRST_FUTURE_RESERVED_WORD && self <= SyntaxKind::LAST_FUTURE_RESERVED_WORD
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        self >= SyntaxKind::FIRST_LITERAL_TOKEN && self <= SyntaxKind::LAST_LITERAL_TOKEN
    }

    #[inline]
    pub fn is_assignment_operator(self) -> bool {
        self >= SyntaxKind::FIRST_ASSIGNMENT && self <= SyntaxKind::LAST_ASSIGNMENT
    }

    #[inline]
    pub fn is_compound_assignment(self) -> bool {
        self >= SyntaxKind::FIRST_COMPOUND_ASSIGNMENT && self <= SyntaxKind::LAST_COMPOUND_ASSIGNMENT
    }

    /// `&&`, `||` and `??`.
    #[inline]
    pub fn is_logical_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::AmpersandAmpersandToken | SyntaxKind::BarBarToken | SyntaxKind::QuestionQuestionToken
        )
    }

    /// `&&=`, `||=` and `??=`.
    #[inline]
    pub fn is_logical_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::AmpersandAmpersandEqualsToken
                | SyntaxKind::BarBarEqualsToken
                | SyntaxKind::QuestionQuestionEqualsToken
        )
    }

    #[inline]
    pub fn is_logical_or_coalescing_assignment_operator(self) -> bool {
        self.is_logical_operator() || self.is_logical_assignment_operator()
    }

    #[inline]
    pub fn is_equality_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsEqualsToken
                | SyntaxKind::ExclamationEqualsToken
                | SyntaxKind::EqualsEqualsEqualsToken
                | SyntaxKind::ExclamationEqualsEqualsToken
        )
    }

    /// Whether this kind is a statement in the contiguous statement range
    /// (the kinds that record a flow node for reachability).
    #[inline]
    pub fn is_statement_range(self) -> bool {
        self >= SyntaxKind::FIRST_STATEMENT && self <= SyntaxKind::LAST_STATEMENT
    }

    #[inline]
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::MethodSignature
                | SyntaxKind::Constructor
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::CallSignature
                | SyntaxKind::ConstructSignature
                | SyntaxKind::IndexSignature
                | SyntaxKind::FunctionType
                | SyntaxKind::ConstructorType
        )
    }

    /// Function-likes that carry an implementation body.
    #[inline]
    pub fn is_function_like_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::Constructor
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
        )
    }

    #[inline]
    pub fn is_class_like(self) -> bool {
        matches!(self, SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression)
    }

    #[inline]
    pub fn is_binding_pattern(self) -> bool {
        matches!(self, SyntaxKind::ObjectBindingPattern | SyntaxKind::ArrayBindingPattern)
    }

    #[inline]
    pub fn is_iteration_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::DoStatement
                | SyntaxKind::WhileStatement
                | SyntaxKind::ForStatement
                | SyntaxKind::ForInStatement
                | SyntaxKind::ForOfStatement
        )
    }

    /// Declaration statements that cannot be the body of a label in strict code.
    #[inline]
    pub fn is_declaration_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::ClassDeclaration
                | SyntaxKind::InterfaceDeclaration
                | SyntaxKind::TypeAliasDeclaration
                | SyntaxKind::EnumDeclaration
                | SyntaxKind::ModuleDeclaration
                | SyntaxKind::ImportDeclaration
                | SyntaxKind::ImportEqualsDeclaration
                | SyntaxKind::ExportDeclaration
                | SyntaxKind::ExportAssignment
                | SyntaxKind::NamespaceExportDeclaration
        )
    }

    /// Statements that are not declarations, used for unreachable-code checks.
    #[inline]
    pub fn is_statement_but_not_declaration(self) -> bool {
        self.is_statement_range() || self == SyntaxKind::EmptyStatement
    }

    /// Get the keyword text for a keyword kind, or None if not a keyword.
    pub fn keyword_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::CaseKeyword => "case",
            SyntaxKind::CatchKeyword => "catch",
            SyntaxKind::ClassKeyword => "class",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::DebuggerKeyword => "debugger",
            SyntaxKind::DefaultKeyword => "default",
            SyntaxKind::DeleteKeyword => "delete",
            SyntaxKind::DoKeyword => "do",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::EnumKeyword => "enum",
            SyntaxKind::ExportKeyword => "export",
            SyntaxKind::ExtendsKeyword => "extends",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::FinallyKeyword => "finally",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::FunctionKeyword => "function",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ImportKeyword => "import",
            SyntaxKind::InKeyword => "in",
            SyntaxKind::InstanceOfKeyword => "instanceof",
            SyntaxKind::NewKeyword => "new",
            SyntaxKind::NullKeyword => "null",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::SuperKeyword => "super",
            SyntaxKind::SwitchKeyword => "switch",
            SyntaxKind::ThisKeyword => "this",
            SyntaxKind::ThrowKeyword => "throw",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::TryKeyword => "try",
            SyntaxKind::TypeOfKeyword => "typeof",
            SyntaxKind::VarKeyword => "var",
            SyntaxKind::VoidKeyword => "void",
            SyntaxKind::WhileKeyword => "while",
            SyntaxKind::WithKeyword => "with",
            SyntaxKind::ImplementsKeyword => "implements",
            SyntaxKind::InterfaceKeyword => "interface",
            SyntaxKind::LetKeyword => "let",
            SyntaxKind::PackageKeyword => "package",
            SyntaxKind::PrivateKeyword => "private",
            SyntaxKind::ProtectedKeyword => "protected",
            SyntaxKind::PublicKeyword => "public",
            SyntaxKind::StaticKeyword => "static",
            SyntaxKind::YieldKeyword => "yield",
            SyntaxKind::AbstractKeyword => "abstract",
            SyntaxKind::AccessorKeyword => "accessor",
            SyntaxKind::AsKeyword => "as",
            SyntaxKind::AssertsKeyword => "asserts",
            SyntaxKind::AnyKeyword => "any",
            SyntaxKind::AsyncKeyword => "async",
            SyntaxKind::AwaitKeyword => "await",
            SyntaxKind::BooleanKeyword => "boolean",
            SyntaxKind::ConstructorKeyword => "constructor",
            SyntaxKind::DeclareKeyword => "declare",
            SyntaxKind::GetKeyword => "get",
            SyntaxKind::InferKeyword => "infer",
            SyntaxKind::IsKeyword => "is",
            SyntaxKind::KeyOfKeyword => "keyof",
            SyntaxKind::ModuleKeyword => "module",
            SyntaxKind::NamespaceKeyword => "namespace",
            SyntaxKind::NeverKeyword => "never",
            SyntaxKind::ReadonlyKeyword => "readonly",
            SyntaxKind::RequireKeyword => "require",
            SyntaxKind::NumberKeyword => "number",
            SyntaxKind::ObjectKeyword => "object",
            SyntaxKind::SetKeyword => "set",
            SyntaxKind::StringKeyword => "string",
            SyntaxKind::SymbolKeyword => "symbol",
            SyntaxKind::TypeKeyword => "type",
            SyntaxKind::UndefinedKeyword => "undefined",
            SyntaxKind::UniqueKeyword => "unique",
            SyntaxKind::UnknownKeyword => "unknown",
            SyntaxKind::FromKeyword => "from",
            SyntaxKind::GlobalKeyword => "global",
            SyntaxKind::BigIntKeyword => "bigint",
            SyntaxKind::OverrideKeyword => "override",
            SyntaxKind::OfKeyword => "of",
            _ => return None,
        };
        Some(text)
    }

    /// Look up a keyword SyntaxKind from identifier text.
    pub fn from_keyword_text(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "break" => SyntaxKind::BreakKeyword,
            "case" => SyntaxKind::CaseKeyword,
            "catch" => SyntaxKind::CatchKeyword,
            "class" => SyntaxKind::ClassKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "debugger" => SyntaxKind::DebuggerKeyword,
            "default" => SyntaxKind::DefaultKeyword,
            "delete" => SyntaxKind::DeleteKeyword,
            "do" => SyntaxKind::DoKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "enum" => SyntaxKind::EnumKeyword,
            "export" => SyntaxKind::ExportKeyword,
            "extends" => SyntaxKind::ExtendsKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "finally" => SyntaxKind::FinallyKeyword,
            "for" => SyntaxKind::ForKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "if" => SyntaxKind::IfKeyword,
            "import" => SyntaxKind::ImportKeyword,
            "in" => SyntaxKind::InKeyword,
            "instanceof" => SyntaxKind::InstanceOfKeyword,
            "new" => SyntaxKind::NewKeyword,
            "null" => SyntaxKind::NullKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "super" => SyntaxKind::SuperKeyword,
            "switch" => SyntaxKind::SwitchKeyword,
            "this" => SyntaxKind::ThisKeyword,
            "throw" => SyntaxKind::ThrowKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "try" => SyntaxKind::TryKeyword,
            "typeof" => SyntaxKind::TypeOfKeyword,
            "var" => SyntaxKind::VarKeyword,
            "void" => SyntaxKind::VoidKeyword,
            "while" => SyntaxKind::WhileKeyword,
            "with" => SyntaxKind::WithKeyword,
            "implements" => SyntaxKind::ImplementsKeyword,
            "interface" => SyntaxKind::InterfaceKeyword,
            "let" => SyntaxKind::LetKeyword,
            "package" => SyntaxKind::PackageKeyword,
            "private" => SyntaxKind::PrivateKeyword,
            "protected" => SyntaxKind::ProtectedKeyword,
            "public" => SyntaxKind::PublicKeyword,
            "static" => SyntaxKind::StaticKeyword,
            "yield" => SyntaxKind::YieldKeyword,
            "abstract" => SyntaxKind::AbstractKeyword,
            "accessor" => SyntaxKind::AccessorKeyword,
            "as" => SyntaxKind::AsKeyword,
            "asserts" => SyntaxKind::AssertsKeyword,
            "any" => SyntaxKind::AnyKeyword,
            "async" => SyntaxKind::AsyncKeyword,
            "await" => SyntaxKind::AwaitKeyword,
            "boolean" => SyntaxKind::BooleanKeyword,
            "constructor" => SyntaxKind::ConstructorKeyword,
            "declare" => SyntaxKind::DeclareKeyword,
            "get" => SyntaxKind::GetKeyword,
            "infer" => SyntaxKind::InferKeyword,
            "is" => SyntaxKind::IsKeyword,
            "keyof" => SyntaxKind::KeyOfKeyword,
            "module" => SyntaxKind::ModuleKeyword,
            "namespace" => SyntaxKind::NamespaceKeyword,
            "never" => SyntaxKind::NeverKeyword,
            "readonly" => SyntaxKind::ReadonlyKeyword,
            "require" => SyntaxKind::RequireKeyword,
            "number" => SyntaxKind::NumberKeyword,
            "object" => SyntaxKind::ObjectKeyword,
            "set" => SyntaxKind::SetKeyword,
            "string" => SyntaxKind::StringKeyword,
            "symbol" => SyntaxKind::SymbolKeyword,
            "type" => SyntaxKind::TypeKeyword,
            "undefined" => SyntaxKind::UndefinedKeyword,
            "unique" => SyntaxKind::UniqueKeyword,
            "unknown" => SyntaxKind::UnknownKeyword,
            "from" => SyntaxKind::FromKeyword,
            "global" => SyntaxKind::GlobalKeyword,
            "bigint" => SyntaxKind::BigIntKeyword,
            "override" => SyntaxKind::OverrideKeyword,
            "of" => SyntaxKind::OfKeyword,
            _ => return None,
        };
        Some(kind)
    }

    /// Get the text of an operator token, or None.
    pub fn operator_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::EqualsEqualsEqualsToken => "===",
            SyntaxKind::ExclamationEqualsEqualsToken => "!==",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::CaretToken => "^",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::QuestionQuestionToken => "??",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::DotDotDotToken => "...",
            SyntaxKind::QuestionDotToken => "?.",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            SyntaxKind::PercentEqualsToken => "%=",
            SyntaxKind::AmpersandEqualsToken => "&=",
            SyntaxKind::BarEqualsToken => "|=",
            SyntaxKind::CaretEqualsToken => "^=",
            SyntaxKind::BarBarEqualsToken => "||=",
            SyntaxKind::AmpersandAmpersandEqualsToken => "&&=",
            SyntaxKind::QuestionQuestionEqualsToken => "??=",
            SyntaxKind::InKeyword => "in",
            SyntaxKind::InstanceOfKeyword => "instanceof",
            _ => return None,
        };
        Some(text)
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip_through_text() {
        for kind in [SyntaxKind::BreakKeyword, SyntaxKind::YieldKeyword, SyntaxKind::OfKeyword] {
            let text = kind.keyword_text().unwrap();
            assert_eq!(SyntaxKind::from_keyword_text(text), Some(kind));
        }
        assert_eq!(SyntaxKind::from_keyword_text("foo"), None);
    }

    #[test]
    fn test_ranges() {
        assert!(SyntaxKind::LetKeyword.is_future_reserved_word());
        assert!(SyntaxKind::YieldKeyword.is_future_reserved_word());
        assert!(!SyntaxKind::AwaitKeyword.is_future_reserved_word());
        assert!(SyntaxKind::QuestionQuestionEqualsToken.is_assignment_operator());
        assert!(!SyntaxKind::EqualsToken.is_compound_assignment());
        assert!(SyntaxKind::OfKeyword.is_token());
        assert!(!SyntaxKind::QualifiedName.is_token());
        assert!(SyntaxKind::DebuggerStatement.is_statement_range());
        assert!(!SyntaxKind::VariableDeclaration.is_statement_range());
    }
}
