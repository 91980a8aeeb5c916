//! tsbind_diagnostics: Diagnostic messages and reporting infrastructure.
//!
//! Binding never fails; everything it has to say about a file is a
//! [`Diagnostic`]. Messages carry the numeric codes used by TypeScript
//! tooling so downstream consumers can filter on them.

use serde::Serialize;
use std::fmt;
use tsbind_core::text::TextSpan;

/// Diagnostic category, matching TypeScript's DiagnosticCategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Suggestion => write!(f, "suggestion"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 2300).
    pub code: u32,
    /// The default category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// The file this diagnostic is attached to, if any.
    pub file: Option<String>,
    /// The source span, if any.
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
    /// Secondary locations, e.g. the other sites of a duplicate.
    pub related_information: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create a diagnostic without location info (global diagnostic).
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic with file and span info.
    pub fn with_location(
        file: impl Into<String>,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file.into()),
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Add related diagnostic information.
    pub fn with_related(mut self, related: Diagnostic) -> Self {
        self.related_information.push(related);
        self
    }

    /// Override the message's default category.
    pub fn with_category(mut self, category: DiagnosticCategory) -> Self {
        self.category = category;
        self
    }

    pub fn add_related(&mut self, related: Diagnostic) {
        self.related_information.push(related);
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} TS{}: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, etc. in a message template with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated while binding a file, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Diagnostics with the given code, in report order.
    pub fn with_code(&self, code: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort diagnostics by file and position. Stable, so diagnostics at the
    /// same position keep their report order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file.cmp(&b.file).then_with(|| {
                let a_pos = a.span.map(|s| s.start).unwrap_or(0);
                let b_pos = b.span.map(|s| s.start).unwrap_or(0);
                a_pos.cmp(&b_pos)
            })
        });
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

// ============================================================================
// Binder diagnostic messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Message, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, message: $msg }
        };
    }

    // ========================================================================
    // Strict mode (1100-1299)
    // ========================================================================
    pub const INVALID_USE_OF_0_IN_STRICT_MODE: DiagnosticMessage = diag!(1100, Error, "Invalid use of '{0}' in strict mode.");
    pub const WITH_STATEMENTS_ARE_NOT_ALLOWED_IN_STRICT_MODE: DiagnosticMessage = diag!(1101, Error, "'with' statements are not allowed in strict mode.");
    pub const DELETE_CANNOT_BE_CALLED_ON_AN_IDENTIFIER_IN_STRICT_MODE: DiagnosticMessage = diag!(1102, Error, "'delete' cannot be called on an identifier in strict mode.");
    pub const MODIFIERS_CANNOT_APPEAR_HERE: DiagnosticMessage = diag!(1184, Error, "Modifiers cannot appear here.");
    pub const CODE_CONTAINED_IN_A_CLASS_IS_EVALUATED_IN_STRICT_MODE_0: DiagnosticMessage = diag!(1210, Error, "Code contained in a class is evaluated in JavaScript's strict mode which does not allow this use of '{0}'. For more information, see https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Strict_mode.");
    pub const IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_IN_STRICT_MODE: DiagnosticMessage = diag!(1212, Error, "Identifier expected. '{0}' is a reserved word in strict mode.");
    pub const IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_IN_STRICT_MODE_CLASS: DiagnosticMessage = diag!(1213, Error, "Identifier expected. '{0}' is a reserved word in strict mode. Class definitions are automatically in strict mode.");
    pub const IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_IN_STRICT_MODE_MODULE: DiagnosticMessage = diag!(1214, Error, "Identifier expected. '{0}' is a reserved word in strict mode. Modules are automatically in strict mode.");
    pub const INVALID_USE_OF_0_MODULES_ARE_AUTOMATICALLY_IN_STRICT_MODE: DiagnosticMessage = diag!(1215, Error, "Invalid use of '{0}'. Modules are automatically in strict mode.");
    pub const FUNCTION_DECLARATIONS_NOT_ALLOWED_IN_BLOCKS_ES5: DiagnosticMessage = diag!(1250, Error, "Function declarations are not allowed inside blocks in strict mode when targeting 'ES5'.");
    pub const FUNCTION_DECLARATIONS_NOT_ALLOWED_IN_BLOCKS_ES5_CLASS: DiagnosticMessage = diag!(1251, Error, "Function declarations are not allowed inside blocks in strict mode when targeting 'ES5'. Class definitions are automatically in strict mode.");
    pub const FUNCTION_DECLARATIONS_NOT_ALLOWED_IN_BLOCKS_ES5_MODULE: DiagnosticMessage = diag!(1252, Error, "Function declarations are not allowed inside blocks in strict mode when targeting 'ES5'. Modules are automatically in strict mode.");
    pub const IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_AT_THE_TOP_LEVEL_OF_A_MODULE: DiagnosticMessage = diag!(1262, Error, "Identifier expected. '{0}' is a reserved word at the top-level of a module.");

    // ========================================================================
    // Declarations and modules
    // ========================================================================
    pub const GLOBAL_MODULE_EXPORTS_MAY_ONLY_APPEAR_IN_MODULE_FILES: DiagnosticMessage = diag!(1314, Error, "Global module exports may only appear in module files.");
    pub const GLOBAL_MODULE_EXPORTS_MAY_ONLY_APPEAR_IN_DECLARATION_FILES: DiagnosticMessage = diag!(1315, Error, "Global module exports may only appear in declaration files.");
    pub const GLOBAL_MODULE_EXPORTS_MAY_ONLY_APPEAR_AT_TOP_LEVEL: DiagnosticMessage = diag!(1316, Error, "Global module exports may only appear at top level.");
    pub const A_LABEL_IS_NOT_ALLOWED_HERE: DiagnosticMessage = diag!(1344, Error, "A label is not allowed here.");
    pub const IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_THAT_CANNOT_BE_USED_HERE: DiagnosticMessage = diag!(1359, Error, "Identifier expected. '{0}' is a reserved word that cannot be used here.");
    pub const DID_YOU_MEAN_0: DiagnosticMessage = diag!(1369, Message, "Did you mean '{0}'?");
    pub const DUPLICATE_IDENTIFIER_0: DiagnosticMessage = diag!(2300, Error, "Duplicate identifier '{0}'.");
    pub const CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE_0: DiagnosticMessage = diag!(2451, Error, "Cannot redeclare block-scoped variable '{0}'.");
    pub const A_MODULE_CANNOT_HAVE_MULTIPLE_DEFAULT_EXPORTS: DiagnosticMessage = diag!(2528, Error, "A module cannot have multiple default exports.");
    pub const ENUM_DECLARATIONS_CAN_ONLY_MERGE_WITH_NAMESPACE_OR_OTHER_ENUM_DECLARATIONS: DiagnosticMessage = diag!(2567, Error, "Enum declarations can only merge with namespace or other enum declarations.");
    pub const EXPORT_MODIFIER_CANNOT_BE_APPLIED_TO_AMBIENT_MODULES: DiagnosticMessage = diag!(2668, Error, "'export' modifier cannot be applied to ambient modules and module augmentations since they are always visible.");
    pub const THE_FIRST_EXPORT_DEFAULT_IS_HERE: DiagnosticMessage = diag!(2752, Error, "The first export default is here.");
    pub const ANOTHER_EXPORT_DEFAULT_IS_HERE: DiagnosticMessage = diag!(2753, Error, "Another export default is here.");
    pub const PATTERN_0_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER: DiagnosticMessage = diag!(5061, Error, "Pattern '{0}' can have at most one '*' character.");
    pub const AND_HERE: DiagnosticMessage = diag!(6204, Message, "and here.");

    // ========================================================================
    // Reachability and labels (7000-7099)
    // ========================================================================
    pub const UNREACHABLE_CODE_DETECTED: DiagnosticMessage = diag!(7027, Error, "Unreachable code detected.");
    pub const UNUSED_LABEL: DiagnosticMessage = diag!(7028, Error, "Unused label.");

    // ========================================================================
    // Private names (18000+)
    // ========================================================================
    pub const CONSTRUCTOR_IS_A_RESERVED_WORD: DiagnosticMessage = diag!(18012, Error, "'#constructor' is a reserved word.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message("Duplicate identifier '{0}'.", &["x"]);
        assert_eq!(msg, "Duplicate identifier 'x'.");
    }

    #[test]
    fn test_format_message_no_args() {
        let msg = format_message("Unreachable code detected.", &[]);
        assert_eq!(msg, "Unreachable code detected.");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_location(
            "test.ts",
            TextSpan::new(10, 5),
            &messages::DUPLICATE_IDENTIFIER_0,
            &["foo"],
        );
        let display = format!("{}", diag);
        assert_eq!(display, "test.ts(10): error TS2300: Duplicate identifier 'foo'.");
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diag = Diagnostic::new(&messages::UNREACHABLE_CODE_DETECTED, &[]);
        assert!(diag.file.is_none());
        assert!(diag.span.is_none());
        assert_eq!(diag.code, 7027);
        assert!(diag.is_error());
    }

    #[test]
    fn test_downgrade_to_suggestion() {
        let diag = Diagnostic::new(&messages::UNUSED_LABEL, &[]).with_category(DiagnosticCategory::Suggestion);
        assert!(!diag.is_error());
        assert_eq!(diag.to_string(), "suggestion TS7028: Unused label.");
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.is_empty());

        collection.add(Diagnostic::new(&messages::DUPLICATE_IDENTIFIER_0, &["a"]));
        collection.add(Diagnostic::new(&messages::DID_YOU_MEAN_0, &["b"]));
        assert!(collection.has_errors());
        assert_eq!(collection.error_count(), 1);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.with_code(1369).count(), 1);
    }

    #[test]
    fn test_diagnostic_collection_sort() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::with_location("b.ts", TextSpan::new(10, 1), &messages::UNUSED_LABEL, &[]));
        collection.add(Diagnostic::with_location("a.ts", TextSpan::new(9, 1), &messages::UNUSED_LABEL, &[]));
        collection.add(Diagnostic::with_location("a.ts", TextSpan::new(5, 1), &messages::UNUSED_LABEL, &[]));
        collection.sort();
        let starts: Vec<_> = collection
            .iter()
            .map(|d| (d.file.clone().unwrap_or_default(), d.span.map(|s| s.start)))
            .collect();
        assert_eq!(
            starts,
            vec![
                ("a.ts".to_string(), Some(5)),
                ("a.ts".to_string(), Some(9)),
                ("b.ts".to_string(), Some(10)),
            ]
        );
    }

    #[test]
    fn test_diagnostic_with_related() {
        let primary = Diagnostic::new(&messages::A_MODULE_CANNOT_HAVE_MULTIPLE_DEFAULT_EXPORTS, &[]);
        let related = Diagnostic::new(&messages::THE_FIRST_EXPORT_DEFAULT_IS_HERE, &[]);
        let combined = primary.with_related(related);
        assert_eq!(combined.related_information.len(), 1);
        assert_eq!(combined.related_information[0].code, 2752);
    }
}
