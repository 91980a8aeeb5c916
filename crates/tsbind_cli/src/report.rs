//! Rendering binder diagnostics.
//!
//! Plain output is one `file(pos): category TS####: message` line per
//! diagnostic. `--pretty` hands each diagnostic to miette's graphical
//! handler with the file text attached.

use miette::{GraphicalReportHandler, LabeledSpan, NamedSource, Severity, SourceCode};
use std::fmt;
use tsbind_diagnostics::{Diagnostic, DiagnosticCategory};

/// A binder diagnostic together with the text it points into.
#[derive(Debug, thiserror::Error)]
#[error("{}", diagnostic.message_text)]
pub struct SourceReport<'a> {
    diagnostic: &'a Diagnostic,
    text: NamedSource<String>,
}

impl<'a> SourceReport<'a> {
    pub fn new(diagnostic: &'a Diagnostic, file_name: &str, text: &str) -> Self {
        Self {
            diagnostic,
            text: NamedSource::new(file_name, text.to_string()),
        }
    }
}

impl miette::Diagnostic for SourceReport<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        Some(Box::new(format!("TS{}", self.diagnostic.code)))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.diagnostic.category {
            DiagnosticCategory::Error => Severity::Error,
            DiagnosticCategory::Warning => Severity::Warning,
            DiagnosticCategory::Suggestion | DiagnosticCategory::Message => Severity::Advice,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.text)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let primary = self
            .diagnostic
            .span
            .map(|span| LabeledSpan::new(Some("here".to_string()), span.start as usize, span.length as usize));
        // Related sites in other files cannot be shown against this source.
        let related = self
            .diagnostic
            .related_information
            .iter()
            .filter(|related| related.file == self.diagnostic.file)
            .filter_map(|related| {
                related.span.map(|span| {
                    LabeledSpan::new(Some(related.message_text.clone()), span.start as usize, span.length as usize)
                })
            });
        Some(Box::new(primary.into_iter().chain(related)))
    }
}

/// Render one diagnostic to a string.
pub fn render(diagnostic: &Diagnostic, file_name: &str, text: &str, pretty: bool) -> String {
    if !pretty {
        return diagnostic.to_string();
    }
    let report = SourceReport::new(diagnostic, file_name, text);
    let mut out = String::new();
    match GraphicalReportHandler::new().render_report(&mut out, &report) {
        Ok(()) => out,
        Err(_) => diagnostic.to_string(),
    }
}

/// `Found 3 errors in 2 files.`
pub fn summary(errors: usize, files: usize) -> String {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    if files <= 1 {
        format!("Found {} error{}.", errors, plural(errors))
    } else {
        format!("Found {} error{} in {} file{}.", errors, plural(errors), files, plural(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbind_core::TextSpan;
    use tsbind_diagnostics::messages;

    fn duplicate() -> Diagnostic {
        Diagnostic::with_location("a.ts", TextSpan::new(4, 1), &messages::DUPLICATE_IDENTIFIER_0, &["x"])
    }

    #[test]
    fn test_plain_rendering() {
        let text = "let x; let x;";
        let line = render(&duplicate(), "a.ts", text, false);
        assert_eq!(line, "a.ts(4): error TS2300: Duplicate identifier 'x'.");
    }

    #[test]
    fn test_pretty_rendering_mentions_code() {
        let text = "let x; let x;";
        let out = render(&duplicate(), "a.ts", text, true);
        assert!(out.contains("TS2300"), "Expected the code in the report, got {}", out);
        assert!(out.contains("Duplicate identifier 'x'."));
    }

    #[test]
    fn test_summary_wording() {
        assert_eq!(summary(1, 1), "Found 1 error.");
        assert_eq!(summary(3, 2), "Found 3 errors in 2 files.");
    }
}
