//! Binding a whole program.
//!
//! Files are bound independently, so a program binds them in parallel.
//! Each file gets its own binder; nothing is shared between files except
//! the options.

use crate::binding::BoundFile;
use rayon::prelude::*;
use serde::Serialize;
use tsbind_options::CompilerOptions;

/// Per-file counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBindStats {
    pub file_name: String,
    pub symbol_count: usize,
    pub flow_node_count: usize,
    pub error_count: usize,
    pub suggestion_count: usize,
}

/// Counts for a program, files in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramBindStats {
    pub files: Vec<FileBindStats>,
}

impl ProgramBindStats {
    pub fn symbol_count(&self) -> usize {
        self.files.iter().map(|file| file.symbol_count).sum()
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|file| file.error_count).sum()
    }

    pub fn suggestion_count(&self) -> usize {
        self.files.iter().map(|file| file.suggestion_count).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Bind every file that is not bound yet.
pub fn bind_program(files: &[BoundFile], options: &CompilerOptions) -> ProgramBindStats {
    let _span = tracing::debug_span!("bind_program", files = files.len()).entered();
    let files: Vec<FileBindStats> = files
        .par_iter()
        .map(|file| {
            let binding = file.bind(options);
            FileBindStats {
                file_name: file.source.file_name.clone(),
                symbol_count: binding.symbol_count(),
                flow_node_count: binding.flow().len(),
                error_count: binding.diagnostics().error_count(),
                suggestion_count: binding.suggestions().len(),
            }
        })
        .collect();
    let stats = ProgramBindStats { files };
    tracing::debug!(
        symbols = stats.symbol_count(),
        errors = stats.error_count(),
        "bound program"
    );
    stats
}
