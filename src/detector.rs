//! Converter pattern detection.
//!
//! A finding is a generic usage with exactly two type arguments whose
//! name contains the converter keyword, sitting in a type declaration that
//! does not already define the generated method. Detection is read-only.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScaffoldConfig;
use crate::model::DocumentId;
use crate::syntax::{DeclId, Span, SyntaxTree};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hidden => "hidden",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Static description of the diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticDescriptor {
    pub id: String,
    pub title: String,
    /// Message with `{0}` (declaration), `{1}` (converter type) and `{2}`
    /// (method name) placeholders.
    pub message_format: String,
    pub category: String,
    pub severity: Severity,
    pub enabled_by_default: bool,
    pub description: String,
}

impl DiagnosticDescriptor {
    /// Descriptor for converter findings under `config`.
    pub fn converter(config: &ScaffoldConfig) -> Self {
        Self {
            id: config.diagnostic_id.clone(),
            title: "Converter has no test scenario".to_string(),
            message_format: "'{0}' uses converter '{1}' but does not define '{2}'".to_string(),
            category: "Naming".to_string(),
            severity: Severity::Info,
            enabled_by_default: true,
            description: "Converter types can have an equality test scenario generated from \
                          the members of their source and destination types."
                .to_string(),
        }
    }

    /// Fill the message placeholders.
    pub fn format_message(&self, args: &[&str]) -> String {
        args.iter()
            .enumerate()
            .fold(self.message_format.clone(), |message, (idx, arg)| {
                message.replace(&format!("{{{}}}", idx), arg)
            })
    }
}

/// A detected, not-yet-fixed occurrence of the converter pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub diagnostic_id: String,
    pub document: DocumentId,
    /// Declaration that will receive the generated method.
    pub declaration: DeclId,
    /// Span of the type-argument list.
    pub span: Span,
    pub line: usize,
    pub column: usize,
    /// Generic name as written, without arguments.
    pub generic_name: String,
    /// Both type arguments as written.
    pub type_arguments: Vec<String>,
    pub severity: Severity,
    pub message: String,
}

/// Reporting channel for findings.
pub trait DiagnosticSink {
    fn report_finding(&mut self, finding: Finding);
}

impl DiagnosticSink for Vec<Finding> {
    fn report_finding(&mut self, finding: Finding) {
        self.push(finding);
    }
}

/// Scans trees for the converter pattern.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    config: ScaffoldConfig,
    descriptor: DiagnosticDescriptor,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(ScaffoldConfig::default())
    }
}

impl PatternDetector {
    pub fn new(config: ScaffoldConfig) -> Self {
        let descriptor = DiagnosticDescriptor::converter(&config);
        Self { config, descriptor }
    }

    pub fn descriptor(&self) -> &DiagnosticDescriptor {
        &self.descriptor
    }

    /// All findings in `tree`, in source order of the usages.
    pub fn detect(&self, document: DocumentId, tree: &SyntaxTree) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.report(document, tree, &mut findings);
        findings
    }

    /// Report findings in `tree` to `sink`; returns how many were reported.
    pub fn report(&self, document: DocumentId, tree: &SyntaxTree, sink: &mut impl DiagnosticSink) -> usize {
        let mut reported = 0;

        for usage in tree.generic_usages() {
            let Some(list) = &usage.ty.type_args else {
                continue;
            };
            if list.args.len() != 2 || !self.config.is_converter_name(usage.ty.name()) {
                continue;
            }
            let Some(declaration) = usage.enclosing else {
                continue;
            };
            let Some(decl) = tree.declaration(declaration) else {
                continue;
            };
            if decl.has_method(&self.config.method_name) {
                continue;
            }

            let generic_name = usage.ty.reference.to_string();
            let (line, column) = tree.line_column(list.span.start);
            let finding = Finding {
                diagnostic_id: self.descriptor.id.clone(),
                document,
                declaration,
                span: list.span,
                line,
                column,
                message: self.descriptor.format_message(&[
                    decl.name.as_str(),
                    usage.ty.to_string().as_str(),
                    self.config.method_name.as_str(),
                ]),
                generic_name,
                type_arguments: list.args.iter().map(ToString::to_string).collect(),
                severity: self.descriptor.severity,
            };
            debug!(
                path = %tree.path,
                line,
                column,
                declaration = %decl.name,
                severity = %finding.severity,
                "Converter finding"
            );
            sink.report_finding(finding);
            reported += 1;
        }

        reported
    }
}
