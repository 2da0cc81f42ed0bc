//! # convtest-core
//!
//! Detects "converter" type pairs in C#-like sources and scaffolds
//! equality-assertion test scenarios for them.
//!
//! ## Core Components
//!
//! - **Detector**: finds two-argument generic usages named like a converter
//! - **Resolver**: flattens a type's members across its base chain
//! - **Matcher**: pairs source and destination member names
//! - **Synth**: turns a pairing into assertion statements
//! - **Rewriter**: builds the replacement declaration with the scenario
//! - **Fix**: applies rewrites through a host's tree editor
//!
//! ## Example
//!
//! ```rust
//! use convtest_core::{ConverterFixer, Workspace};
//!
//! let mut workspace = Workspace::new();
//! workspace
//!     .add_document("Models.cs", "class From { public int Id { get; set; } }\nclass To { public int Id { get; set; } }")
//!     .unwrap();
//! let doc = workspace
//!     .add_document("Test.cs", "class FromToTest : ConverterTestBase<From, To>\n{\n}\n")
//!     .unwrap();
//!
//! let report = ConverterFixer::default().fix_all(&mut workspace, doc).unwrap();
//! assert_eq!(report.applied, vec!["FromToTest"]);
//! assert!(workspace.text(doc).unwrap().contains("Assert.That(tested.Id, Is.EqualTo(expected.Id));"));
//! ```

// Self-alias for derive macro support within the crate
extern crate self as convtest_core;

pub mod adapters;
pub mod config;
pub mod detector;
pub mod error;
pub mod fix;
pub mod matcher;
pub mod model;
pub mod resolver;
pub mod rewriter;
pub mod synth;
pub mod syntax;

// Re-exports for convenience
pub use config::ScaffoldConfig;
pub use detector::{DiagnosticDescriptor, DiagnosticSink, Finding, PatternDetector, Severity};
pub use error::{Error, Result};
pub use fix::{CodeAction, ConverterFixer, FixAllReport, FixOutcome};
pub use matcher::{match_members, match_names, Counterpart, MatchKind, MatchOutcome, Pairing};
pub use model::{
    CodeModel, DocumentId, ForeignMember, ForeignType, Symbol, SymbolOrigin, TreeEditor,
    TypeMetadata, Workspace,
};
pub use resolver::{MemberList, MemberName, MemberResolver};
pub use rewriter::{ConverterUsage, DeclarationRewriter, RewritePlan};
pub use synth::synthesize;
pub use syntax::{parse, AssertionStyle, Printer, Statement, SyntaxTree, TypeReferenceKind};

pub use convtest_core_derive::Shape;
