//! CLI-facing scan helpers.
//!
//! This module provides a deterministic command surface that a thin binary
//! wrapper can call to scan a source tree for converter findings and
//! optionally write generated test scenarios back to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ScaffoldConfig;
use crate::detector::Finding;
use crate::error::{Error, Result};
use crate::fix::ConverterFixer;
use crate::model::{CodeModel, DocumentId, Workspace};
use crate::syntax::Printer;

/// Default glob, relative to the scan root.
pub const DEFAULT_PATTERN: &str = "**/*.cs";

/// Options for a directory scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub pattern: String,
    /// Generate scenarios for every fixable finding.
    pub apply_fixes: bool,
    /// Write changed documents back to disk (requires `apply_fixes`).
    pub write: bool,
    pub config: ScaffoldConfig,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            pattern: DEFAULT_PATTERN.to_string(),
            apply_fixes: false,
            write: false,
            config: ScaffoldConfig::default(),
        }
    }
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_fixes(mut self, write: bool) -> Self {
        self.apply_fixes = true;
        self.write = write;
        self
    }

    pub fn with_config(mut self, config: ScaffoldConfig) -> Self {
        self.config = config;
        self
    }
}

/// Per-file scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
    /// Declarations that received a generated scenario.
    pub applied: Vec<String>,
    /// Findings that could not be fixed.
    pub unavailable: usize,
    pub written: bool,
}

/// A file that was skipped because it did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a directory scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
}

impl ScanReport {
    pub fn total_findings(&self) -> usize {
        self.files.iter().map(|file| file.findings.len()).sum()
    }

    pub fn total_applied(&self) -> usize {
        self.files.iter().map(|file| file.applied.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Scan `options.root` for converter findings.
///
/// All matching files are loaded into one workspace so types resolve
/// across files. Files that do not parse are reported as skipped.
pub fn scan(options: &ScanOptions) -> Result<ScanReport> {
    options.config.validate()?;

    let pattern = options.root.join(&options.pattern);
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(error) => {
                let path = error.path().to_path_buf();
                return Err(Error::io(path, error.into_error()));
            }
        }
    }
    paths.sort();

    let mut report = ScanReport::default();
    let mut workspace = Workspace::new().with_printer(Printer::from_config(&options.config));
    let mut loaded: Vec<(DocumentId, PathBuf)> = Vec::new();

    for path in paths {
        let text = fs::read_to_string(&path).map_err(|error| Error::io(&path, error))?;
        match workspace.add_document(display_path(&options.root, &path), text) {
            Ok(id) => loaded.push((id, path)),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "Skipping unparsable file");
                report.skipped.push(SkippedFile {
                    path,
                    error: error.to_string(),
                });
            }
        }
    }

    let fixer = ConverterFixer::new(options.config.clone());
    for (id, path) in loaded {
        let findings = match workspace.document(id) {
            Some(tree) => fixer.detector().detect(id, tree),
            None => return Err(Error::UnknownDocument(id)),
        };

        let mut file = FileReport {
            path,
            findings,
            applied: Vec::new(),
            unavailable: 0,
            written: false,
        };

        if options.apply_fixes && !file.findings.is_empty() {
            let fixed = fixer.fix_all(&mut workspace, id)?;
            file.unavailable = fixed.unavailable.len();
            file.applied = fixed.applied;

            if options.write && !file.applied.is_empty() {
                fs::write(&file.path, workspace.text(id)?)
                    .map_err(|error| Error::io(&file.path, error))?;
                file.written = true;
            }
        }

        info!(
            path = %file.path.display(),
            findings = file.findings.len(),
            applied = file.applied.len(),
            written = file.written,
            "Scanned file"
        );
        report.files.push(file);
    }

    Ok(report)
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MODELS: &str = r#"namespace Models
{
    public class Order
    {
        public int Id { get; set; }
        public List<string> Lines { get; set; }
    }

    public class OrderDto
    {
        public int Id { get; set; }
        public string[] Lines { get; set; }
    }
}
"#;

    const TEST: &str = r#"using Models;

public class OrderConverterTest : ConverterTestBase<Order, OrderDto>
{
}
"#;

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Models.cs"), MODELS).unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests").join("OrderConverterTest.cs"), TEST).unwrap();
        fs::write(dir.path().join("notes.txt"), "not source").unwrap();
        dir
    }

    #[test]
    fn test_scan_reports_findings_without_writing() {
        let dir = fixture();
        let report = scan(&ScanOptions::new(dir.path())).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.total_findings(), 1);
        assert_eq!(report.total_applied(), 0);
        let unchanged = fs::read_to_string(dir.path().join("tests/OrderConverterTest.cs")).unwrap();
        assert_eq!(unchanged, TEST);
    }

    #[test]
    fn test_scan_applies_and_writes() {
        let dir = fixture();
        let report = scan(&ScanOptions::new(dir.path()).with_fixes(true)).unwrap();

        assert_eq!(report.total_applied(), 1);
        let file = report.files.iter().find(|f| f.written).unwrap();
        assert_eq!(file.applied, vec!["OrderConverterTest"]);

        let written = fs::read_to_string(dir.path().join("tests/OrderConverterTest.cs")).unwrap();
        assert!(written.contains("public override void TestScenario(Order expected, OrderDto tested)"));
        assert!(written.contains("Assert.That(tested.Lines.Length, Is.EqualTo(expected.Lines.Count));"));

        let again = scan(&ScanOptions::new(dir.path())).unwrap();
        assert_eq!(again.total_findings(), 0);
    }

    #[test]
    fn test_scan_dry_run_fixes_in_memory_only() {
        let dir = fixture();
        let report = scan(&ScanOptions::new(dir.path()).with_fixes(false)).unwrap();
        assert_eq!(report.total_applied(), 1);
        assert!(report.files.iter().all(|f| !f.written));
        let unchanged = fs::read_to_string(dir.path().join("tests/OrderConverterTest.cs")).unwrap();
        assert_eq!(unchanged, TEST);
    }

    #[test]
    fn test_unparsable_file_is_skipped() {
        let dir = fixture();
        fs::write(dir.path().join("Broken.cs"), "class {").unwrap();
        let report = scan(&ScanOptions::new(dir.path())).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_and_config() {
        let dir = fixture();
        let bad_pattern = scan(&ScanOptions::new(dir.path()).with_pattern("[*.cs"));
        assert!(matches!(bad_pattern, Err(Error::Pattern(_))));

        let bad_config = ScaffoldConfig::default().with_method_name("");
        let result = scan(&ScanOptions::new(dir.path()).with_config(bad_config));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_report_serializes() {
        let dir = fixture();
        let report = scan(&ScanOptions::new(dir.path())).unwrap();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"].as_array().unwrap().len(), 2);
        assert_eq!(value["files"][1]["findings"][0]["diagnostic_id"], "ConvertorAnalyzer");
    }
}
