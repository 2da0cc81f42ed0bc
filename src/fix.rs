//! Code fix surface: turns findings into applied rewrites.
//!
//! A fix re-locates the finding's converter usage in the current tree,
//! runs the rewriter and hands the replacement to the tree editor. Stale
//! findings and unusable type arguments surface as
//! [`FixOutcome::Unavailable`]; only editor failures are errors.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ScaffoldConfig;
use crate::detector::{Finding, PatternDetector};
use crate::error::{Error, Result};
use crate::model::{CodeModel, DocumentId, TreeEditor};
use crate::rewriter::{ConverterUsage, DeclarationRewriter};
use crate::syntax::MethodBody;

/// Title shown for the fix.
pub const FIX_TITLE: &str = "Generate converter test";

/// Key grouping equivalent fixes for batch application.
pub const FIX_EQUIVALENCE_KEY: &str = "GenerateConverterTest";

/// A fix offered for one finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAction {
    pub title: String,
    pub equivalence_key: String,
    pub finding: Finding,
}

/// Result of applying one fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixOutcome {
    Applied {
        document: DocumentId,
        declaration: String,
        statements: usize,
    },
    Unavailable {
        reason: String,
    },
}

impl FixOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Summary of a batch fix over one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixAllReport {
    /// Declarations that received a scenario, in application order.
    pub applied: Vec<String>,
    /// Findings left that could not be fixed.
    pub unavailable: Vec<Finding>,
}

/// Applies converter fixes through a host.
#[derive(Debug, Clone)]
pub struct ConverterFixer {
    config: ScaffoldConfig,
    detector: PatternDetector,
}

impl Default for ConverterFixer {
    fn default() -> Self {
        Self::new(ScaffoldConfig::default())
    }
}

impl ConverterFixer {
    pub fn new(config: ScaffoldConfig) -> Self {
        let detector = PatternDetector::new(config.clone());
        Self { config, detector }
    }

    pub fn detector(&self) -> &PatternDetector {
        &self.detector
    }

    /// Register one action per finding.
    pub fn actions_for(&self, findings: &[Finding]) -> Vec<CodeAction> {
        findings
            .iter()
            .filter(|finding| finding.diagnostic_id == self.config.diagnostic_id)
            .map(|finding| CodeAction {
                title: FIX_TITLE.to_string(),
                equivalence_key: FIX_EQUIVALENCE_KEY.to_string(),
                finding: finding.clone(),
            })
            .collect()
    }

    /// Apply the fix for `finding`.
    pub fn apply_fix<H>(&self, host: &mut H, finding: &Finding) -> Result<FixOutcome>
    where
        H: CodeModel + TreeEditor,
    {
        let tree = host
            .document(finding.document)
            .ok_or(Error::UnknownDocument(finding.document))?;

        let usage = tree
            .generic_usages()
            .into_iter()
            .filter(|usage| usage.enclosing == Some(finding.declaration))
            .find(|usage| {
                usage
                    .ty
                    .type_args
                    .as_ref()
                    .is_some_and(|list| list.span == finding.span)
            })
            .and_then(|usage| ConverterUsage::from_type(usage.ty));
        let (Some(usage), Some(original)) = (usage, tree.declaration(finding.declaration)) else {
            debug!(line = finding.line, column = finding.column, "Finding no longer matches the tree");
            return Ok(FixOutcome::unavailable("finding is stale"));
        };

        let rewriter = DeclarationRewriter::new(&*host, self.config.clone());
        let Some(plan) = rewriter.rewrite(finding.document, original, &usage) else {
            return Ok(FixOutcome::unavailable(
                "type arguments are not plain type names",
            ));
        };

        let statements = match &plan.method.body {
            MethodBody::Statements(body) => body.len(),
            MethodBody::Source => 0,
        };
        host.replace_node(finding.document, finding.declaration, &plan.declaration)?;

        info!(
            declaration = %plan.declaration.name,
            source = %plan.source_name,
            destination = %plan.destination_name,
            "Applied converter test fix"
        );
        Ok(FixOutcome::Applied {
            document: finding.document,
            declaration: plan.declaration.name,
            statements,
        })
    }

    /// Fix every finding in `document`, re-detecting after each edit, until
    /// none remain or no remaining finding can be fixed.
    pub fn fix_all<H>(&self, host: &mut H, document: DocumentId) -> Result<FixAllReport>
    where
        H: CodeModel + TreeEditor,
    {
        let mut report = FixAllReport::default();

        loop {
            let tree = host
                .document(document)
                .ok_or(Error::UnknownDocument(document))?;
            let findings = self.detector.detect(document, tree);
            if findings.is_empty() {
                break;
            }

            let mut progressed = false;
            let mut unavailable = Vec::new();
            for finding in findings {
                match self.apply_fix(host, &finding)? {
                    FixOutcome::Applied { declaration, .. } => {
                        report.applied.push(declaration);
                        progressed = true;
                        break;
                    }
                    FixOutcome::Unavailable { .. } => unavailable.push(finding),
                }
            }

            if !progressed {
                report.unavailable = unavailable;
                break;
            }
        }

        info!(
            %document,
            applied = report.applied.len(),
            unavailable = report.unavailable.len(),
            "Fixed all converter findings"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Workspace;
    use pretty_assertions::assert_eq;

    const MODELS: &str = r#"namespace Models
{
    public record Person(int Id, string Name);

    public class PersonDto
    {
        public int Id { get; set; }
        public string FullName { get; set; }
    }
}
"#;

    const TESTS: &str = r#"using Models;

namespace Tests
{
    public class PersonConverterTest : ConverterTestBase<Person, PersonDto>
    {
        private readonly int seed = 3;
    }

    public class ReverseConverterTest : ConverterTestBase<PersonDto, Person>
    {
    }
}
"#;

    fn workspace() -> (Workspace, DocumentId) {
        let mut workspace = Workspace::new();
        workspace.add_document("Models.cs", MODELS).unwrap();
        let doc = workspace.add_document("Tests.cs", TESTS).unwrap();
        (workspace, doc)
    }

    #[test]
    fn test_actions_for_findings() {
        let (workspace, doc) = workspace();
        let fixer = ConverterFixer::default();
        let findings = fixer.detector().detect(doc, workspace.tree(doc).unwrap());
        let actions = fixer.actions_for(&findings);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].title, "Generate converter test");
        assert_eq!(actions[0].equivalence_key, FIX_EQUIVALENCE_KEY);
    }

    #[test]
    fn test_apply_fix_rewrites_document() {
        let (mut workspace, doc) = workspace();
        let fixer = ConverterFixer::default();
        let findings = fixer.detector().detect(doc, workspace.tree(doc).unwrap());

        let outcome = fixer.apply_fix(&mut workspace, &findings[0]).unwrap();
        assert_eq!(
            outcome,
            FixOutcome::Applied {
                document: doc,
                declaration: "PersonConverterTest".to_string(),
                statements: 4,
            }
        );

        let expected = r#"using Models;

namespace Tests
{
    public class PersonConverterTest : ConverterTestBase<Person, PersonDto>
    {
        private readonly int seed = 3;

        public override void TestScenario(Person expected, PersonDto tested)
        {
            Assert.That(tested, Is.Not.Null);
            Assert.That(expected, Is.Not.Null);

            Assert.That(tested.Id, Is.EqualTo(expected.Id));
            Assert.That(tested.FullName, Is.EqualTo(expected.Name));
        }
    }

    public class ReverseConverterTest : ConverterTestBase<PersonDto, Person>
    {
    }
}
"#;
        assert_eq!(workspace.text(doc).unwrap(), expected);

        let remaining = fixer.detector().detect(doc, workspace.tree(doc).unwrap());
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn test_stale_finding_unavailable() {
        let (mut workspace, doc) = workspace();
        let fixer = ConverterFixer::default();
        let findings = fixer.detector().detect(doc, workspace.tree(doc).unwrap());

        fixer.apply_fix(&mut workspace, &findings[0]).unwrap();
        // The second finding's span moved when the first fix landed.
        let outcome = fixer.apply_fix(&mut workspace, &findings[1]).unwrap();
        assert!(!outcome.is_applied());
    }

    #[test]
    fn test_fix_all_until_clean() {
        let (mut workspace, doc) = workspace();
        let fixer = ConverterFixer::default();

        let report = fixer.fix_all(&mut workspace, doc).unwrap();
        assert_eq!(report.applied, vec!["PersonConverterTest", "ReverseConverterTest"]);
        assert!(report.unavailable.is_empty());

        let tree = workspace.tree(doc).unwrap();
        assert!(fixer.detector().detect(doc, tree).is_empty());
        assert!(tree.declarations.iter().all(|decl| decl.has_method("TestScenario")));
    }

    #[test]
    fn test_fix_all_stops_without_progress() {
        let mut workspace = Workspace::new();
        let doc = workspace
            .add_document("T.cs", "class T : Converter<List<int>, B> { }")
            .unwrap();
        let fixer = ConverterFixer::default();

        let report = fixer.fix_all(&mut workspace, doc).unwrap();
        assert!(report.applied.is_empty());
        assert_eq!(report.unavailable.len(), 1);
        assert_eq!(workspace.text(doc).unwrap(), "class T : Converter<List<int>, B> { }");
    }

    #[test]
    fn test_unknown_document_is_error() {
        let mut workspace = Workspace::new();
        let fixer = ConverterFixer::default();
        assert!(matches!(
            fixer.fix_all(&mut workspace, DocumentId(9)),
            Err(Error::UnknownDocument(_))
        ));
    }
}
