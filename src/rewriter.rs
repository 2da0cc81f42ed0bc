//! Declaration rewriting: builds the replacement declaration carrying the
//! generated test scenario.
//!
//! The replacement is a value of the syntax model, produced without any
//! textual round trip. Applying it is the tree editor's job.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScaffoldConfig;
use crate::matcher::{match_members, MatchOutcome};
use crate::model::{CodeModel, DocumentId};
use crate::resolver::MemberResolver;
use crate::synth::synthesize;
use crate::syntax::{
    Member, MemberKind, MethodBody, MethodDecl, Parameter, TypeDecl, TypeReferenceKind,
    TypeSyntax,
};

/// A two-argument converter instantiation, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterUsage {
    pub generic: TypeReferenceKind,
    pub source: TypeSyntax,
    pub destination: TypeSyntax,
}

impl ConverterUsage {
    /// Split `ty` if it carries exactly two type arguments.
    pub fn from_type(ty: &TypeSyntax) -> Option<Self> {
        match ty.type_args.as_ref().map(|list| list.args.as_slice()) {
            Some([source, destination]) => Some(Self {
                generic: ty.reference.clone(),
                source: source.clone(),
                destination: destination.clone(),
            }),
            _ => None,
        }
    }

    /// Base type carrying the two names as type arguments.
    fn base_type(&self, source: &str, destination: &str) -> TypeSyntax {
        TypeSyntax::generic(
            self.generic.clone(),
            vec![named(source), named(destination)],
        )
    }
}

/// The replacement declaration plus what went into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewritePlan {
    pub declaration: TypeDecl,
    pub method: MethodDecl,
    pub source_name: String,
    pub destination_name: String,
    pub outcome: MatchOutcome,
}

/// Builds replacement declarations through a [`CodeModel`].
pub struct DeclarationRewriter<'m, M: CodeModel + ?Sized> {
    model: &'m M,
    config: ScaffoldConfig,
}

impl<'m, M: CodeModel + ?Sized> DeclarationRewriter<'m, M> {
    pub fn new(model: &'m M, config: ScaffoldConfig) -> Self {
        Self { model, config }
    }

    /// Build the replacement for `original`, whose converter usage is
    /// `usage`, both written in `document`.
    ///
    /// Returns `None` when either type argument has no usable name.
    pub fn rewrite(
        &self,
        document: DocumentId,
        original: &TypeDecl,
        usage: &ConverterUsage,
    ) -> Option<RewritePlan> {
        let source_name = type_name(&usage.source)?;
        let destination_name = type_name(&usage.destination)?;

        let resolver = MemberResolver::new(self.model, &self.config);
        let source_members = resolver.resolve(document, &usage.source);
        let destination_members = resolver.resolve(document, &usage.destination);
        let outcome = match_members(&source_members.members, &destination_members.members);
        let statements = synthesize(&outcome);

        debug!(
            declaration = %original.name,
            source = %source_name,
            destination = %destination_name,
            matched = outcome.matched().count(),
            statements = statements.len(),
            "Built test scenario"
        );

        let method = MethodDecl {
            attributes: Vec::new(),
            modifiers: vec!["public".to_string(), "override".to_string()],
            return_type: named("void"),
            name: self.config.method_name.clone(),
            type_parameters: Vec::new(),
            parameters: vec![
                Parameter::new(named(&source_name), self.config.expected_parameter.clone()),
                Parameter::new(
                    named(&destination_name),
                    self.config.tested_parameter.clone(),
                ),
            ],
            body: MethodBody::Statements(statements),
        };

        let mut declaration = original.clone();
        let base = usage.base_type(&source_name, &destination_name);
        let existing = declaration
            .base_list
            .iter()
            .position(|ty| ty.reference == usage.generic && ty.arity() == 2);
        match existing {
            Some(idx) => declaration.base_list[idx] = base,
            None => declaration.base_list.insert(0, base),
        }
        declaration
            .members
            .push(Member::generated(MemberKind::Method(method.clone())));

        Some(RewritePlan {
            declaration,
            method,
            source_name,
            destination_name,
            outcome,
        })
    }
}

/// Name of a type argument usable as a parameter type: plain simple or
/// qualified names only.
fn type_name(ty: &TypeSyntax) -> Option<String> {
    if ty.has_type_arguments() || ty.array_rank > 0 || ty.nullable {
        return None;
    }
    let name = ty.reference.to_string();
    let name = name.trim();
    if name.is_empty() || name.starts_with('(') {
        return None;
    }
    Some(name.to_string())
}

fn named(name: &str) -> TypeSyntax {
    TypeSyntax::named(TypeReferenceKind::from_dotted(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Workspace;
    use crate::syntax::{Accessor, DeclId, Printer, Statement};
    use pretty_assertions::assert_eq;

    const PARENTS: &str = r#"namespace Parents
{
    public class ConvertFrom
    {
        public int Id { get; set; }
        public string Name { get; set; }
        public List<string> Items { get; set; }
    }

    public class ConvertTo
    {
        public int id { get; set; }
        public string FullName { get; set; }
        public string[] Items { get; set; }
        public bool Extra { get; set; }
    }
}
"#;

    const TEST: &str = r#"using Parents;

namespace Tests
{
    public class MappingTest : ConverterTestBase<ConvertFrom, ConvertTo>
    {
        private readonly int seed = 3;
    }
}
"#;

    fn setup() -> (Workspace, DocumentId) {
        let mut workspace = Workspace::new();
        workspace.add_document("Parents.cs", PARENTS).unwrap();
        let doc = workspace.add_document("MappingTest.cs", TEST).unwrap();
        (workspace, doc)
    }

    fn usage_of(workspace: &Workspace, doc: DocumentId) -> (TypeDecl, ConverterUsage) {
        let tree = workspace.tree(doc).unwrap();
        let decl = tree.declaration(DeclId(0)).unwrap().clone();
        let usage = ConverterUsage::from_type(&decl.base_list[0]).unwrap();
        (decl, usage)
    }

    #[test]
    fn test_rewrite_appends_scenario() {
        let (workspace, doc) = setup();
        let (decl, usage) = usage_of(&workspace, doc);
        let rewriter = DeclarationRewriter::new(&workspace, ScaffoldConfig::default());
        let plan = rewriter.rewrite(doc, &decl, &usage).unwrap();

        assert_eq!(plan.source_name, "ConvertFrom");
        assert_eq!(plan.destination_name, "ConvertTo");
        assert_eq!(plan.declaration.members.len(), 2);
        assert_eq!(plan.declaration.members[0], decl.members[0]);
        assert_eq!(plan.declaration.base_list[0].to_string(), "ConverterTestBase<ConvertFrom, ConvertTo>");
        assert_eq!(plan.declaration.base_list.len(), 1);

        let printer = Printer::default();
        let rendered = printer.render_method(&plan.method, "        ", "    ");
        let expected = r#"public override void TestScenario(ConvertFrom expected, ConvertTo tested)
        {
            Assert.That(tested, Is.Not.Null);
            Assert.That(expected, Is.Not.Null);

            Assert.That(tested.id, Is.EqualTo(expected.Id));
            Assert.That(tested.FullName, Is.EqualTo(expected.Name));

            Assert.That(expected.Items, Is.Not.Null);
            Assert.That(tested.Items.Length, Is.EqualTo(expected.Items.Count));
            Assert.That(tested.Extra, Is.EqualTo(expected./*unexpected mismatch*/));
        }"#;
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_unresolved_arguments_still_generate_guards() {
        let mut workspace = Workspace::new();
        let doc = workspace
            .add_document("T.cs", "class T : Converter<Missing, Absent> { }")
            .unwrap();
        let (decl, usage) = usage_of(&workspace, doc);
        let plan = DeclarationRewriter::new(&workspace, ScaffoldConfig::default())
            .rewrite(doc, &decl, &usage)
            .unwrap();

        let MethodBody::Statements(statements) = &plan.method.body else {
            panic!("generated method has a body");
        };
        assert_eq!(statements.len(), 2);
        assert!(statements
            .iter()
            .all(|s| matches!(s, Statement::NotNull { target } if target.accessor == Accessor::Instance)));
    }

    #[test]
    fn test_unnamed_type_argument_gives_none() {
        let mut workspace = Workspace::new();
        let doc = workspace
            .add_document("T.cs", "class T : Converter<List<int>, Absent> { }")
            .unwrap();
        let (decl, usage) = usage_of(&workspace, doc);
        let rewriter = DeclarationRewriter::new(&workspace, ScaffoldConfig::default());
        assert!(rewriter.rewrite(doc, &decl, &usage).is_none());
    }

    #[test]
    fn test_qualified_names_kept_in_full() {
        let mut workspace = Workspace::new();
        let doc = workspace
            .add_document(
                "T.cs",
                "class T : IDisposable, Converter<Msg.PhoneCall, Dto.Call> { }",
            )
            .unwrap();
        let tree = workspace.tree(doc).unwrap();
        let decl = tree.declaration(DeclId(0)).unwrap().clone();
        let usage = ConverterUsage::from_type(&decl.base_list[1]).unwrap();
        let plan = DeclarationRewriter::new(&workspace, ScaffoldConfig::default())
            .rewrite(doc, &decl, &usage)
            .unwrap();

        let bases: Vec<String> = plan.declaration.base_list.iter().map(ToString::to_string).collect();
        assert_eq!(bases, vec!["IDisposable", "Converter<Msg.PhoneCall, Dto.Call>"]);
        assert_eq!(plan.method.parameters[0].to_string(), "Msg.PhoneCall expected");
    }

    #[test]
    fn test_member_usage_prepends_base() {
        let mut workspace = Workspace::new();
        let doc = workspace
            .add_document("T.cs", "class Holder { private Converter<A, B> converter; }")
            .unwrap();
        let tree = workspace.tree(doc).unwrap();
        let decl = tree.declaration(DeclId(0)).unwrap().clone();
        let usage = tree
            .generic_usages()
            .into_iter()
            .find_map(|u| ConverterUsage::from_type(u.ty))
            .unwrap();
        let plan = DeclarationRewriter::new(&workspace, ScaffoldConfig::default())
            .rewrite(doc, &decl, &usage)
            .unwrap();
        assert_eq!(plan.declaration.base_list[0].to_string(), "Converter<A, B>");
    }

    #[test]
    fn test_from_type_requires_two_arguments() {
        let one = TypeSyntax::generic(TypeReferenceKind::Simple("Converter".to_string()), vec![named("A")]);
        assert!(ConverterUsage::from_type(&one).is_none());
        assert!(ConverterUsage::from_type(&named("Converter")).is_none());
    }
}
