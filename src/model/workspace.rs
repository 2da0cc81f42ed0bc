//! In-memory host: parsed documents plus registered metadata types.

use tracing::debug;

use super::metadata::{ForeignMember, ForeignType, TypeMetadata};
use super::{CodeModel, DocumentId, Symbol, SymbolOrigin, TreeEditor};
use crate::error::{Error, Result};
use crate::syntax::{parse, DeclId, Printer, SyntaxTree, TypeDecl, TypeReferenceKind, TypeSyntax};

/// A set of documents resolved against each other.
///
/// Simple names resolve in the referencing document first, then in
/// documents whose namespace the referencing document imports or shares,
/// then anywhere else, then among registered metadata types. Qualified
/// names resolve by full name or trailing segments.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    documents: Vec<SyntaxTree>,
    foreign: Vec<ForeignType>,
    printer: Printer,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the printer used when applying edits.
    pub fn with_printer(mut self, printer: Printer) -> Self {
        self.printer = printer;
        self
    }

    /// Parse and add a document.
    pub fn add_document(&mut self, path: impl Into<String>, text: impl Into<String>) -> Result<DocumentId> {
        let path = path.into();
        let tree = parse(&path, &text.into())?;
        let id = DocumentId(self.documents.len());
        debug!(
            path = %path,
            declarations = tree.declarations.len(),
            "Added document"
        );
        self.documents.push(tree);
        Ok(id)
    }

    /// Register a type known only through metadata.
    pub fn register_foreign(&mut self, ty: ForeignType) {
        self.foreign.push(ty);
    }

    /// Register a type described by [`TypeMetadata`].
    pub fn register<T: TypeMetadata>(&mut self) {
        self.register_foreign(T::foreign_type());
    }

    /// Document tree, or [`Error::UnknownDocument`].
    pub fn tree(&self, id: DocumentId) -> Result<&SyntaxTree> {
        self.document(id).ok_or(Error::UnknownDocument(id))
    }

    /// Current source text of a document.
    pub fn text(&self, id: DocumentId) -> Result<&str> {
        Ok(&self.tree(id)?.text)
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &SyntaxTree)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(idx, tree)| (DocumentId(idx), tree))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn symbol_for(&self, document: DocumentId, decl: DeclId) -> Option<Symbol> {
        let name = self.document(document)?.full_name(decl)?;
        Some(Symbol::source(name, document, decl))
    }

    /// Documents in lookup order for a reference written in `context`.
    fn lookup_order(&self, context: DocumentId) -> Vec<DocumentId> {
        let Some(tree) = self.document(context) else {
            return self.documents().map(|(id, _)| id).collect();
        };
        let imported: Vec<String> = tree
            .usings
            .iter()
            .filter(|using| using.alias.is_none() && !using.is_static)
            .map(|using| using.target.reference.to_string())
            .chain(tree.declarations.iter().filter_map(|decl| decl.namespace.clone()))
            .collect();

        let mut near = Vec::new();
        let mut far = Vec::new();
        for (id, other) in self.documents() {
            if id == context {
                continue;
            }
            let shares_namespace = other
                .declarations
                .iter()
                .filter_map(|decl| decl.namespace.as_deref())
                .any(|ns| imported.iter().any(|import| import == ns));
            if shares_namespace {
                near.push(id);
            } else {
                far.push(id);
            }
        }

        let mut order = vec![context];
        order.extend(near);
        order.extend(far);
        order
    }

    fn resolve_simple(&self, context: DocumentId, name: &str, arity: usize) -> Option<Symbol> {
        for document in self.lookup_order(context) {
            let Some(tree) = self.document(document) else {
                continue;
            };
            let found = tree
                .iter_declarations()
                .find(|(_, decl)| decl.name == name && decl.type_parameters.len() == arity);
            if let Some((decl, _)) = found {
                return self.symbol_for(document, decl);
            }
        }
        self.foreign
            .iter()
            .find(|ty| ty.simple_name() == name)
            .map(|ty| Symbol::metadata(ty.name.clone()))
    }

    fn resolve_qualified(&self, context: DocumentId, path: &str, arity: usize) -> Option<Symbol> {
        let suffix = format!(".{}", path);
        for document in self.lookup_order(context) {
            let Some(tree) = self.document(document) else {
                continue;
            };
            for (decl, ty) in tree.iter_declarations() {
                if ty.type_parameters.len() != arity {
                    continue;
                }
                let Some(full) = tree.full_name(decl) else {
                    continue;
                };
                if full == path || full.ends_with(&suffix) {
                    return Some(Symbol::source(full, document, decl));
                }
            }
        }
        self.foreign
            .iter()
            .find(|ty| ty.matches_path(path))
            .map(|ty| Symbol::metadata(ty.name.clone()))
    }

    /// Expand a leading `using Alias = Target;` segment.
    fn expand_alias(&self, context: DocumentId, ty: &TypeSyntax) -> Option<TypeReferenceKind> {
        let tree = self.document(context)?;
        let segments = ty.reference.segments();
        let (head, rest) = segments.split_first()?;
        let using = tree
            .usings
            .iter()
            .find(|using| using.alias.as_deref() == Some(*head))?;
        let mut expanded: Vec<String> = using
            .target
            .reference
            .segments()
            .into_iter()
            .map(str::to_string)
            .collect();
        expanded.extend(rest.iter().map(|segment| segment.to_string()));
        Some(TypeReferenceKind::from_dotted(&expanded.join(".")))
    }
}

impl CodeModel for Workspace {
    fn document(&self, id: DocumentId) -> Option<&SyntaxTree> {
        self.documents.get(id.0)
    }

    fn resolve_type(&self, context: DocumentId, ty: &TypeSyntax) -> Option<Symbol> {
        let reference = self
            .expand_alias(context, ty)
            .unwrap_or_else(|| ty.reference.clone());
        let arity = ty.arity();
        match &reference {
            TypeReferenceKind::Simple(name) => self.resolve_simple(context, name, arity),
            TypeReferenceKind::Qualified(path) => {
                self.resolve_qualified(context, &path.join("."), arity)
            }
        }
    }

    fn declaration_of(&self, symbol: &Symbol) -> Option<(DocumentId, &TypeDecl)> {
        match symbol.origin {
            SymbolOrigin::Source { document, decl } => {
                let decl = self.document(document)?.declaration(decl)?;
                Some((document, decl))
            }
            SymbolOrigin::Metadata => None,
        }
    }

    fn metadata_members(&self, symbol: &Symbol) -> Vec<ForeignMember> {
        if !symbol.is_metadata() {
            return Vec::new();
        }
        self.foreign
            .iter()
            .find(|ty| ty.name == symbol.name)
            .map(|ty| ty.members.clone())
            .unwrap_or_default()
    }
}

impl TreeEditor for Workspace {
    fn replace_node(&mut self, document: DocumentId, old: DeclId, new: &TypeDecl) -> Result<()> {
        let tree = self.tree(document)?;
        let decl = tree.declaration(old).ok_or_else(|| {
            Error::edit(format!("no declaration {} in {}", old.0, tree.path))
        })?;

        let start = decl.span.start;
        let end = decl.span.end;
        let line_start = tree.text[..start].rfind('\n').map_or(0, |idx| idx + 1);
        let prefix = &tree.text[line_start..start];
        let indent: String = prefix.chars().take_while(|c| c.is_whitespace()).collect();

        let rendered = self.printer.render_declaration(new, &indent);
        let mut text = String::with_capacity(tree.text.len() + rendered.len());
        text.push_str(&tree.text[..start]);
        text.push_str(&rendered);
        text.push_str(&tree.text[end..]);

        let reparsed = parse(&tree.path, &text).map_err(|err| {
            Error::edit(format!(
                "replacement for '{}' does not parse: {}",
                decl.name, err
            ))
        })?;

        debug!(
            path = %reparsed.path,
            declaration = %new.name,
            "Replaced declaration"
        );
        self.documents[document.0] = reparsed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{DeclKind, Member, MemberKind, MethodBody, MethodDecl};
    use pretty_assertions::assert_eq;

    const MODELS: &str = r#"namespace Models
{
    public class Person
    {
        public int Id { get; set; }
    }
}
"#;

    const OTHER: &str = r#"namespace Legacy
{
    public class Person
    {
        public string Code { get; set; }
    }
}
"#;

    fn simple(name: &str) -> TypeSyntax {
        TypeSyntax::named(TypeReferenceKind::Simple(name.to_string()))
    }

    fn qualified(path: &str) -> TypeSyntax {
        TypeSyntax::named(TypeReferenceKind::from_dotted(path))
    }

    #[test]
    fn test_simple_name_prefers_imported_namespace() {
        let mut workspace = Workspace::new();
        workspace.add_document("Legacy.cs", OTHER).unwrap();
        workspace.add_document("Models.cs", MODELS).unwrap();
        let user = workspace
            .add_document("Use.cs", "using Models;\nclass User { }\n")
            .unwrap();

        let symbol = workspace.resolve_type(user, &simple("Person")).unwrap();
        assert_eq!(symbol.name, "Models.Person");
    }

    #[test]
    fn test_simple_name_prefers_same_document() {
        let mut workspace = Workspace::new();
        workspace.add_document("Models.cs", MODELS).unwrap();
        let local = workspace
            .add_document("Local.cs", "class Person { }\nclass Other { }\n")
            .unwrap();

        let symbol = workspace.resolve_type(local, &simple("Person")).unwrap();
        assert_eq!(symbol.name, "Person");
        assert_eq!(
            symbol.origin,
            SymbolOrigin::Source {
                document: local,
                decl: DeclId(0)
            }
        );
    }

    #[test]
    fn test_qualified_name_and_alias() {
        let mut workspace = Workspace::new();
        workspace.add_document("Models.cs", MODELS).unwrap();
        workspace.add_document("Legacy.cs", OTHER).unwrap();
        let user = workspace
            .add_document("Use.cs", "using Old = Legacy;\nclass User { }\n")
            .unwrap();

        let symbol = workspace.resolve_type(user, &qualified("Legacy.Person")).unwrap();
        assert_eq!(symbol.name, "Legacy.Person");

        let aliased = workspace.resolve_type(user, &qualified("Old.Person")).unwrap();
        assert_eq!(aliased.name, "Legacy.Person");
    }

    #[test]
    fn test_metadata_fallback() {
        let mut workspace = Workspace::new();
        workspace.register_foreign(
            ForeignType::new("Contracts.Invoice")
                .with_member(".ctor")
                .with_member("get_Number")
                .with_member("Number"),
        );
        let doc = workspace.add_document("A.cs", "class A { }").unwrap();

        let symbol = workspace.resolve_type(doc, &simple("Invoice")).unwrap();
        assert!(symbol.is_metadata());
        assert!(workspace.declaration_of(&symbol).is_none());
        assert_eq!(
            workspace.metadata_member_names(&symbol),
            vec![".ctor", "get_Number", "Number"]
        );

        let by_path = workspace.resolve_type(doc, &qualified("Contracts.Invoice"));
        assert_eq!(by_path, Some(symbol));
        assert!(workspace.resolve_type(doc, &simple("Missing")).is_none());
    }

    #[test]
    fn test_generic_arity_must_match() {
        let mut workspace = Workspace::new();
        let doc = workspace
            .add_document("Box.cs", "class Box<T> { }\n")
            .unwrap();
        assert!(workspace.resolve_type(doc, &simple("Box")).is_none());
        let generic = TypeSyntax::generic(
            TypeReferenceKind::Simple("Box".to_string()),
            vec![simple("int")],
        );
        assert!(workspace.resolve_type(doc, &generic).is_some());
    }

    fn with_empty_method(decl: &TypeDecl) -> TypeDecl {
        let mut decl = decl.clone();
        decl.members.push(Member::generated(MemberKind::Method(MethodDecl {
            attributes: Vec::new(),
            modifiers: vec!["public".to_string()],
            return_type: simple("void"),
            name: "Check".to_string(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            body: MethodBody::Statements(Vec::new()),
        })));
        decl
    }

    #[test]
    fn test_replace_node_splices_at_original_indent() {
        let mut workspace = Workspace::new();
        let doc = workspace.add_document("Models.cs", MODELS).unwrap();
        let decl = workspace.tree(doc).unwrap().declaration(DeclId(0)).unwrap();
        let replacement = with_empty_method(decl);

        workspace.replace_node(doc, DeclId(0), &replacement).unwrap();

        let expected = r#"namespace Models
{
    public class Person
    {
        public int Id { get; set; }

        public void Check()
        {
        }
    }
}
"#;
        assert_eq!(workspace.text(doc).unwrap(), expected);
        let tree = workspace.tree(doc).unwrap();
        assert!(tree.declarations[0].has_method("Check"));
    }

    #[test]
    fn test_replace_node_rejects_unparsable_result() {
        let mut workspace = Workspace::new();
        let doc = workspace.add_document("Models.cs", MODELS).unwrap();
        let mut broken = workspace.tree(doc).unwrap().declarations[0].clone();
        broken.kind = DeclKind::Class;
        broken.name = "Bad Name".to_string();

        let err = workspace.replace_node(doc, DeclId(0), &broken).unwrap_err();
        assert!(matches!(err, Error::Edit(_)));
        assert_eq!(workspace.text(doc).unwrap(), MODELS);
    }

    #[test]
    fn test_unknown_document() {
        let workspace = Workspace::new();
        assert!(matches!(
            workspace.tree(DocumentId(4)),
            Err(Error::UnknownDocument(DocumentId(4)))
        ));
    }
}
