//! Recursive-descent parser for C#-like declaration sources.
//!
//! Only declaration structure is parsed. Method bodies, accessor blocks,
//! initializers and attribute contents are skipped by bracket matching and
//! survive in the verbatim member text.

use super::lexer::{tokenize, Token, TokenKind};
use super::types::{
    line_column, DeclId, DeclKind, FieldDecl, Member, MemberKind, MethodBody, MethodDecl,
    Parameter, PropertyDecl, Span, SyntaxTree, TypeArgumentList, TypeDecl, TypeReferenceKind,
    TypeSyntax, UsingDirective,
};
use crate::error::{Error, Result};

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "sealed", "override",
    "virtual", "readonly", "partial", "async", "new", "extern", "unsafe", "volatile", "const",
    "required", "file", "ref",
];

const PARAMETER_MODIFIERS: &[&str] = &["ref", "out", "in", "params", "this", "scoped", "readonly"];

/// Parse a source file into a [`SyntaxTree`].
pub fn parse(path: &str, text: &str) -> Result<SyntaxTree> {
    let tokens = tokenize(path, text)?;
    let mut parser = Parser {
        path,
        source: text,
        tokens,
        pos: 0,
        usings: Vec::new(),
        declarations: Vec::new(),
    };
    parser.parse_namespace_body(None, false)?;
    Ok(SyntaxTree {
        path: path.to_string(),
        text: text.to_string(),
        usings: parser.usings,
        declarations: parser.declarations,
    })
}

struct Parser<'s> {
    path: &'s str,
    source: &'s str,
    tokens: Vec<Token<'s>>,
    pos: usize,
    usings: Vec<UsingDirective>,
    declarations: Vec<TypeDecl>,
}

impl<'s> Parser<'s> {
    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self, ahead: usize) -> Option<&Token<'s>> {
        self.tokens.get(self.pos + ahead)
    }

    fn at(&self, text: &str) -> bool {
        self.peek(0).is_some_and(|t| t.is(text))
    }

    fn at_ident(&self) -> bool {
        self.peek(0).is_some_and(Token::is_ident)
    }

    fn bump(&mut self) -> Result<Token<'s>> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.error_here("unexpected end of file"))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> Result<Token<'s>> {
        if self.at(text) {
            self.bump()
        } else {
            Err(self.error_here(&format!("expected '{}'", text)))
        }
    }

    fn expect_ident(&mut self) -> Result<Token<'s>> {
        if self.at_ident() {
            self.bump()
        } else {
            Err(self.error_here("expected identifier"))
        }
    }

    /// Start offset of the current token (end of input at EOF).
    fn offset(&self) -> usize {
        self.peek(0).map_or(self.source.len(), |t| t.span.start)
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map_or(0, |t| t.span.end)
    }

    fn error_here(&self, message: &str) -> Error {
        let offset = self.offset();
        let (line, column) = line_column(self.source, offset);
        let found = self
            .peek(0)
            .map_or_else(|| "end of file".to_string(), |t| format!("'{}'", t.text));
        Error::parse(self.path, line, column, format!("{}, found {}", message, found))
    }

    /// Source text between two offsets; empty when `end` precedes `start`.
    fn slice(&self, start: usize, end: usize) -> String {
        self.source
            .get(start..end.max(start))
            .unwrap_or_default()
            .to_string()
    }

    /// Skip a bracketed group starting at the current opening bracket.
    fn skip_group(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            let token = self.bump()?;
            if token.kind != TokenKind::Punct {
                continue;
            }
            match token.text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip tokens until one of `stops` at bracket depth zero (not consumed).
    fn skip_until(&mut self, stops: &[&str]) -> Result<()> {
        loop {
            let Some(token) = self.peek(0) else {
                return Err(self.error_here(&format!("expected one of {:?}", stops)));
            };
            if stops.iter().any(|stop| token.is(stop)) {
                return Ok(());
            }
            if token.is("(") || token.is("[") || token.is("{") {
                self.skip_group()?;
            } else if token.is(")") || token.is("]") || token.is("}") {
                return Err(self.error_here("unbalanced bracket"));
            } else {
                self.pos += 1;
            }
        }
    }

    /// Skip through the next `;` at depth zero.
    fn skip_statement(&mut self) -> Result<()> {
        self.skip_until(&[";"])?;
        self.bump()?;
        Ok(())
    }

    /// Skip a `{ ... }` block, `=> expr;` or a bare `;`.
    fn skip_body(&mut self) -> Result<()> {
        if self.at("{") {
            self.skip_group()
        } else if self.eat("=>") {
            self.skip_statement()
        } else {
            self.expect(";").map(|_| ())
        }
    }

    // ------------------------------------------------------------------
    // File level
    // ------------------------------------------------------------------

    fn parse_namespace_body(&mut self, namespace: Option<String>, braced: bool) -> Result<()> {
        let mut current = namespace;
        loop {
            let Some(token) = self.peek(0) else {
                if braced {
                    return Err(self.error_here("expected '}'"));
                }
                return Ok(());
            };

            if braced && token.is("}") {
                self.pos += 1;
                self.eat(";");
                return Ok(());
            }

            if token.is("using") || (token.is("global") && self.peek(1).is_some_and(|t| t.is("using"))) {
                self.parse_using()?;
            } else if token.is("extern") && self.peek(1).is_some_and(|t| t.is("alias")) {
                self.skip_statement()?;
            } else if token.is("namespace") {
                self.pos += 1;
                let name = self.parse_dotted_name()?;
                let full = match &current {
                    Some(outer) => format!("{}.{}", outer, name),
                    None => name,
                };
                if self.eat("{") {
                    self.parse_namespace_body(Some(full), true)?;
                } else {
                    self.expect(";")?;
                    current = Some(full);
                }
            } else if token.is("[") && self.is_global_attribute() {
                self.skip_group()?;
            } else {
                self.parse_type_declaration(current.clone(), None)?;
            }
        }
    }

    fn is_global_attribute(&self) -> bool {
        let target = self.peek(1).is_some_and(|t| t.is("assembly") || t.is("module"));
        target && self.peek(2).is_some_and(|t| t.is(":"))
    }

    fn parse_dotted_name(&mut self) -> Result<String> {
        let mut name = self.expect_ident()?.text.to_string();
        while self.at(".") {
            self.pos += 1;
            name.push('.');
            name.push_str(self.expect_ident()?.text);
        }
        Ok(name)
    }

    fn parse_using(&mut self) -> Result<()> {
        let start = self.offset();
        self.eat("global");
        self.expect("using")?;
        let is_static = self.eat("static");
        let alias = if self.at_ident() && self.peek(1).is_some_and(|t| t.is("=")) {
            let alias = self.bump()?.text.to_string();
            self.pos += 1;
            Some(alias)
        } else {
            None
        };
        let target = self.parse_type()?;
        self.expect(";")?;
        self.usings.push(UsingDirective {
            alias,
            is_static,
            target,
            span: Span::new(start, self.prev_end()),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_attributes(&mut self) -> Result<Vec<String>> {
        let mut attributes = Vec::new();
        while self.at("[") {
            let start = self.offset();
            self.skip_group()?;
            attributes.push(self.slice(start, self.prev_end()));
        }
        Ok(attributes)
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while let Some(token) = self.peek(0) {
            if token.is_ident() && MODIFIERS.contains(&token.text) {
                modifiers.push(token.text.to_string());
                self.pos += 1;
            } else {
                break;
            }
        }
        modifiers
    }

    fn decl_kind(&mut self) -> Option<DeclKind> {
        let token = self.peek(0)?;
        let kind = match token.text {
            "class" => DeclKind::Class,
            "struct" => DeclKind::Struct,
            "interface" => DeclKind::Interface,
            "enum" => DeclKind::Enum,
            "record" => {
                self.pos += 1;
                if self.eat("struct") {
                    return Some(DeclKind::RecordStruct);
                }
                self.eat("class");
                return Some(DeclKind::Record);
            }
            _ => return None,
        };
        self.pos += 1;
        Some(kind)
    }

    fn at_type_keyword(&self) -> bool {
        let Some(token) = self.peek(0) else {
            return false;
        };
        match token.text {
            "class" | "struct" | "interface" | "enum" => true,
            // `record` is contextual: a declaration only when a name or
            // `class`/`struct` follows.
            "record" => self.peek(1).is_some_and(|next| next.is_ident()),
            _ => false,
        }
    }

    /// Parse one type declaration; `None` for skipped forms (delegates).
    fn parse_type_declaration(
        &mut self,
        namespace: Option<String>,
        parent: Option<DeclId>,
    ) -> Result<Option<DeclId>> {
        let start = self.offset();
        let attributes = self.parse_attributes()?;
        let modifiers = self.parse_modifiers();

        if self.at("delegate") {
            self.skip_statement()?;
            return Ok(None);
        }

        let Some(kind) = self.decl_kind() else {
            return Err(self.error_here("expected type declaration"));
        };
        let name = self.expect_ident()?.text.to_string();
        let type_parameters = if self.at("<") {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };
        let primary_parameters = if self.at("(") {
            Some(self.parse_parameter_list()?)
        } else {
            None
        };

        let mut base_list = Vec::new();
        if self.eat(":") {
            loop {
                base_list.push(self.parse_type()?);
                if self.at("(") {
                    // record base arguments: `: Base(X, Y)`
                    self.skip_group()?;
                }
                if !self.eat(",") {
                    break;
                }
            }
        }

        let constraints = if self.at("where") {
            let where_start = self.offset();
            self.skip_until(&["{", ";"])?;
            let end = self.prev_end();
            Some(self.slice(where_start, end))
        } else {
            None
        };

        let id = DeclId(self.declarations.len());
        self.declarations.push(TypeDecl {
            attributes,
            modifiers,
            kind,
            name: name.clone(),
            type_parameters,
            primary_parameters,
            base_list,
            constraints,
            members: Vec::new(),
            has_body: false,
            closing_trivia: String::new(),
            namespace: namespace.clone(),
            parent,
            span: Span::default(),
        });

        let mut members = Vec::new();
        let mut closing_trivia = String::new();
        let has_body = self.at("{");
        if has_body {
            if kind == DeclKind::Enum {
                self.skip_group()?;
            } else {
                self.pos += 1;
                let mut last_end = self.prev_end();
                while !self.at("}") {
                    if self.peek(0).is_none() {
                        return Err(self.error_here(&format!("expected '}}' to close '{}'", name)));
                    }
                    let member_start = self.offset();
                    let kind = self.parse_member(id, &name, &namespace)?;
                    let end = self.prev_end();
                    members.push(Member {
                        kind,
                        text: Some(self.slice(last_end, end)),
                        span: Span::new(member_start, end),
                    });
                    last_end = end;
                }
                closing_trivia = self.slice(last_end, self.offset());
                self.pos += 1;
            }
        } else {
            self.expect(";")?;
        }
        let end = self.prev_end();

        let decl = &mut self.declarations[id.0];
        decl.members = members;
        decl.has_body = has_body;
        decl.closing_trivia = closing_trivia;
        decl.span = Span::new(start, end);
        Ok(Some(id))
    }

    fn parse_type_parameters(&mut self) -> Result<Vec<String>> {
        self.expect("<")?;
        let mut params = Vec::new();
        loop {
            self.parse_attributes()?;
            if self.at("in") || self.at("out") {
                self.pos += 1;
            }
            params.push(self.expect_ident()?.text.to_string());
            if !self.eat(",") {
                break;
            }
        }
        self.expect(">")?;
        Ok(params)
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>> {
        self.expect("(")?;
        let mut params = Vec::new();
        if self.eat(")") {
            return Ok(params);
        }
        loop {
            self.parse_attributes()?;
            let mut modifiers = Vec::new();
            while let Some(token) = self.peek(0) {
                if token.is_ident() && PARAMETER_MODIFIERS.contains(&token.text) {
                    modifiers.push(token.text.to_string());
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let ty = self.parse_type()?;
            let name = self.expect_ident()?.text.to_string();
            let default = if self.eat("=") {
                if self.at(",") || self.at(")") {
                    return Err(self.error_here("expected default value"));
                }
                let default_start = self.offset();
                self.skip_until(&[",", ")"])?;
                let end = self.prev_end();
                Some(self.slice(default_start, end))
            } else {
                None
            };
            params.push(Parameter {
                modifiers,
                ty,
                name,
                default,
            });
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    fn parse_member(
        &mut self,
        owner: DeclId,
        owner_name: &str,
        namespace: &Option<String>,
    ) -> Result<MemberKind> {
        let checkpoint = self.pos;
        let attributes = self.parse_attributes()?;
        let modifiers = self.parse_modifiers();

        if self.at_type_keyword() {
            self.pos = checkpoint;
            return Ok(match self.parse_type_declaration(namespace.clone(), Some(owner))? {
                Some(id) => MemberKind::Type { id },
                None => MemberKind::Other,
            });
        }

        if self.at("delegate") {
            self.skip_statement()?;
            return Ok(MemberKind::Other);
        }

        if self.eat("event") {
            self.skip_until(&[";", "{"])?;
            if self.at("{") {
                self.skip_group()?;
            } else {
                self.pos += 1;
            }
            return Ok(MemberKind::Other);
        }

        if self.eat("~") {
            self.skip_until(&["{", "=>", ";"])?;
            self.skip_body()?;
            return Ok(MemberKind::Other);
        }

        if self.at("implicit") || self.at("explicit") {
            self.skip_until(&["{", "=>", ";"])?;
            self.skip_body()?;
            return Ok(MemberKind::Other);
        }

        let is_constructor = self.peek(0).is_some_and(|t| t.text == owner_name)
            && self.peek(1).is_some_and(|t| t.is("("));
        if is_constructor {
            let name = self.bump()?.text.to_string();
            let parameters = self.parse_parameter_list()?;
            if self.at(":") {
                self.skip_until(&["{", "=>", ";"])?;
            }
            self.skip_body()?;
            return Ok(MemberKind::Constructor { name, parameters });
        }

        let ty = self.parse_type()?;

        if self.at("operator") {
            self.skip_until(&["{", "=>", ";"])?;
            self.skip_body()?;
            return Ok(MemberKind::Other);
        }

        if self.eat("this") {
            self.skip_group()?;
            self.skip_body()?;
            return Ok(MemberKind::Other);
        }

        let mut name = self.expect_ident()?.text.to_string();
        // Explicit interface implementations: `IShape.Area`.
        while self.at(".") && self.peek(1).is_some_and(Token::is_ident) {
            self.pos += 1;
            name = self.bump()?.text.to_string();
        }

        if self.at("<") || self.at("(") {
            let type_parameters = if self.at("<") {
                self.parse_type_parameters()?
            } else {
                Vec::new()
            };
            let parameters = self.parse_parameter_list()?;
            if self.at("where") {
                self.skip_until(&["{", "=>", ";"])?;
            }
            self.skip_body()?;
            return Ok(MemberKind::Method(MethodDecl {
                attributes,
                modifiers,
                return_type: ty,
                name,
                type_parameters,
                parameters,
                body: MethodBody::Source,
            }));
        }

        if self.at("{") {
            self.skip_group()?;
            if self.eat("=") {
                self.skip_statement()?;
            }
            return Ok(MemberKind::Property(PropertyDecl { modifiers, ty, name }));
        }

        if self.eat("=>") {
            self.skip_statement()?;
            return Ok(MemberKind::Property(PropertyDecl { modifiers, ty, name }));
        }

        let mut names = vec![name];
        loop {
            if self.eat("=") {
                // Initializers may hold generic commas; the rest of the
                // declaration is skipped wholesale.
                self.skip_statement()?;
                break;
            }
            if self.eat(",") {
                names.push(self.expect_ident()?.text.to_string());
                continue;
            }
            self.expect(";")?;
            break;
        }
        Ok(MemberKind::Field(FieldDecl { modifiers, ty, names }))
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeSyntax> {
        let start = self.offset();

        if self.at("(") {
            // Tuple types are opaque to the pipeline; keep their text.
            self.skip_group()?;
            let end = self.prev_end();
            let mut ty = TypeSyntax::named(TypeReferenceKind::Simple(self.slice(start, end)));
            ty.span = Span::new(start, end);
            self.parse_type_suffixes(&mut ty)?;
            return Ok(ty);
        }

        let mut segments = vec![self.expect_ident()?.text.to_string()];
        if self.eat("::") {
            // `global::System.String` and extern aliases
            segments.clear();
            segments.push(self.expect_ident()?.text.to_string());
        }
        while self.at(".") && self.peek(1).is_some_and(Token::is_ident) {
            self.pos += 1;
            segments.push(self.bump()?.text.to_string());
        }

        let type_args = if self.at("<") {
            let args_start = self.offset();
            self.pos += 1;
            let mut args = Vec::new();
            loop {
                args.push(self.parse_type()?);
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(">")?;
            Some(TypeArgumentList {
                args,
                span: Span::new(args_start, self.prev_end()),
            })
        } else {
            None
        };

        let reference = if segments.len() == 1 {
            TypeReferenceKind::Simple(segments.remove(0))
        } else {
            TypeReferenceKind::Qualified(segments)
        };

        let mut ty = TypeSyntax {
            reference,
            type_args,
            array_rank: 0,
            nullable: false,
            span: Span::default(),
        };
        self.parse_type_suffixes(&mut ty)?;
        ty.span = Span::new(start, self.prev_end());
        Ok(ty)
    }

    fn parse_type_suffixes(&mut self, ty: &mut TypeSyntax) -> Result<()> {
        loop {
            if self.eat("?") {
                ty.nullable = true;
            } else if self.at("[")
                && self.peek(1).is_some_and(|t| t.is("]") || t.is(","))
            {
                self.skip_group()?;
                ty.array_rank += 1;
            } else if self.eat("*") {
                continue;
            } else {
                return Ok(());
            }
        }
    }
}
