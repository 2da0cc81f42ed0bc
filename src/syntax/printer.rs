//! Renders declarations and generated test scenarios back to source text.
//!
//! Parsed members are emitted from their verbatim text, so only the
//! declaration header and synthesized members are normalized.

use super::statement::{Accessor, AssertionStyle, Operand, Role, Statement};
use super::types::{Member, MemberKind, MethodBody, MethodDecl, TypeDecl};
use crate::config::ScaffoldConfig;

const DEFAULT_INDENT_UNIT: &str = "    ";

/// Source renderer for declarations and assertion statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printer {
    pub style: AssertionStyle,
    pub mismatch_marker: String,
    pub expected_parameter: String,
    pub tested_parameter: String,
}

impl Default for Printer {
    fn default() -> Self {
        Self::from_config(&ScaffoldConfig::default())
    }
}

impl Printer {
    pub fn from_config(config: &ScaffoldConfig) -> Self {
        Self {
            style: config.assertion_style,
            mismatch_marker: config.mismatch_marker.clone(),
            expected_parameter: config.expected_parameter.clone(),
            tested_parameter: config.tested_parameter.clone(),
        }
    }

    /// Render a declaration whose first line starts at column `indent`.
    ///
    /// The returned text carries no indentation on its first line.
    pub fn render_declaration(&self, decl: &TypeDecl, indent: &str) -> String {
        let mut out = String::new();
        for attribute in &decl.attributes {
            out.push_str(attribute);
            out.push('\n');
            out.push_str(indent);
        }
        out.push_str(&self.render_header(decl));

        let has_generated = decl.members.iter().any(|m| m.text.is_none());
        if !decl.has_body && !has_generated {
            out.push(';');
            return out;
        }

        let member_indent = member_indent(decl, indent);
        let unit = member_indent
            .strip_prefix(indent)
            .filter(|unit| !unit.is_empty())
            .unwrap_or(DEFAULT_INDENT_UNIT)
            .to_string();

        out.push('\n');
        out.push_str(indent);
        out.push('{');

        let mut body_has_content = false;
        for member in decl.members.iter().filter(|m| m.text.is_some()) {
            out.push_str(member.text.as_deref().unwrap_or_default());
            body_has_content = true;
        }

        if !has_generated {
            out.push_str(&decl.closing_trivia);
            out.push('}');
            return out;
        }

        let trailing = decl.closing_trivia.trim_end();
        if !trailing.trim().is_empty() {
            out.push_str(trailing);
            body_has_content = true;
        }

        for member in decl.members.iter().filter(|m| m.text.is_none()) {
            if body_has_content {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&member_indent);
            out.push_str(&self.render_member(member, &member_indent, &unit));
            body_has_content = true;
        }

        out.push('\n');
        out.push_str(indent);
        out.push('}');
        out
    }

    fn render_header(&self, decl: &TypeDecl) -> String {
        let mut header = String::new();
        for modifier in &decl.modifiers {
            header.push_str(modifier);
            header.push(' ');
        }
        header.push_str(decl.kind.keyword());
        header.push(' ');
        header.push_str(&decl.name);
        if !decl.type_parameters.is_empty() {
            header.push('<');
            header.push_str(&decl.type_parameters.join(", "));
            header.push('>');
        }
        if let Some(params) = &decl.primary_parameters {
            let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
            header.push('(');
            header.push_str(&rendered.join(", "));
            header.push(')');
        }
        if !decl.base_list.is_empty() {
            let bases: Vec<String> = decl.base_list.iter().map(ToString::to_string).collect();
            header.push_str(" : ");
            header.push_str(&bases.join(", "));
        }
        if let Some(constraints) = &decl.constraints {
            header.push(' ');
            header.push_str(constraints);
        }
        header
    }

    fn render_member(&self, member: &Member, indent: &str, unit: &str) -> String {
        match &member.kind {
            MemberKind::Method(method) => self.render_method(method, indent, unit),
            MemberKind::Property(property) => format!(
                "{}{} {} {{ get; set; }}",
                prefix_modifiers(&property.modifiers),
                property.ty,
                property.name
            ),
            MemberKind::Field(field) => format!(
                "{}{} {};",
                prefix_modifiers(&field.modifiers),
                field.ty,
                field.names.join(", ")
            ),
            MemberKind::Constructor { name, parameters } => {
                let params: Vec<String> = parameters.iter().map(ToString::to_string).collect();
                format!("public {}({})\n{}{{\n{}}}", name, params.join(", "), indent, indent)
            }
            MemberKind::Type { .. } | MemberKind::Other => String::new(),
        }
    }

    /// Render a method declaration; `indent` is the method's own column.
    pub fn render_method(&self, method: &MethodDecl, indent: &str, unit: &str) -> String {
        let mut out = String::new();
        for attribute in &method.attributes {
            out.push_str(attribute);
            out.push('\n');
            out.push_str(indent);
        }
        out.push_str(&prefix_modifiers(&method.modifiers));
        out.push_str(&method.return_type.to_string());
        out.push(' ');
        out.push_str(&method.name);
        if !method.type_parameters.is_empty() {
            out.push('<');
            out.push_str(&method.type_parameters.join(", "));
            out.push('>');
        }
        let params: Vec<String> = method.parameters.iter().map(ToString::to_string).collect();
        out.push('(');
        out.push_str(&params.join(", "));
        out.push(')');

        let MethodBody::Statements(statements) = &method.body else {
            out.push(';');
            return out;
        };

        out.push('\n');
        out.push_str(indent);
        out.push('{');
        let body_indent = format!("{}{}", indent, unit);
        let mut previous: Option<&Statement> = None;
        for statement in statements {
            if previous.is_some_and(|prev| starts_block(prev, statement)) {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&body_indent);
            out.push_str(&self.render_statement(statement));
            previous = Some(statement);
        }
        out.push('\n');
        out.push_str(indent);
        out.push('}');
        out
    }

    /// Render a single assertion statement in the configured dialect.
    pub fn render_statement(&self, statement: &Statement) -> String {
        match (self.style, statement) {
            (AssertionStyle::NUnit, Statement::NotNull { target }) => {
                format!("Assert.That({}, Is.Not.Null);", self.operand(target))
            }
            (AssertionStyle::NUnit, Statement::Equal { actual, expected }) => format!(
                "Assert.That({}, Is.EqualTo({}));",
                self.operand(actual),
                self.operand(expected)
            ),
            (AssertionStyle::NUnit, Statement::CountEqual { actual, expected }) => format!(
                "Assert.That({}.Length, Is.EqualTo({}.Count));",
                self.operand(actual),
                self.operand(expected)
            ),
            (AssertionStyle::XUnit, Statement::NotNull { target }) => {
                format!("Assert.NotNull({});", self.operand(target))
            }
            (AssertionStyle::XUnit, Statement::Equal { actual, expected }) => format!(
                "Assert.Equal({}, {});",
                self.operand(expected),
                self.operand(actual)
            ),
            (AssertionStyle::XUnit, Statement::CountEqual { actual, expected }) => format!(
                "Assert.Equal({}.Count, {}.Length);",
                self.operand(expected),
                self.operand(actual)
            ),
        }
    }

    fn operand(&self, operand: &Operand) -> String {
        let instance = match operand.role {
            Role::Expected => &self.expected_parameter,
            Role::Tested => &self.tested_parameter,
        };
        match &operand.accessor {
            Accessor::Instance => instance.clone(),
            Accessor::Member(name) => format!("{}.{}", instance, name),
            Accessor::Mismatch => format!("{}.{}", instance, self.mismatch_marker),
        }
    }
}

/// A blank line separates the instance guards from the member assertions
/// and precedes every collection group.
fn starts_block(previous: &Statement, current: &Statement) -> bool {
    let is_guard = |s: &Statement| {
        matches!(
            s,
            Statement::NotNull {
                target: Operand {
                    accessor: Accessor::Instance,
                    ..
                }
            }
        )
    };
    (is_guard(previous) && !is_guard(current)) || current.opens_group()
}

fn prefix_modifiers(modifiers: &[String]) -> String {
    modifiers.iter().map(|m| format!("{} ", m)).collect()
}

/// Indentation of the first parsed member, or `indent` plus one unit.
fn member_indent(decl: &TypeDecl, indent: &str) -> String {
    decl.members
        .iter()
        .filter_map(|m| m.text.as_deref())
        .find_map(|text| {
            let line = text.lines().find(|line| !line.trim().is_empty())?;
            let width = line.len() - line.trim_start().len();
            let leading = &line[..width];
            // Only trust the member's indentation when it sits on its own line.
            (text.contains('\n') && leading.len() > indent.len()).then(|| leading.to_string())
        })
        .unwrap_or_else(|| format!("{}{}", indent, DEFAULT_INDENT_UNIT))
}
