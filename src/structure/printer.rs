//! Render descriptors as source text.

use crate::config::FormattingSettings;
use crate::manipulation::errors::{ManipulationError, Result};
use crate::range::QuoteKind;
use crate::structure::{
    ImportAttributeStructure, ImportDeclarationStructure, ImportEqualsDeclarationStructure,
    ImportSpecifierStructure, Structure, VariableDeclarationStructure, VariableStatementStructure,
};

/// True for names usable as a bare identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Quote `name` unless it is an identifier or already a string literal.
pub fn render_name(name: &str, settings: &FormattingSettings) -> String {
    if is_valid_identifier(name) || QuoteKind::of_literal(name).is_some() {
        name.to_string()
    } else {
        settings.quote_kind.quote(name)
    }
}

pub fn render_specifier(spec: &ImportSpecifierStructure, settings: &FormattingSettings) -> String {
    let mut out = String::new();
    if spec.is_type_only {
        out.push_str("type ");
    }
    out.push_str(&render_name(&spec.name, settings));
    if let Some(alias) = spec.alias.as_deref().filter(|a| !a.is_empty()) {
        out.push_str(" as ");
        out.push_str(alias);
    }
    out
}

pub fn render_specifiers(specs: &[ImportSpecifierStructure], settings: &FormattingSettings) -> Vec<String> {
    specs.iter().map(|s| render_specifier(s, settings)).collect()
}

/// `{ a, b as c }` per brace padding and comma settings.
pub fn render_named_imports(specs: &[ImportSpecifierStructure], settings: &FormattingSettings) -> String {
    settings.braced(&render_specifiers(specs, settings).join(settings.comma_separator()))
}

/// Attribute values that are already string literals are written as is.
pub fn render_attribute_value(value: &str, settings: &FormattingSettings) -> String {
    if QuoteKind::of_literal(value).is_some() {
        value.to_string()
    } else {
        settings.quote_kind.quote(value)
    }
}

/// Multi-line `with { ... }` block, one attribute per line.
pub fn render_attributes(attrs: &[ImportAttributeStructure], settings: &FormattingSettings) -> String {
    if attrs.is_empty() {
        return "with {}".to_string();
    }
    let nl = settings.new_line();
    let indent = settings.indentation.as_str();
    let entries: Vec<String> = attrs
        .iter()
        .map(|a| {
            format!(
                "{indent}{}: {}",
                render_name(&a.name, settings),
                render_attribute_value(&a.value, settings)
            )
        })
        .collect();
    format!("with {{{nl}{}{nl}}}", entries.join(&format!(",{nl}")))
}

pub fn render_import_declaration(
    s: &ImportDeclarationStructure,
    settings: &FormattingSettings,
) -> Result<String> {
    let namespace = s.namespace_import.as_deref().filter(|n| !n.is_empty());
    let default = s.default_import.as_deref().filter(|n| !n.is_empty());
    if namespace.is_some() && !s.named_imports.is_empty() {
        return Err(ManipulationError::conflict(
            "an import cannot have both a namespace import and named imports",
        ));
    }

    let mut clause = Vec::new();
    if let Some(default) = default {
        clause.push(default.to_string());
    }
    if let Some(namespace) = namespace {
        clause.push(format!("* as {namespace}"));
    } else if !s.named_imports.is_empty() || (s.is_type_only && default.is_none()) {
        clause.push(render_named_imports(&s.named_imports, settings));
    }

    let mut out = String::from("import ");
    if s.is_type_only {
        out.push_str("type ");
    }
    if !clause.is_empty() {
        out.push_str(&clause.join(", "));
        out.push_str(" from ");
    }
    out.push_str(&settings.quote_kind.quote(&s.module_specifier));
    if let Some(attrs) = &s.attributes {
        out.push(' ');
        out.push_str(&render_attributes(attrs, settings));
    }
    out.push(';');
    Ok(out)
}

pub fn render_import_equals(s: &ImportEqualsDeclarationStructure) -> String {
    let type_kw = if s.is_type_only { "type " } else { "" };
    format!("import {type_kw}{} = {};", s.name, s.module_reference)
}

/// `require("m")` with the configured quote.
pub fn render_external_module_reference(value: &str, settings: &FormattingSettings) -> String {
    format!("require({})", settings.quote_kind.quote(value))
}

pub fn render_variable_declaration(s: &VariableDeclarationStructure) -> String {
    let mut out = s.name.clone();
    if let Some(ty) = &s.type_annotation {
        out.push_str(": ");
        out.push_str(ty);
    }
    if let Some(init) = &s.initializer {
        out.push_str(" = ");
        out.push_str(init);
    }
    out
}

pub fn render_variable_declarations(decls: &[VariableDeclarationStructure]) -> String {
    decls
        .iter()
        .map(render_variable_declaration)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_variable_statement(s: &VariableStatementStructure) -> Result<String> {
    if s.declarations.is_empty() {
        return Err(ManipulationError::conflict(
            "a variable statement needs at least one declaration",
        ));
    }
    Ok(format!(
        "{} {};",
        s.declaration_kind,
        render_variable_declarations(&s.declarations)
    ))
}

pub fn render_structure(s: &Structure, settings: &FormattingSettings) -> Result<String> {
    match s {
        Structure::ImportDeclaration(s) => render_import_declaration(s, settings),
        Structure::ImportEqualsDeclaration(s) => Ok(render_import_equals(s)),
        Structure::VariableStatement(s) => render_variable_statement(s),
        Structure::Statement { text } => Ok(text.clone()),
    }
}
