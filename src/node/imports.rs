//! Import declaration, import specifier and import-equals views.
//!
//! Each mutation is planned by a free function over the current text and
//! tree, then applied through the file's engine as a single batch.

use super::{node_view, Node};
use crate::edit::TextEdit;
use crate::manipulation::comma_list::{insert_elements, remove_elements, replace_elements, CommaList};
use crate::manipulation::engine::FileState;
use crate::manipulation::errors::{ManipulationError, Result};
use crate::range::{indentation_at, literal_value, statement_removal_range, QuoteKind, TextRange};
use crate::structure::printer::{
    render_attributes, render_external_module_reference, render_name, render_specifiers,
};
use crate::structure::{
    ImportAttributeStructure, ImportDeclarationPatch, ImportDeclarationStructure,
    ImportEqualsDeclarationPatch, ImportEqualsDeclarationStructure, ImportSpecifierPatch,
    ImportSpecifierStructure, Structured,
};
use crate::syntax::{RawNodeId, SyntaxKind, SyntaxTree};

node_view!(
    /// `import ... from "m";` or a side-effect `import "m";`
    ImportDeclaration => ImportDeclaration
);

node_view!(
    /// One entry of a named import list.
    ImportSpecifier => ImportSpecifier
);

node_view!(
    /// `import x = require("m");` or `import x = A.B;`
    ImportEqualsDeclaration => ImportEqualsDeclaration
);

fn missing(what: &'static str) -> ManipulationError {
    ManipulationError::MissingChild { what }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Syntactic pieces of an import declaration in one tree.
#[derive(Debug, Default, Clone, Copy)]
struct ImportParts {
    import_kw: Option<RawNodeId>,
    type_kw: Option<RawNodeId>,
    clause: Option<RawNodeId>,
    default: Option<RawNodeId>,
    namespace: Option<RawNodeId>,
    named: Option<RawNodeId>,
    source: Option<RawNodeId>,
    attribute: Option<RawNodeId>,
}

impl ImportParts {
    fn read(tree: &SyntaxTree, decl: RawNodeId) -> Self {
        let clause = tree.first_child_of_kind(decl, SyntaxKind::ImportClause);
        let in_clause = |kind| clause.and_then(|c| tree.first_child_of_kind(c, kind));
        Self {
            import_kw: tree.token(decl, "import"),
            type_kw: tree.token(decl, "type"),
            clause,
            default: in_clause(SyntaxKind::Identifier),
            namespace: in_clause(SyntaxKind::NamespaceImport),
            named: in_clause(SyntaxKind::NamedImports),
            source: tree.child_by_field(decl, "source"),
            attribute: tree.first_child_of_kind(decl, SyntaxKind::ImportAttribute),
        }
    }

    fn source(&self) -> Result<RawNodeId> {
        self.source.ok_or_else(|| missing("module specifier"))
    }

    fn namespace_name(&self, tree: &SyntaxTree) -> Option<RawNodeId> {
        self.namespace
            .and_then(|ns| tree.first_child_of_kind(ns, SyntaxKind::Identifier))
    }

    fn specifiers(&self, tree: &SyntaxTree) -> Vec<RawNodeId> {
        self.named.map_or_else(Vec::new, |named| specifiers_of(tree, named))
    }
}

fn specifiers_of(tree: &SyntaxTree, named: RawNodeId) -> Vec<RawNodeId> {
    tree.named_children(named)
        .filter(|&c| tree.kind(c) == Some(SyntaxKind::ImportSpecifier))
        .collect()
}

/// Delete everything from the clause up to the module specifier.
fn plan_clause_removal(state: &FileState, parts: &ImportParts) -> Result<Vec<TextEdit>> {
    let clause = parts.clause.ok_or_else(|| missing("import clause"))?;
    let range = TextRange::new(
        state.node_range(clause)?.pos,
        state.node_range(parts.source()?)?.pos,
    );
    Ok(vec![TextEdit::delete(state.text(), range)])
}

fn plan_type_only(state: &FileState, decl: RawNodeId, value: bool) -> Result<Vec<TextEdit>> {
    let parts = ImportParts::read(state.tree(), decl);
    let import_kw = parts.import_kw.ok_or_else(|| missing("`import` keyword"))?;
    let after_import = state.node_range(import_kw)?.end;
    match (value, parts.type_kw) {
        (true, None) => {
            if parts.clause.is_none() {
                return Err(ManipulationError::conflict(
                    "a side-effect import cannot be type-only",
                ));
            }
            Ok(vec![TextEdit::insert(state.text(), after_import, " type")])
        }
        (false, Some(type_kw)) => {
            let range = TextRange::new(after_import, state.node_range(type_kw)?.end);
            Ok(vec![TextEdit::delete(state.text(), range)])
        }
        _ => Ok(Vec::new()),
    }
}

fn plan_module_specifier(state: &FileState, decl: RawNodeId, value: &str) -> Result<Vec<TextEdit>> {
    let source = ImportParts::read(state.tree(), decl).source()?;
    let quote = QuoteKind::of_literal(state.node_text(source)).unwrap_or(state.settings().quote_kind);
    Ok(vec![TextEdit::replace(
        state.text(),
        state.node_range(source)?,
        quote.quote(value),
    )])
}

fn plan_set_default(
    state: &FileState,
    decl: RawNodeId,
    name: &str,
    propagate: bool,
) -> Result<Vec<TextEdit>> {
    let name = name.trim();
    if name.is_empty() {
        return plan_remove_default(state, decl);
    }
    let parts = ImportParts::read(state.tree(), decl);
    let text = state.text();

    if let Some(default) = parts.default {
        let mut edits = vec![TextEdit::replace(text, state.node_range(default)?, name)];
        if propagate {
            edits.extend(state.reference_edits(default, name)?);
        }
        return Ok(edits);
    }

    match parts.clause {
        Some(clause) => Ok(vec![TextEdit::insert(
            text,
            state.node_range(clause)?.pos,
            format!("{name}, "),
        )]),
        None => Ok(vec![TextEdit::insert(
            text,
            state.node_range(parts.source()?)?.pos,
            format!("{name} from "),
        )]),
    }
}

fn plan_remove_default(state: &FileState, decl: RawNodeId) -> Result<Vec<TextEdit>> {
    let parts = ImportParts::read(state.tree(), decl);
    let Some(default) = parts.default else {
        return Ok(Vec::new());
    };
    let range = state.node_range(default)?;

    if let Some(other) = parts.namespace.or(parts.named) {
        let span = TextRange::new(range.pos, state.node_range(other)?.pos);
        Ok(vec![TextEdit::delete(state.text(), span)])
    } else if parts.type_kw.is_some() {
        Ok(vec![TextEdit::replace(state.text(), range, "{}")])
    } else {
        plan_clause_removal(state, &parts)
    }
}

fn plan_set_namespace(state: &FileState, decl: RawNodeId, name: &str) -> Result<Vec<TextEdit>> {
    let name = name.trim();
    if name.is_empty() {
        return plan_remove_namespace(state, decl);
    }
    let tree = state.tree();
    let parts = ImportParts::read(tree, decl);
    let text = state.text();

    if parts.namespace.is_some() {
        let ident = parts
            .namespace_name(tree)
            .ok_or_else(|| missing("namespace import name"))?;
        let mut edits = vec![TextEdit::replace(text, state.node_range(ident)?, name)];
        edits.extend(state.reference_edits(ident, name)?);
        return Ok(edits);
    }
    if let Some(named) = parts.named {
        if !specifiers_of(tree, named).is_empty() {
            return Err(ManipulationError::conflict(
                "cannot set a namespace import while named imports exist",
            ));
        }
        return Ok(vec![TextEdit::replace(
            text,
            state.node_range(named)?,
            format!("* as {name}"),
        )]);
    }
    match parts.default {
        Some(default) => Ok(vec![TextEdit::insert(
            text,
            state.node_range(default)?.end,
            format!(", * as {name}"),
        )]),
        None => Ok(vec![TextEdit::insert(
            text,
            state.node_range(parts.source()?)?.pos,
            format!("* as {name} from "),
        )]),
    }
}

fn plan_remove_namespace(state: &FileState, decl: RawNodeId) -> Result<Vec<TextEdit>> {
    let parts = ImportParts::read(state.tree(), decl);
    let Some(namespace) = parts.namespace else {
        return Ok(Vec::new());
    };
    let range = state.node_range(namespace)?;

    if let Some(default) = parts.default {
        let span = TextRange::new(state.node_range(default)?.end, range.end);
        Ok(vec![TextEdit::delete(state.text(), span)])
    } else if parts.type_kw.is_some() {
        Ok(vec![TextEdit::replace(state.text(), range, "{}")])
    } else {
        plan_clause_removal(state, &parts)
    }
}

fn named_list(tree: &SyntaxTree, named: RawNodeId) -> Result<CommaList> {
    CommaList::from_node(tree, named).ok_or_else(|| missing("named import braces"))
}

fn plan_insert_named(
    state: &FileState,
    decl: RawNodeId,
    index: usize,
    rendered: &[String],
) -> Result<Vec<TextEdit>> {
    let tree = state.tree();
    let parts = ImportParts::read(tree, decl);
    let settings = state.settings();

    if let Some(named) = parts.named {
        return insert_elements(state.text(), &named_list(tree, named)?, index, rendered, &settings);
    }
    if index != 0 {
        return Err(ManipulationError::argument_range(format!(
            "insert index {index} is outside 0..=0"
        )));
    }
    if rendered.is_empty() {
        return Ok(Vec::new());
    }
    if parts.namespace.is_some() {
        return Err(ManipulationError::conflict(
            "cannot add named imports to a namespace import",
        ));
    }

    let braced = settings.braced(&rendered.join(settings.comma_separator()));
    match parts.default {
        Some(default) => Ok(vec![TextEdit::insert(
            state.text(),
            state.node_range(default)?.end,
            format!(", {braced}"),
        )]),
        None => Ok(vec![TextEdit::insert(
            state.text(),
            state.node_range(parts.source()?)?.pos,
            format!("{braced} from "),
        )]),
    }
}

/// Rewrite the named list to exactly `rendered` in one edit.
fn plan_replace_named(state: &FileState, decl: RawNodeId, rendered: &[String]) -> Result<Vec<TextEdit>> {
    let tree = state.tree();
    match ImportParts::read(tree, decl).named {
        Some(named) => Ok(replace_elements(
            state.text(),
            &named_list(tree, named)?,
            rendered,
            &state.settings(),
        )),
        None => plan_insert_named(state, decl, 0, rendered),
    }
}

fn plan_remove_named(state: &FileState, decl: RawNodeId) -> Result<Vec<TextEdit>> {
    let parts = ImportParts::read(state.tree(), decl);
    let Some(named) = parts.named else {
        return Ok(Vec::new());
    };
    let range = state.node_range(named)?;

    if let Some(default) = parts.default {
        let span = TextRange::new(state.node_range(default)?.end, range.end);
        Ok(vec![TextEdit::delete(state.text(), span)])
    } else if parts.type_kw.is_some() {
        Ok(vec![TextEdit::replace(state.text(), range, "{}")])
    } else {
        plan_clause_removal(state, &parts)
    }
}

fn plan_remove_named_at(state: &FileState, decl: RawNodeId, indices: &[usize]) -> Result<Vec<TextEdit>> {
    let tree = state.tree();
    match ImportParts::read(tree, decl).named {
        Some(named) => remove_elements(state.text(), &named_list(tree, named)?, indices),
        None if indices.is_empty() => Ok(Vec::new()),
        None => Err(ManipulationError::argument_range(
            "import declaration has no named imports",
        )),
    }
}

fn plan_attributes(
    state: &FileState,
    decl: RawNodeId,
    attrs: Option<&[ImportAttributeStructure]>,
) -> Result<Vec<TextEdit>> {
    let parts = ImportParts::read(state.tree(), decl);
    let after_source = state.node_range(parts.source()?)?.end;
    let text = state.text();
    let settings = state.settings();
    let nl = settings.new_line();
    // Continuation lines follow the statement's own indentation.
    let render = |attrs: &[ImportAttributeStructure]| {
        render_attributes(attrs, &settings)
            .replace(nl, &format!("{nl}{}", indentation_at(text, after_source)))
    };

    Ok(match (attrs, parts.attribute) {
        (None, None) => Vec::new(),
        (None, Some(attr)) => {
            let span = TextRange::new(after_source, state.node_range(attr)?.end);
            vec![TextEdit::delete(text, span)]
        }
        (Some(attrs), Some(attr)) => {
            vec![TextEdit::replace(text, state.node_range(attr)?, render(attrs))]
        }
        (Some(attrs), None) => {
            vec![TextEdit::insert(text, after_source, format!(" {}", render(attrs)))]
        }
    })
}

fn read_attributes(state: &FileState, attr: RawNodeId) -> Vec<ImportAttributeStructure> {
    let tree = state.tree();
    let Some(object) = tree.first_child_of_kind(attr, SyntaxKind::ObjectLiteral) else {
        return Vec::new();
    };
    tree.named_children(object)
        .filter(|&c| tree.kind(c) == Some(SyntaxKind::PropertyAssignment))
        .filter_map(|pair| {
            let key = tree.child_by_field(pair, "key")?;
            let value = tree.child_by_field(pair, "value")?;
            Some(ImportAttributeStructure::new(
                state.node_text(key),
                state.node_text(value),
            ))
        })
        .collect()
}

fn read_specifier(state: &FileState, spec: RawNodeId) -> Result<ImportSpecifierStructure> {
    let parts = SpecifierParts::read(state.tree(), spec);
    let name = parts.name.ok_or_else(|| missing("import specifier name"))?;
    Ok(ImportSpecifierStructure {
        name: state.node_text(name).to_string(),
        alias: parts.alias.map(|a| state.node_text(a).to_string()),
        is_type_only: parts.type_kw.is_some(),
    })
}

fn read_import(state: &FileState, decl: RawNodeId) -> Result<ImportDeclarationStructure> {
    let tree = state.tree();
    let parts = ImportParts::read(tree, decl);
    let text_of = |id: Option<RawNodeId>| id.map(|id| state.node_text(id).to_string());

    Ok(ImportDeclarationStructure {
        is_type_only: parts.type_kw.is_some(),
        default_import: text_of(parts.default),
        namespace_import: text_of(parts.namespace_name(tree)),
        named_imports: parts
            .specifiers(tree)
            .into_iter()
            .map(|s| read_specifier(state, s))
            .collect::<Result<_>>()?,
        module_specifier: literal_value(state.node_text(parts.source()?)).to_string(),
        attributes: parts.attribute.map(|a| read_attributes(state, a)),
    })
}

impl ImportDeclaration {
    pub fn is_type_only(&self) -> Result<bool> {
        self.read(|state, raw| Ok(ImportParts::read(state.tree(), raw).type_kw.is_some()))
    }

    pub fn set_is_type_only(&self, value: bool) -> Result<()> {
        self.edit(|state, raw| plan_type_only(state, raw, value))
    }

    /// The string literal naming the imported module.
    pub fn module_specifier(&self) -> Result<Node> {
        self.related_one(|state, raw| ImportParts::read(state.tree(), raw).source)?
            .ok_or_else(|| missing("module specifier"))
    }

    pub fn module_specifier_value(&self) -> Result<String> {
        self.read(|state, raw| {
            let source = ImportParts::read(state.tree(), raw).source()?;
            Ok(literal_value(state.node_text(source)).to_string())
        })
    }

    /// Replace the module specifier, keeping its quote character.
    pub fn set_module_specifier(&self, value: &str) -> Result<()> {
        self.edit(|state, raw| plan_module_specifier(state, raw, value))
    }

    pub fn is_module_specifier_relative(&self) -> Result<bool> {
        Ok(is_relative(&self.module_specifier_value()?))
    }

    pub fn import_clause(&self) -> Result<Option<Node>> {
        self.related_one(|state, raw| ImportParts::read(state.tree(), raw).clause)
    }

    pub fn import_clause_or_err(&self) -> Result<Node> {
        self.import_clause()?.ok_or_else(|| missing("import clause"))
    }

    /// Identifier of the default import.
    pub fn default_import(&self) -> Result<Option<Node>> {
        self.related_one(|state, raw| ImportParts::read(state.tree(), raw).default)
    }

    pub fn default_import_or_err(&self) -> Result<Node> {
        self.default_import()?.ok_or_else(|| missing("default import"))
    }

    /// Set the default import name without touching its references.
    ///
    /// A blank name removes the default import.
    pub fn set_default_import(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| plan_set_default(state, raw, name, false))
    }

    /// Like [`ImportDeclaration::set_default_import`], renaming every
    /// reference of an existing default import as well.
    pub fn rename_default_import(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| plan_set_default(state, raw, name, true))
    }

    pub fn remove_default_import(&self) -> Result<()> {
        self.edit(plan_remove_default)
    }

    /// Identifier bound by `* as name`.
    pub fn namespace_import(&self) -> Result<Option<Node>> {
        self.related_one(|state, raw| ImportParts::read(state.tree(), raw).namespace_name(state.tree()))
    }

    pub fn namespace_import_or_err(&self) -> Result<Node> {
        self.namespace_import()?
            .ok_or_else(|| missing("namespace import"))
    }

    /// Add or rename the namespace import; a blank name removes it.
    ///
    /// Fails with `StructuralConflict` while named imports exist.
    pub fn set_namespace_import(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| plan_set_namespace(state, raw, name))
    }

    pub fn remove_namespace_import(&self) -> Result<()> {
        self.edit(plan_remove_namespace)
    }

    pub fn named_imports(&self) -> Result<Vec<ImportSpecifier>> {
        let specs = self.related(|state, raw| ImportParts::read(state.tree(), raw).specifiers(state.tree()))?;
        Ok(specs.into_iter().map(ImportSpecifier).collect())
    }

    /// Insert specifiers at `index`, creating the named list if needed.
    pub fn insert_named_imports(
        &self,
        index: usize,
        specs: &[ImportSpecifierStructure],
    ) -> Result<Vec<ImportSpecifier>> {
        self.edit(|state, raw| {
            let rendered = render_specifiers(specs, &state.settings());
            plan_insert_named(state, raw, index, &rendered)
        })?;
        let inserted = self.related(|state, raw| {
            ImportParts::read(state.tree(), raw)
                .specifiers(state.tree())
                .into_iter()
                .skip(index)
                .take(specs.len())
                .collect()
        })?;
        Ok(inserted.into_iter().map(ImportSpecifier).collect())
    }

    pub fn insert_named_import(&self, index: usize, spec: ImportSpecifierStructure) -> Result<ImportSpecifier> {
        self.insert_named_imports(index, std::slice::from_ref(&spec))?
            .pop()
            .ok_or_else(|| missing("inserted import specifier"))
    }

    pub fn add_named_imports(&self, specs: &[ImportSpecifierStructure]) -> Result<Vec<ImportSpecifier>> {
        let len = self.named_imports()?.len();
        self.insert_named_imports(len, specs)
    }

    pub fn add_named_import(&self, spec: ImportSpecifierStructure) -> Result<ImportSpecifier> {
        let len = self.named_imports()?.len();
        self.insert_named_import(len, spec)
    }

    /// Remove the whole named import list.
    pub fn remove_named_imports(&self) -> Result<()> {
        self.edit(plan_remove_named)
    }

    /// Remove the specifiers at `indices`, leaving `{}` if none remain.
    pub fn remove_named_imports_at(&self, indices: &[usize]) -> Result<()> {
        self.edit(|state, raw| plan_remove_named_at(state, raw, indices))
    }

    pub fn attributes(&self) -> Result<Option<Vec<ImportAttributeStructure>>> {
        self.read(|state, raw| {
            Ok(ImportParts::read(state.tree(), raw)
                .attribute
                .map(|a| read_attributes(state, a)))
        })
    }

    /// Write or replace the `with { ... }` clause; `None` removes it.
    pub fn set_attributes(&self, attrs: Option<&[ImportAttributeStructure]>) -> Result<()> {
        self.edit(|state, raw| plan_attributes(state, raw, attrs))
    }

    /// Remove the whole statement, including its line break.
    pub fn remove(&self) -> Result<()> {
        remove_statement(self)
    }
}

pub(crate) fn remove_statement(node: &Node) -> Result<()> {
    node.edit_detached(|state, raw| {
        let range = statement_removal_range(state.text(), state.node_range(raw)?);
        Ok(vec![TextEdit::delete(state.text(), range)])
    })
}

impl Structured for ImportDeclaration {
    type Structure = ImportDeclarationStructure;
    type Patch = ImportDeclarationPatch;

    fn structure(&self) -> Result<ImportDeclarationStructure> {
        self.read(read_import)
    }

    fn set(&self, patch: &ImportDeclarationPatch) -> Result<()> {
        self.atomically(|| {
            let current = self.structure()?;
            let nonblank = |name: &Option<String>| name.clone().filter(|n| !n.trim().is_empty());

            let default = match &patch.default_import {
                Some(name) => nonblank(name),
                None => current.default_import.clone(),
            };
            let namespace = match &patch.namespace_import {
                Some(name) => nonblank(name),
                None => current.namespace_import.clone(),
            };
            let named = patch
                .named_imports
                .clone()
                .unwrap_or_else(|| current.named_imports.clone());
            if namespace.is_some() && !named.is_empty() {
                return Err(ManipulationError::conflict(
                    "an import cannot have both a namespace import and named imports",
                ));
            }

            if let Some(spec) = &patch.module_specifier {
                if *spec != current.module_specifier {
                    self.set_module_specifier(spec)?;
                }
            }

            if named.is_empty() && !current.named_imports.is_empty() {
                self.remove_named_imports()?;
            }
            if namespace.is_none() && current.namespace_import.is_some() {
                self.remove_namespace_import()?;
            }
            if default.is_none() && current.default_import.is_some() {
                self.remove_default_import()?;
            }

            if let Some(name) = &default {
                if current.default_import.as_ref() != Some(name) {
                    self.set_default_import(name)?;
                }
            }
            if let Some(name) = &namespace {
                if current.namespace_import.as_ref() != Some(name) {
                    self.set_namespace_import(name)?;
                }
            }
            if !named.is_empty() && named != current.named_imports {
                self.edit(|state, raw| {
                    let rendered = render_specifiers(&named, &state.settings());
                    plan_replace_named(state, raw, &rendered)
                })?;
            }

            if let Some(type_only) = patch.is_type_only {
                if type_only != current.is_type_only {
                    self.set_is_type_only(type_only)?;
                }
            }
            if let Some(attrs) = &patch.attributes {
                if *attrs != current.attributes {
                    self.set_attributes(attrs.as_deref())?;
                }
            }
            Ok(())
        })
    }
}

/// Syntactic pieces of an import specifier.
#[derive(Debug, Clone, Copy)]
struct SpecifierParts {
    type_kw: Option<RawNodeId>,
    name: Option<RawNodeId>,
    alias: Option<RawNodeId>,
}

impl SpecifierParts {
    fn read(tree: &SyntaxTree, spec: RawNodeId) -> Self {
        Self {
            type_kw: tree.token(spec, "type"),
            name: tree.child_by_field(spec, "name"),
            alias: tree.child_by_field(spec, "alias"),
        }
    }

    fn name(&self) -> Result<RawNodeId> {
        self.name.ok_or_else(|| missing("import specifier name"))
    }
}

/// Import statement owning a specifier.
fn declaration_of(tree: &SyntaxTree, spec: RawNodeId) -> Option<RawNodeId> {
    let named = tree.parent(spec)?;
    let clause = tree.parent(named)?;
    tree.parent(clause)
}

fn plan_specifier_alias(
    state: &FileState,
    spec: RawNodeId,
    alias: &str,
    propagate: bool,
) -> Result<Vec<TextEdit>> {
    let alias = alias.trim();
    let parts = SpecifierParts::read(state.tree(), spec);
    let name = parts.name()?;
    let text = state.text();

    if alias.is_empty() {
        let Some(existing) = parts.alias else {
            return Ok(Vec::new());
        };
        let span = TextRange::new(state.node_range(name)?.end, state.node_range(existing)?.end);
        let mut edits = vec![TextEdit::delete(text, span)];
        if propagate {
            edits.extend(state.reference_edits(existing, state.node_text(name))?);
        }
        return Ok(edits);
    }

    let mut edits = Vec::new();
    match parts.alias {
        Some(existing) => {
            edits.push(TextEdit::replace(text, state.node_range(existing)?, alias));
            if propagate {
                edits.extend(state.reference_edits(existing, alias)?);
            }
        }
        None => {
            edits.push(TextEdit::insert(
                text,
                state.node_range(name)?.end,
                format!(" as {alias}"),
            ));
            if propagate && state.tree().kind(name) == Some(SyntaxKind::Identifier) {
                edits.extend(
                    state
                        .reference_edits(name, alias)?
                        .into_iter()
                        .filter(|e| !is_import_site(state, e.range)),
                );
            }
        }
    }
    Ok(edits)
}

/// Reference sites inside other import specifiers name other modules.
fn is_import_site(state: &FileState, range: TextRange) -> bool {
    let tree = state.tree();
    tree.find_node(range, "identifier")
        .and_then(|id| tree.parent(id))
        .is_some_and(|p| tree.kind(p) == Some(SyntaxKind::ImportSpecifier))
}

fn plan_specifier_type_only(state: &FileState, spec: RawNodeId, value: bool) -> Result<Vec<TextEdit>> {
    let parts = SpecifierParts::read(state.tree(), spec);
    match (value, parts.type_kw) {
        (true, None) => Ok(vec![TextEdit::insert(
            state.text(),
            state.node_range(spec)?.pos,
            "type ",
        )]),
        (false, Some(type_kw)) => {
            let span = TextRange::new(
                state.node_range(type_kw)?.pos,
                state.node_range(parts.name()?)?.pos,
            );
            Ok(vec![TextEdit::delete(state.text(), span)])
        }
        _ => Ok(Vec::new()),
    }
}

fn plan_remove_specifier(state: &FileState, spec: RawNodeId) -> Result<Vec<TextEdit>> {
    let tree = state.tree();
    let named = tree.parent(spec).ok_or_else(|| missing("named imports"))?;
    let list = named_list(tree, named)?;
    let range = state.node_range(spec)?;
    let index = list
        .elements
        .iter()
        .position(|r| *r == range)
        .ok_or_else(|| missing("import specifier in its list"))?;

    if list.len() > 1 {
        remove_elements(state.text(), &list, &[index])
    } else {
        let decl = declaration_of(tree, spec).ok_or_else(|| missing("import declaration"))?;
        plan_remove_named(state, decl)
    }
}

impl ImportSpecifier {
    pub fn name(&self) -> Result<String> {
        self.read(|state, raw| {
            let name = SpecifierParts::read(state.tree(), raw).name()?;
            Ok(state.node_text(name).to_string())
        })
    }

    pub fn name_node(&self) -> Result<Node> {
        self.related_one(|state, raw| SpecifierParts::read(state.tree(), raw).name)?
            .ok_or_else(|| missing("import specifier name"))
    }

    /// Replace the imported name; names that are not identifiers are quoted.
    pub fn set_name(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| {
            let node = SpecifierParts::read(state.tree(), raw).name()?;
            Ok(vec![TextEdit::replace(
                state.text(),
                state.node_range(node)?,
                render_name(name, &state.settings()),
            )])
        })
    }

    pub fn alias(&self) -> Result<Option<String>> {
        self.read(|state, raw| {
            Ok(SpecifierParts::read(state.tree(), raw)
                .alias
                .map(|a| state.node_text(a).to_string()))
        })
    }

    pub fn alias_node(&self) -> Result<Option<Node>> {
        self.related_one(|state, raw| SpecifierParts::read(state.tree(), raw).alias)
    }

    /// Set the alias without renaming references; blank removes it.
    pub fn set_alias(&self, alias: &str) -> Result<()> {
        self.edit(|state, raw| plan_specifier_alias(state, raw, alias, false))
    }

    pub fn remove_alias(&self) -> Result<()> {
        self.set_alias("")
    }

    /// Set the alias and rename every local reference to it.
    ///
    /// A blank alias removes it and points references back at the imported
    /// name.
    pub fn rename_alias(&self, alias: &str) -> Result<()> {
        self.edit(|state, raw| plan_specifier_alias(state, raw, alias, true))
    }

    pub fn is_type_only(&self) -> Result<bool> {
        self.read(|state, raw| Ok(SpecifierParts::read(state.tree(), raw).type_kw.is_some()))
    }

    pub fn set_is_type_only(&self, value: bool) -> Result<()> {
        self.edit(|state, raw| plan_specifier_type_only(state, raw, value))
    }

    /// Remove this specifier; the last one takes the named list with it.
    pub fn remove(&self) -> Result<()> {
        self.edit_detached(plan_remove_specifier)
    }

    pub fn import_declaration(&self) -> Result<ImportDeclaration> {
        let decl = self.related_one(|state, raw| declaration_of(state.tree(), raw))?;
        ImportDeclaration::try_from(decl.ok_or_else(|| missing("import declaration"))?)
    }
}

impl Structured for ImportSpecifier {
    type Structure = ImportSpecifierStructure;
    type Patch = ImportSpecifierPatch;

    fn structure(&self) -> Result<ImportSpecifierStructure> {
        self.read(read_specifier)
    }

    fn set(&self, patch: &ImportSpecifierPatch) -> Result<()> {
        self.atomically(|| {
            let current = self.structure()?;
            if let Some(type_only) = patch.is_type_only {
                if type_only != current.is_type_only {
                    self.set_is_type_only(type_only)?;
                }
            }
            if let Some(name) = &patch.name {
                if *name != current.name {
                    self.set_name(name)?;
                }
            }
            if let Some(alias) = &patch.alias {
                if *alias != current.alias {
                    self.set_alias(alias.as_deref().unwrap_or_default())?;
                }
            }
            Ok(())
        })
    }
}

/// Syntactic pieces of either import-equals form.
#[derive(Debug, Clone, Copy)]
struct ImportEqualsParts {
    import_kw: Option<RawNodeId>,
    type_kw: Option<RawNodeId>,
    name: Option<RawNodeId>,
    reference: Option<TextRange>,
    /// String literal inside `require(...)`
    source: Option<RawNodeId>,
}

impl ImportEqualsParts {
    fn read(tree: &SyntaxTree, stmt: RawNodeId) -> Self {
        let import_kw = tree.token(stmt, "import");
        let type_kw = tree.token(stmt, "type");

        if let Some(clause) = tree.first_child_of_kind(stmt, SyntaxKind::ImportRequireClause) {
            let require = tree.token(clause, "require").and_then(|t| tree.range(t));
            let close = tree.token(clause, ")").and_then(|t| tree.range(t));
            return Self {
                import_kw,
                type_kw,
                name: tree.first_child_of_kind(clause, SyntaxKind::Identifier),
                reference: require.zip(close).map(|(r, c)| TextRange::new(r.pos, c.end)),
                source: tree.child_by_field(clause, "source"),
            };
        }

        let mut named = tree.named_children(stmt);
        let name = named.next();
        let reference = named.next().and_then(|r| tree.range(r));
        Self {
            import_kw,
            type_kw,
            name,
            reference,
            source: None,
        }
    }

    fn name(&self) -> Result<RawNodeId> {
        self.name.ok_or_else(|| missing("import-equals name"))
    }

    fn reference(&self) -> Result<TextRange> {
        self.reference.ok_or_else(|| missing("module reference"))
    }
}

fn plan_import_equals_type_only(state: &FileState, stmt: RawNodeId, value: bool) -> Result<Vec<TextEdit>> {
    let parts = ImportEqualsParts::read(state.tree(), stmt);
    let import_kw = parts.import_kw.ok_or_else(|| missing("`import` keyword"))?;
    let after_import = state.node_range(import_kw)?.end;
    match (value, parts.type_kw) {
        (true, None) => {
            if parts.source.is_none() {
                // `import type a = N.M;` does not parse as an import alias.
                return Err(ManipulationError::conflict(
                    "only `require` imports can be type-only; `import type x = A.B` is not accepted by the parser",
                ));
            }
            Ok(vec![TextEdit::insert(state.text(), after_import, " type")])
        }
        (false, Some(type_kw)) => {
            let span = TextRange::new(after_import, state.node_range(type_kw)?.end);
            Ok(vec![TextEdit::delete(state.text(), span)])
        }
        _ => Ok(Vec::new()),
    }
}

fn plan_module_reference(state: &FileState, stmt: RawNodeId, reference: &str) -> Result<Vec<TextEdit>> {
    let range = ImportEqualsParts::read(state.tree(), stmt).reference()?;
    Ok(vec![TextEdit::replace(state.text(), range, reference)])
}

impl ImportEqualsDeclaration {
    pub fn name(&self) -> Result<String> {
        self.read(|state, raw| {
            let name = ImportEqualsParts::read(state.tree(), raw).name()?;
            Ok(state.node_text(name).to_string())
        })
    }

    pub fn name_node(&self) -> Result<Node> {
        self.related_one(|state, raw| ImportEqualsParts::read(state.tree(), raw).name)?
            .ok_or_else(|| missing("import-equals name"))
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| {
            let node = ImportEqualsParts::read(state.tree(), raw).name()?;
            Ok(vec![TextEdit::replace(state.text(), state.node_range(node)?, name)])
        })
    }

    /// Rename the binding and every reference to it.
    pub fn rename(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| {
            let node = ImportEqualsParts::read(state.tree(), raw).name()?;
            let mut edits = vec![TextEdit::replace(state.text(), state.node_range(node)?, name)];
            edits.extend(state.reference_edits(node, name)?);
            Ok(edits)
        })
    }

    pub fn is_type_only(&self) -> Result<bool> {
        self.read(|state, raw| Ok(ImportEqualsParts::read(state.tree(), raw).type_kw.is_some()))
    }

    pub fn set_is_type_only(&self, value: bool) -> Result<()> {
        self.edit(|state, raw| plan_import_equals_type_only(state, raw, value))
    }

    /// Source text of the reference: `require("m")` or `A.B`.
    pub fn module_reference(&self) -> Result<String> {
        self.read(|state, raw| {
            let range = ImportEqualsParts::read(state.tree(), raw).reference()?;
            Ok(state.text()[range.as_range()].to_string())
        })
    }

    pub fn is_external_module_reference(&self) -> Result<bool> {
        self.read(|state, raw| Ok(ImportEqualsParts::read(state.tree(), raw).source.is_some()))
    }

    /// Module named by `require(...)`, if this is the external form.
    pub fn external_module_reference_value(&self) -> Result<Option<String>> {
        self.read(|state, raw| {
            Ok(ImportEqualsParts::read(state.tree(), raw)
                .source
                .map(|s| literal_value(state.node_text(s)).to_string()))
        })
    }

    pub fn is_external_module_reference_relative(&self) -> Result<bool> {
        Ok(self
            .external_module_reference_value()?
            .is_some_and(|value| is_relative(&value)))
    }

    /// Point this import at `require("<value>")` with the configured quote.
    pub fn set_external_module_reference(&self, value: &str) -> Result<()> {
        self.edit(|state, raw| {
            let rendered = render_external_module_reference(value, &state.settings());
            plan_module_reference(state, raw, &rendered)
        })
    }

    pub fn remove(&self) -> Result<()> {
        remove_statement(self)
    }
}

impl Structured for ImportEqualsDeclaration {
    type Structure = ImportEqualsDeclarationStructure;
    type Patch = ImportEqualsDeclarationPatch;

    fn structure(&self) -> Result<ImportEqualsDeclarationStructure> {
        Ok(ImportEqualsDeclarationStructure {
            name: self.name()?,
            is_type_only: self.is_type_only()?,
            module_reference: self.module_reference()?,
        })
    }

    fn set(&self, patch: &ImportEqualsDeclarationPatch) -> Result<()> {
        self.atomically(|| {
            let current = self.structure()?;
            if let Some(name) = &patch.name {
                if *name != current.name {
                    self.set_name(name)?;
                }
            }
            if let Some(reference) = &patch.module_reference {
                if *reference != current.module_reference {
                    self.edit(|state, raw| plan_module_reference(state, raw, reference))?;
                }
            }
            if let Some(type_only) = patch.is_type_only {
                if type_only != current.is_type_only {
                    self.set_is_type_only(type_only)?;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::SourceFile;

    fn first_import(file: &SourceFile) -> ImportDeclaration {
        file.import_declarations().unwrap().remove(0)
    }

    #[test]
    fn reads_clause_parts() {
        let file = SourceFile::new("import d, { a, b as c } from \"./m\";\n").unwrap();
        let decl = first_import(&file);
        assert_eq!(decl.default_import().unwrap().unwrap().text().unwrap(), "d");
        assert!(decl.namespace_import().unwrap().is_none());
        assert_eq!(decl.module_specifier_value().unwrap(), "./m");
        assert!(decl.is_module_specifier_relative().unwrap());

        let names: Vec<String> = decl
            .named_imports()
            .unwrap()
            .iter()
            .map(|s| s.name().unwrap())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(decl.named_imports().unwrap()[1].alias().unwrap().as_deref(), Some("c"));
    }

    #[test]
    fn side_effect_import_gains_named_clause() {
        let file = SourceFile::new("import \"./file\";").unwrap();
        let decl = first_import(&file);
        let inserted = decl.insert_named_import(0, "x".into()).unwrap();
        assert_eq!(file.full_text(), "import { x } from \"./file\";");
        assert_eq!(inserted.name().unwrap(), "x");
        assert!(decl.is_valid());
    }

    #[test]
    fn namespace_and_named_conflict() {
        let file = SourceFile::new("import { a } from \"m\";").unwrap();
        let decl = first_import(&file);
        let err = decl.set_namespace_import("ns").unwrap_err();
        assert!(matches!(err, ManipulationError::StructuralConflict { .. }));
        assert_eq!(file.full_text(), "import { a } from \"m\";");
    }

    #[test]
    fn specifier_alias_round_trip() {
        let file = SourceFile::new("import { a } from \"m\";").unwrap();
        let spec = first_import(&file).named_imports().unwrap().remove(0);
        spec.set_alias("b").unwrap();
        assert_eq!(file.full_text(), "import { a as b } from \"m\";");
        spec.remove_alias().unwrap();
        assert_eq!(file.full_text(), "import { a } from \"m\";");
        assert!(spec.is_valid());
    }

    #[test]
    fn import_equals_reference() {
        let file = SourceFile::new("import test = require(\"./testing\");").unwrap();
        let decl = file.import_equals_declarations().unwrap().remove(0);
        assert_eq!(decl.name().unwrap(), "test");
        assert_eq!(decl.module_reference().unwrap(), "require(\"./testing\")");
        assert!(decl.is_external_module_reference_relative().unwrap());

        decl.set_external_module_reference("other").unwrap();
        assert_eq!(file.full_text(), "import test = require(\"other\");");
    }
}
