//! Plain, serializable descriptors of node properties.
//!
//! `structure()` reads a node into one of these; `set(patch)` writes a
//! partial descriptor back, producing edits only for properties that differ.
//! Clearable properties use `Option<Option<T>>` in patches: an omitted field
//! is left alone, an explicit `null` clears it.

pub mod printer;

use crate::manipulation::errors::Result;
use crate::node::VariableDeclarationKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Read and write a node through its descriptor.
pub trait Structured {
    type Structure;
    type Patch;

    fn structure(&self) -> Result<Self::Structure>;

    /// Apply the differing properties of `patch`.
    fn set(&self, patch: &Self::Patch) -> Result<()>;
}

/// Distinguish an explicit `null` from an omitted field.
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSpecifierStructure {
    pub name: String,
    pub alias: Option<String>,
    #[serde(default)]
    pub is_type_only: bool,
}

impl ImportSpecifierStructure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            is_type_only: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn type_only(mut self) -> Self {
        self.is_type_only = true;
        self
    }
}

impl From<&str> for ImportSpecifierStructure {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSpecifierPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub alias: Option<Option<String>>,
    pub is_type_only: Option<bool>,
}

impl From<ImportSpecifierStructure> for ImportSpecifierPatch {
    fn from(s: ImportSpecifierStructure) -> Self {
        Self {
            name: Some(s.name),
            alias: Some(s.alias),
            is_type_only: Some(s.is_type_only),
        }
    }
}

/// One `key: value` entry of a `with { ... }` clause.
///
/// `value` is source text, so a string value keeps its quotes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImportAttributeStructure {
    pub name: String,
    pub value: String,
}

impl ImportAttributeStructure {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDeclarationStructure {
    #[serde(default)]
    pub is_type_only: bool,
    pub default_import: Option<String>,
    pub namespace_import: Option<String>,
    #[serde(default)]
    pub named_imports: Vec<ImportSpecifierStructure>,
    pub module_specifier: String,
    pub attributes: Option<Vec<ImportAttributeStructure>>,
}

impl ImportDeclarationStructure {
    /// Side-effect import of `module_specifier`.
    pub fn new(module_specifier: impl Into<String>) -> Self {
        Self {
            is_type_only: false,
            default_import: None,
            namespace_import: None,
            named_imports: Vec::new(),
            module_specifier: module_specifier.into(),
            attributes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportDeclarationPatch {
    pub is_type_only: Option<bool>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub default_import: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub namespace_import: Option<Option<String>>,
    pub named_imports: Option<Vec<ImportSpecifierStructure>>,
    pub module_specifier: Option<String>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Option<Vec<ImportAttributeStructure>>>,
}

impl From<ImportDeclarationStructure> for ImportDeclarationPatch {
    fn from(s: ImportDeclarationStructure) -> Self {
        Self {
            is_type_only: Some(s.is_type_only),
            default_import: Some(s.default_import),
            namespace_import: Some(s.namespace_import),
            named_imports: Some(s.named_imports),
            module_specifier: Some(s.module_specifier),
            attributes: Some(s.attributes),
        }
    }
}

/// `import name = require("m");` or `import name = A.B;`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEqualsDeclarationStructure {
    pub name: String,
    #[serde(default)]
    pub is_type_only: bool,
    /// Source text of the reference, e.g. `require("m")` or `A.B`
    pub module_reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportEqualsDeclarationPatch {
    pub name: Option<String>,
    pub is_type_only: Option<bool>,
    pub module_reference: Option<String>,
}

impl From<ImportEqualsDeclarationStructure> for ImportEqualsDeclarationPatch {
    fn from(s: ImportEqualsDeclarationStructure) -> Self {
        Self {
            name: Some(s.name),
            is_type_only: Some(s.is_type_only),
            module_reference: Some(s.module_reference),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclarationStructure {
    pub name: String,
    #[serde(rename = "type")]
    pub type_annotation: Option<String>,
    pub initializer: Option<String>,
}

impl VariableDeclarationStructure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_annotation: None,
            initializer: None,
        }
    }

    pub fn with_initializer(mut self, initializer: impl Into<String>) -> Self {
        self.initializer = Some(initializer.into());
        self
    }

    pub fn with_type(mut self, type_annotation: impl Into<String>) -> Self {
        self.type_annotation = Some(type_annotation.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableDeclarationPatch {
    pub name: Option<String>,
    #[serde(
        rename = "type",
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub type_annotation: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Option<String>>,
}

impl From<VariableDeclarationStructure> for VariableDeclarationPatch {
    fn from(s: VariableDeclarationStructure) -> Self {
        Self {
            name: Some(s.name),
            type_annotation: Some(s.type_annotation),
            initializer: Some(s.initializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableStatementStructure {
    pub declaration_kind: VariableDeclarationKind,
    pub declarations: Vec<VariableDeclarationStructure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableStatementPatch {
    pub declaration_kind: Option<VariableDeclarationKind>,
    pub declarations: Option<Vec<VariableDeclarationStructure>>,
}

impl From<VariableStatementStructure> for VariableStatementPatch {
    fn from(s: VariableStatementStructure) -> Self {
        Self {
            declaration_kind: Some(s.declaration_kind),
            declarations: Some(s.declarations),
        }
    }
}

/// Descriptor of any top-level statement.
///
/// Statements without a dedicated descriptor are carried as source text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Structure {
    ImportDeclaration(ImportDeclarationStructure),
    ImportEqualsDeclaration(ImportEqualsDeclarationStructure),
    VariableStatement(VariableStatementStructure),
    Statement { text: String },
}

impl From<ImportDeclarationStructure> for Structure {
    fn from(s: ImportDeclarationStructure) -> Self {
        Structure::ImportDeclaration(s)
    }
}

impl From<ImportEqualsDeclarationStructure> for Structure {
    fn from(s: ImportEqualsDeclarationStructure) -> Self {
        Structure::ImportEqualsDeclaration(s)
    }
}

impl From<VariableStatementStructure> for Structure {
    fn from(s: VariableStatementStructure) -> Self {
        Structure::VariableStatement(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceFileStructure {
    pub statements: Vec<Structure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFilePatch {
    pub statements: Option<Vec<Structure>>,
}

impl From<SourceFileStructure> for SourceFilePatch {
    fn from(s: SourceFileStructure) -> Self {
        Self {
            statements: Some(s.statements),
        }
    }
}
