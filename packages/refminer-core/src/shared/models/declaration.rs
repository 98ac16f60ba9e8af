//! Types, operations and attributes of one snapshot

use super::expression::Expression;
use super::span::{CodeRange, Span};
use super::statement::Body;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Package
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Static,
    Final,
    Abstract,
    Synchronized,
    Default,
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl Default for TypeKind {
    fn default() -> Self {
        TypeKind::Class
    }
}

/// Annotation usage, e.g. `@Test` or `@CsvSource({"a", "b"})`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arguments {
            Some(args) => write!(f, "@{}({})", self.name, args),
            None => write!(f, "@{}", self.name),
        }
    }
}

/// Formal parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Parameter {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            varargs: false,
            annotations: Vec::new(),
        }
    }

    /// Type as written in a signature (`String...` for varargs)
    pub fn display_type(&self) -> String {
        if self.varargs {
            format!("{}...", self.type_name)
        } else {
            self.type_name.clone()
        }
    }
}

/// Field of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub initializer: Option<Expression>,
    #[serde(default)]
    pub span: Span,
}

impl Attribute {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            visibility: Visibility::Private,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            initializer: None,
            span: Span::zero(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_initializer(mut self, initializer: Expression) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// `None` for constructors and `void`
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub thrown_types: Vec<String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub is_constructor: bool,
    /// `None` for abstract and interface operations
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub span: Span,
}

impl Operation {
    /// Matching key: name plus parameter types in order
    pub fn signature_key(&self) -> String {
        let name = if self.is_constructor {
            "<init>"
        } else {
            self.name.as_str()
        };
        let types: Vec<String> = self.parameters.iter().map(|p| p.display_type()).collect();
        format!("{}({})", name, types.join(","))
    }

    /// Human readable signature, `name(int, String) : boolean`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.parameters.iter().map(|p| p.display_type()).collect();
        match &self.return_type {
            Some(ret) => format!("{}({}) : {}", self.name, types.join(", "), ret),
            None if self.is_constructor => format!("{}({})", self.name, types.join(", ")),
            None => format!("{}({}) : void", self.name, types.join(", ")),
        }
    }

    pub fn parameter_types(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.display_type()).collect()
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn statement_count(&self) -> usize {
        self.body.as_ref().map(|b| b.statement_count()).unwrap_or(0)
    }

    pub fn has_body(&self) -> bool {
        self.body.as_ref().map(|b| !b.is_empty()).unwrap_or(false)
    }

    /// Test methods are recognized by annotation or by the `test` name prefix
    pub fn is_test(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| a.name == "Test" || a.name.ends_with("ParameterizedTest"))
            || self.name.starts_with("test")
    }
}

/// Class, interface, enum, record or annotation type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    /// Fully-qualified name, e.g. `com.acme.Foo`
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    pub file_path: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub span: Span,
}

impl TypeDeclaration {
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Package part of the qualified name (empty for the default package)
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    /// True when `other` (a simple or qualified name) is this type's superclass
    pub fn extends(&self, other: &str) -> bool {
        match &self.superclass {
            Some(sup) => sup == other || simple_name(sup) == simple_name(other),
            None => false,
        }
    }

    pub fn implements(&self, other: &str) -> bool {
        self.interfaces
            .iter()
            .any(|i| i == other || simple_name(i) == simple_name(other))
    }

    pub fn code_range(&self) -> CodeRange {
        CodeRange::new(self.file_path.clone(), &self.span)
    }
}

/// Last segment of a dotted name
pub fn simple_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Index of a type within one `Model`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef(pub u32);

impl TypeRef {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Index of an operation within one `Model`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationRef {
    pub owner: TypeRef,
    pub index: u32,
}

impl OperationRef {
    pub fn new(owner: TypeRef, index: usize) -> Self {
        Self {
            owner,
            index: index as u32,
        }
    }
}

/// Index of an attribute within one `Model`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeRef {
    pub owner: TypeRef,
    pub index: u32,
}

impl AttributeRef {
    pub fn new(owner: TypeRef, index: usize) -> Self {
        Self {
            owner,
            index: index as u32,
        }
    }
}

/// All type declarations of one snapshot
#[derive(Debug, Clone, Default)]
pub struct Model {
    types: Vec<TypeDeclaration>,
    by_name: BTreeMap<String, TypeRef>,
}

impl Model {
    /// Build a model; later declarations reusing a qualified name are dropped
    pub fn new(types: Vec<TypeDeclaration>) -> Self {
        let mut model = Model::default();
        for decl in types {
            if model.by_name.contains_key(&decl.name) {
                warn!(
                    "Model: duplicate type {} in {} ignored",
                    decl.name, decl.file_path
                );
                continue;
            }
            let idx = TypeRef(model.types.len() as u32);
            model.by_name.insert(decl.name.clone(), idx);
            model.types.push(decl);
        }
        model
    }

    pub fn types(&self) -> &[TypeDeclaration] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_refs(&self) -> impl Iterator<Item = TypeRef> {
        (0..self.types.len() as u32).map(TypeRef)
    }

    pub fn find(&self, qualified_name: &str) -> Option<TypeRef> {
        self.by_name.get(qualified_name).copied()
    }

    /// Panics on a reference built from a different model
    pub fn type_decl(&self, r: TypeRef) -> &TypeDeclaration {
        &self.types[r.index()]
    }

    pub fn operation(&self, r: OperationRef) -> &Operation {
        &self.types[r.owner.index()].operations[r.index as usize]
    }

    pub fn attribute(&self, r: AttributeRef) -> &Attribute {
        &self.types[r.owner.index()].attributes[r.index as usize]
    }

    pub fn operation_refs(&self, owner: TypeRef) -> impl Iterator<Item = OperationRef> + '_ {
        (0..self.type_decl(owner).operations.len()).map(move |i| OperationRef::new(owner, i))
    }

    pub fn attribute_refs(&self, owner: TypeRef) -> impl Iterator<Item = AttributeRef> + '_ {
        (0..self.type_decl(owner).attributes.len()).map(move |i| AttributeRef::new(owner, i))
    }

    /// `com.acme.Foo#bar(int) : void`
    pub fn operation_name(&self, r: OperationRef) -> String {
        format!(
            "{}#{}",
            self.type_decl(r.owner).name,
            self.operation(r).signature()
        )
    }

    pub fn operation_range(&self, r: OperationRef) -> CodeRange {
        CodeRange::new(
            self.type_decl(r.owner).file_path.clone(),
            &self.operation(r).span,
        )
    }

    pub fn attribute_range(&self, r: AttributeRef) -> CodeRange {
        CodeRange::new(
            self.type_decl(r.owner).file_path.clone(),
            &self.attribute(r).span,
        )
    }

    /// True when `sub` declares `sup` as its superclass
    pub fn is_subtype_of(&self, sub: TypeRef, sup_name: &str) -> bool {
        self.type_decl(sub).extends(sup_name)
    }
}
