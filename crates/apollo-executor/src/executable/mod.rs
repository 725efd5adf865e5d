//! The executable document consumed by [`Execution`][crate::Execution]:
//! operations and fragments, already parsed.
//!
//! Documents are usually built from query text with [`ExecutableDocument::parse`].
//! All fields are public so that a document can also be built programmatically.
//! Static validation is not performed here, only syntax errors are reported.

use crate::collections::IndexMap;
use crate::schema::Type;
use crate::Name;
use crate::Node;
use std::fmt;

pub(crate) mod from_cst;

pub use self::from_cst::SyntaxError;
pub use self::from_cst::SyntaxErrors;

/// Operations and fragments of a GraphQL request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutableDocument {
    /// Operations in document order
    pub operations: Vec<Node<Operation>>,
    pub fragments: IndexMap<Name, Node<Fragment>>,
}

/// <https://spec.graphql.org/October2021/#sec-Language.Operations>
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<Node<VariableDefinition>>,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub name: Name,
    pub type_condition: Name,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Node<Field>),
    FragmentSpread(Node<FragmentSpread>),
    InlineFragment(Node<InlineFragment>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
    pub directives: DirectiveList,
    /// Empty for leaf fields
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub fragment_name: Name,
    pub directives: DirectiveList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<Name>,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Node<Value>>,
    pub directives: DirectiveList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Name,
    pub value: Node<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveList(pub Vec<Node<Directive>>);

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
}

/// A literal value in query text
///
/// <https://spec.graphql.org/October2021/#sec-Input-Values>
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Enum(Name),
    Variable(Name),
    String(String),
    Float(FloatValue),
    Int(IntValue),
    Boolean(bool),
    List(Vec<Node<Value>>),
    Object(Vec<(Name, Node<Value>)>),
}

/// An integer literal, kept as text so that conversion can report overflow
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntValue(String);

/// A float literal, kept as text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FloatValue(String);

/// The operation to run could not be determined
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GetOperationError {
    #[error("Must provide an operation.")]
    NoOperation,
    #[error("Must provide operation name if query contains multiple operations.")]
    MultipleOperations,
    #[error("Unknown operation named \"{0}\".")]
    UnknownName(String),
}

impl ExecutableDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse query text into a document.
    ///
    /// Type system definitions are ignored, since the schema is defined in code.
    pub fn parse(source_text: impl AsRef<str>) -> Result<Self, SyntaxErrors> {
        from_cst::parse(source_text.as_ref())
    }

    /// Returns the operation with the given name,
    /// or the only operation of the document if `name_request` is `None`.
    pub fn get_operation(
        &self,
        name_request: Option<&str>,
    ) -> Result<&Node<Operation>, GetOperationError> {
        if let Some(name) = name_request {
            self.operations
                .iter()
                .find(|op| op.name.as_ref().is_some_and(|op_name| op_name == name))
                .ok_or_else(|| GetOperationError::UnknownName(name.to_owned()))
        } else {
            match self.operations.as_slice() {
                [] => Err(GetOperationError::NoOperation),
                [single] => Ok(single),
                _ => Err(GetOperationError::MultipleOperations),
            }
        }
    }
}

impl Operation {
    pub fn is_query(&self) -> bool {
        self.operation_type == OperationType::Query
    }

    pub fn is_mutation(&self) -> bool {
        self.operation_type == OperationType::Mutation
    }
}

impl OperationType {
    pub fn name(self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Selection {
    pub fn directives(&self) -> &DirectiveList {
        match self {
            Self::Field(sel) => &sel.directives,
            Self::FragmentSpread(sel) => &sel.directives,
            Self::InlineFragment(sel) => &sel.directives,
        }
    }
}

impl Field {
    /// Create a field selection without alias, arguments, directives, or sub-selections
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Vec::new(),
            directives: DirectiveList::default(),
            selection_set: Vec::new(),
        }
    }

    /// Returns the alias if there is one, otherwise the field name
    pub fn response_key(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    pub fn argument_by_name(&self, name: &str) -> Option<&Node<Value>> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

impl DirectiveList {
    /// Returns the first directive with the given name, if any
    pub fn get(&self, name: &str) -> Option<&Node<Directive>> {
        self.0.iter().find(|dir| dir.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Directive {
    pub fn argument_by_name(&self, name: &str) -> Option<&Node<Value>> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_variable(&self) -> Option<&Name> {
        if let Value::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Enum(name) => f.write_str(name),
            Value::Variable(name) => write!(f, "${name}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Float(value) => f.write_str(value.as_str()),
            Value::Int(value) => f.write_str(value.as_str()),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?
                    }
                    write!(f, "{}", **item)?
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?
                    }
                    write!(f, "{name}: {}", **value)?
                }
                f.write_str("}")
            }
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(IntValue::new(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(FloatValue::new(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&'_ str> for Value {
    fn from(value: &'_ str) -> Self {
        Value::String(value.to_owned())
    }
}

impl IntValue {
    pub fn new(value: i32) -> Self {
        Self(value.to_string())
    }

    pub(crate) fn new_parsed(text: &str) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `None` if the literal does not fit in 32 bits
    pub fn try_to_i32(&self) -> Option<i32> {
        self.0.parse().ok()
    }

    /// Converts to `f64`, as allowed for
    /// [Float input coercion](https://spec.graphql.org/October2021/#sec-Float.Input-Coercion)
    pub fn try_to_f64(&self) -> Option<f64> {
        self.0.parse().ok().filter(|f: &f64| f.is_finite())
    }
}

impl FloatValue {
    pub fn new(value: f64) -> Self {
        let mut text = value.to_string();
        if !text.contains(['.', 'e', 'E']) {
            text.push_str(".0")
        }
        Self(text)
    }

    pub(crate) fn new_parsed(text: &str) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_to_f64(&self) -> Option<f64> {
        self.0.parse().ok().filter(|f: &f64| f.is_finite())
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_selection() {
        let doc = ExecutableDocument::parse("query A { a } query B { b }").unwrap();
        assert_eq!(
            doc.get_operation(None).unwrap_err().to_string(),
            "Must provide operation name if query contains multiple operations."
        );
        assert_eq!(doc.get_operation(Some("B")).unwrap().name, Some(name!("B")));
        assert_eq!(
            doc.get_operation(Some("C")).unwrap_err().to_string(),
            "Unknown operation named \"C\"."
        );
        assert_eq!(
            ExecutableDocument::new()
                .get_operation(None)
                .unwrap_err()
                .to_string(),
            "Must provide an operation."
        );
    }

    #[test]
    fn int_literal_range() {
        assert_eq!(IntValue::new_parsed("2147483647").try_to_i32(), Some(i32::MAX));
        assert_eq!(IntValue::new_parsed("2147483648").try_to_i32(), None);
        assert_eq!(FloatValue::new(1.0).as_str(), "1.0");
    }
}
