//! Definitions of named types, built in code with resolvers attached

use crate::collections::IndexMap;
use crate::executable::Value;
use crate::execution::ContextValue;
use crate::execution::FieldError;
use crate::execution::FieldValue;
use crate::execution::ResolveInfo;
use crate::schema::CoercionError;
use crate::schema::Type;
use crate::JsonMap;
use crate::JsonValue;
use crate::Name;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

/// Produces the runtime value of a field
/// from its parent value, coerced arguments, context, and field metadata.
pub type Resolver = Arc<
    dyn Fn(&FieldValue, &JsonMap, &ContextValue, &ResolveInfo<'_>) -> Result<FieldValue, FieldError>
        + Send
        + Sync,
>;

/// Determines the concrete object type name of a value whose declared type is abstract
pub type TypeResolver =
    Arc<dyn Fn(&FieldValue, &ContextValue, &ResolveInfo<'_>) -> Option<Name> + Send + Sync>;

/// Whether a runtime value belongs to an object type
pub type IsTypeOf = Arc<dyn Fn(&FieldValue, &ContextValue, &ResolveInfo<'_>) -> bool + Send + Sync>;

type Serialize = Arc<dyn Fn(&JsonValue) -> Result<JsonValue, CoercionError> + Send + Sync>;
type ParseValue = Arc<dyn Fn(&JsonValue) -> Result<JsonValue, CoercionError> + Send + Sync>;
type ParseLiteral =
    Arc<dyn Fn(&Value, &JsonMap) -> Result<JsonValue, CoercionError> + Send + Sync>;

type Thunk<T> = Box<dyn FnOnce() -> Vec<T> + Send>;

enum Source<T> {
    Ready(T),
    Thunk(Thunk<T>),
}

/// Items given either directly or as zero-argument functions,
/// evaluated once on first access.
///
/// This lets types refer to each other while being constructed.
/// Concurrent first accesses are serialized: one evaluates, the others observe its result.
pub(crate) struct Lazy<T, M> {
    sources: Mutex<Vec<Source<T>>>,
    resolved: OnceLock<M>,
}

impl<T, M: FromIterator<T>> Lazy<T, M> {
    fn new() -> Self {
        Self {
            sources: Mutex::new(Vec::new()),
            resolved: OnceLock::new(),
        }
    }

    fn push(&mut self, item: T) {
        self.sources.get_mut().push(Source::Ready(item))
    }

    fn push_thunk(&mut self, thunk: impl FnOnce() -> Vec<T> + Send + 'static) {
        self.sources.get_mut().push(Source::Thunk(Box::new(thunk)))
    }

    pub(crate) fn get(&self) -> &M {
        self.resolved.get_or_init(|| {
            let sources = std::mem::take(&mut *self.sources.lock());
            sources
                .into_iter()
                .flat_map(|source| match source {
                    Source::Ready(item) => vec![item],
                    Source::Thunk(thunk) => thunk(),
                })
                .collect()
        })
    }

    /// Whether items were already evaluated
    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

/// Items by name, in definition order.
///
/// When a name is defined more than once the first definition is kept
/// and the name is recorded for schema validation.
pub struct DefinitionMap<T> {
    pub(crate) map: IndexMap<Name, Arc<T>>,
    pub(crate) duplicates: Vec<Name>,
}

pub trait Named {
    fn name(&self) -> &Name;
}

impl<T: Named> FromIterator<T> for DefinitionMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut map = IndexMap::default();
        let mut duplicates = Vec::new();
        for item in iter {
            let name = item.name().clone();
            if map.contains_key(&name) {
                duplicates.push(name)
            } else {
                map.insert(name, Arc::new(item));
            }
        }
        Self { map, duplicates }
    }
}

impl<T> DefinitionMap<T> {
    pub fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.map.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Arc<T>)> {
        self.map.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Arc<T>> {
        self.map.values()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// <https://spec.graphql.org/October2021/#sec-Scalars>
pub struct ScalarType {
    pub name: Name,
    pub description: Option<String>,
    serialize: Serialize,
    parse_value: ParseValue,
    parse_literal: ParseLiteral,
}

/// <https://spec.graphql.org/October2021/#sec-Objects>
pub struct ObjectType {
    pub name: Name,
    pub description: Option<String>,
    fields: Lazy<FieldDefinition, DefinitionMap<FieldDefinition>>,
    interfaces: Lazy<Name, Vec<Name>>,
    pub(crate) is_type_of: Option<IsTypeOf>,
    pub(crate) resolve_field: Option<Resolver>,
}

/// <https://spec.graphql.org/October2021/#sec-Interfaces>
pub struct InterfaceType {
    pub name: Name,
    pub description: Option<String>,
    fields: Lazy<FieldDefinition, DefinitionMap<FieldDefinition>>,
    pub(crate) resolve_type: Option<TypeResolver>,
}

/// <https://spec.graphql.org/October2021/#sec-Unions>
pub struct UnionType {
    pub name: Name,
    pub description: Option<String>,
    members: Lazy<Name, Vec<Name>>,
    pub(crate) resolve_type: Option<TypeResolver>,
}

/// <https://spec.graphql.org/October2021/#sec-Enums>
pub struct EnumType {
    pub name: Name,
    pub description: Option<String>,
    pub(crate) values: DefinitionMap<EnumValueDefinition>,
}

/// <https://spec.graphql.org/October2021/#sec-Input-Objects>
pub struct InputObjectType {
    pub name: Name,
    pub description: Option<String>,
    fields: Lazy<InputValueDefinition, DefinitionMap<InputValueDefinition>>,
}

/// A field of an object or interface type
pub struct FieldDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub ty: Type,
    pub arguments: Vec<InputValueDefinition>,
    pub deprecation_reason: Option<String>,
    pub(crate) resolver: Option<Resolver>,
}

/// An argument, or a field of an input object type
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub ty: Type,
    /// Used as-is when no value is given, so must be in internal representation.
    pub default_value: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub name: Name,
    pub description: Option<String>,
    /// The internal representation that resolvers return and receive
    pub value: JsonValue,
    pub deprecation_reason: Option<String>,
}

impl Named for FieldDefinition {
    fn name(&self) -> &Name {
        &self.name
    }
}

impl Named for InputValueDefinition {
    fn name(&self) -> &Name {
        &self.name
    }
}

impl Named for EnumValueDefinition {
    fn name(&self) -> &Name {
        &self.name
    }
}

impl ScalarType {
    /// Create a custom scalar whose wire representation is the same as its internal one.
    ///
    /// Literals are converted to JSON, with variables replaced by their values.
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            serialize: Arc::new(|value| Ok(value.clone())),
            parse_value: Arc::new(|value| Ok(value.clone())),
            parse_literal: Arc::new(|value, variables| Ok(literal_to_json(value, variables))),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the conversion from internal value to wire value
    pub fn with_serialize(
        mut self,
        serialize: impl Fn(&JsonValue) -> Result<JsonValue, CoercionError> + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Arc::new(serialize);
        self
    }

    /// Set the conversion from a variable value to internal value
    pub fn with_parse_value(
        mut self,
        parse_value: impl Fn(&JsonValue) -> Result<JsonValue, CoercionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.parse_value = Arc::new(parse_value);
        self
    }

    /// Set the conversion from a literal in query text to internal value
    pub fn with_parse_literal(
        mut self,
        parse_literal: impl Fn(&Value, &JsonMap) -> Result<JsonValue, CoercionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.parse_literal = Arc::new(parse_literal);
        self
    }

    pub fn serialize(&self, value: &JsonValue) -> Result<JsonValue, CoercionError> {
        (self.serialize)(value)
    }

    pub fn parse_value(&self, value: &JsonValue) -> Result<JsonValue, CoercionError> {
        (self.parse_value)(value)
    }

    pub fn parse_literal(
        &self,
        value: &Value,
        variables: &JsonMap,
    ) -> Result<JsonValue, CoercionError> {
        (self.parse_literal)(value, variables)
    }
}

/// Convert a literal to JSON without type information.
/// Unknown variables become null.
pub fn literal_to_json(value: &Value, variables: &JsonMap) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Variable(name) => variables
            .get(name.as_str())
            .cloned()
            .unwrap_or(JsonValue::Null),
        Value::Enum(name) => name.as_str().into(),
        Value::String(value) => value.as_str().into(),
        Value::Boolean(value) => (*value).into(),
        Value::Int(value) => value
            .as_str()
            .parse::<i64>()
            .map(JsonValue::from)
            .or_else(|_| value.as_str().parse::<f64>().map(JsonValue::from))
            .unwrap_or(JsonValue::Null),
        Value::Float(value) => value
            .try_to_f64()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),
        Value::List(items) => items
            .iter()
            .map(|item| literal_to_json(item, variables))
            .collect(),
        Value::Object(fields) => fields
            .iter()
            .map(|(name, value)| (name.as_str(), literal_to_json(value, variables)))
            .collect(),
    }
}

impl ObjectType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Lazy::new(),
            interfaces: Lazy::new(),
            is_type_of: None,
            resolve_field: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Add fields produced on first access, such as fields whose type refers back to this type
    pub fn fields_with(
        mut self,
        fields: impl FnOnce() -> Vec<FieldDefinition> + Send + 'static,
    ) -> Self {
        self.fields.push_thunk(fields);
        self
    }

    pub fn implements(mut self, interface: impl Into<Name>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn interfaces_with(
        mut self,
        interfaces: impl FnOnce() -> Vec<Name> + Send + 'static,
    ) -> Self {
        self.interfaces.push_thunk(interfaces);
        self
    }

    /// Set the predicate used for abstract type resolution and for checking object values
    pub fn is_type_of(
        mut self,
        is_type_of: impl Fn(&FieldValue, &ContextValue, &ResolveInfo<'_>) -> bool
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.is_type_of = Some(Arc::new(is_type_of));
        self
    }

    /// Set a resolver for fields of this type that don't have their own
    pub fn resolve_field(
        mut self,
        resolver: impl Fn(
                &FieldValue,
                &JsonMap,
                &ContextValue,
                &ResolveInfo<'_>,
            ) -> Result<FieldValue, FieldError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.resolve_field = Some(Arc::new(resolver));
        self
    }

    /// Fields by name, evaluated on first call
    pub fn fields(&self) -> &DefinitionMap<FieldDefinition> {
        self.fields.get()
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Arc<FieldDefinition>> {
        self.fields().get(name)
    }

    /// Names of implemented interfaces, evaluated on first call
    pub fn interfaces(&self) -> &[Name] {
        self.interfaces.get()
    }

    pub fn implements_interface(&self, interface: &str) -> bool {
        self.interfaces().iter().any(|name| name == interface)
    }

    pub fn has_is_type_of(&self) -> bool {
        self.is_type_of.is_some()
    }

    pub(crate) fn fields_resolved(&self) -> bool {
        self.fields.is_resolved()
    }
}

impl InterfaceType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Lazy::new(),
            resolve_type: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields_with(
        mut self,
        fields: impl FnOnce() -> Vec<FieldDefinition> + Send + 'static,
    ) -> Self {
        self.fields.push_thunk(fields);
        self
    }

    /// Set how to find the name of the concrete object type of a value
    pub fn resolve_type(
        mut self,
        resolve_type: impl Fn(&FieldValue, &ContextValue, &ResolveInfo<'_>) -> Option<Name>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(resolve_type));
        self
    }

    pub fn fields(&self) -> &DefinitionMap<FieldDefinition> {
        self.fields.get()
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Arc<FieldDefinition>> {
        self.fields().get(name)
    }
}

impl UnionType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            members: Lazy::new(),
            resolve_type: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn member(mut self, object_type: impl Into<Name>) -> Self {
        self.members.push(object_type.into());
        self
    }

    pub fn members_with(mut self, members: impl FnOnce() -> Vec<Name> + Send + 'static) -> Self {
        self.members.push_thunk(members);
        self
    }

    /// Set how to find the name of the concrete object type of a value
    pub fn resolve_type(
        mut self,
        resolve_type: impl Fn(&FieldValue, &ContextValue, &ResolveInfo<'_>) -> Option<Name>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(resolve_type));
        self
    }

    /// Names of member object types, evaluated on first call
    pub fn members(&self) -> &[Name] {
        self.members.get()
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members().iter().any(|member| member == name)
    }
}

impl EnumType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: DefinitionMap {
                map: IndexMap::default(),
                duplicates: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a value whose internal representation is its name
    pub fn value(self, name: impl Into<Name>) -> Self {
        let name = name.into();
        let internal = JsonValue::from(name.as_str());
        self.value_definition(EnumValueDefinition::new(name, internal))
    }

    pub fn value_definition(mut self, definition: EnumValueDefinition) -> Self {
        let name = definition.name.clone();
        if self.values.map.contains_key(&name) {
            self.values.duplicates.push(name)
        } else {
            self.values.map.insert(name, Arc::new(definition));
        }
        self
    }

    pub fn values(&self) -> &DefinitionMap<EnumValueDefinition> {
        &self.values
    }

    /// Internal value to enum value name
    ///
    /// <https://spec.graphql.org/October2021/#sec-Enums.Result-Coercion>
    pub fn serialize(&self, value: &JsonValue) -> Result<JsonValue, CoercionError> {
        self.values
            .values()
            .find(|def| def.value == *value)
            .map(|def| JsonValue::from(def.name.as_str()))
            .ok_or_else(|| {
                CoercionError::new(format!(
                    "Enum \"{}\" cannot represent value: {value}",
                    self.name
                ))
            })
    }

    /// Enum value name given in variables to internal value
    ///
    /// <https://spec.graphql.org/October2021/#sec-Enums.Input-Coercion>
    pub fn parse_value(&self, value: &JsonValue) -> Result<JsonValue, CoercionError> {
        value
            .as_str()
            .and_then(|name| self.values.get(name))
            .map(|def| def.value.clone())
            .ok_or_else(|| {
                CoercionError::new(format!(
                    "Value {value} does not exist in \"{}\" enum.",
                    self.name
                ))
            })
    }

    /// Enum literal to internal value
    pub fn parse_literal(&self, value: &Value) -> Result<JsonValue, CoercionError> {
        if let Value::Enum(name) = value {
            if let Some(def) = self.values.get(name) {
                return Ok(def.value.clone());
            }
        }
        Err(CoercionError::new(format!(
            "Value {value} does not exist in \"{}\" enum.",
            self.name
        )))
    }
}

impl EnumValueDefinition {
    pub fn new(name: impl Into<Name>, value: impl Into<JsonValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            value: value.into(),
            deprecation_reason: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

impl InputObjectType {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Lazy::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: InputValueDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields_with(
        mut self,
        fields: impl FnOnce() -> Vec<InputValueDefinition> + Send + 'static,
    ) -> Self {
        self.fields.push_thunk(fields);
        self
    }

    pub fn fields(&self) -> &DefinitionMap<InputValueDefinition> {
        self.fields.get()
    }
}

impl FieldDefinition {
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: Vec::new(),
            deprecation_reason: None,
            resolver: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, argument: InputValueDefinition) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    pub fn resolve(
        mut self,
        resolver: impl Fn(
                &FieldValue,
                &JsonMap,
                &ContextValue,
                &ResolveInfo<'_>,
            ) -> Result<FieldValue, FieldError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn argument_by_name(&self, name: &str) -> Option<&InputValueDefinition> {
        self.arguments.iter().find(|arg| arg.name == name)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

impl InputValueDefinition {
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Non-null without a default value
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

macro_rules! debug_by_name {
    ($($ty: ident),+) => {
        $(
            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($ty))
                        .field("name", &self.name)
                        .finish_non_exhaustive()
                }
            }
        )+
    };
}

debug_by_name!(
    ScalarType,
    ObjectType,
    InterfaceType,
    UnionType,
    EnumType,
    InputObjectType
);

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

impl<T: fmt::Debug> fmt::Debug for DefinitionMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[test]
    fn fields_thunk_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_2 = calls.clone();
        let ty = ObjectType::new("User")
            .field(FieldDefinition::new("id", Type::named("ID")))
            .fields_with(move || {
                calls_2.fetch_add(1, Ordering::SeqCst);
                vec![FieldDefinition::new("friend", Type::named("User"))]
            })
            .field(FieldDefinition::new("name", Type::named("String")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!ty.fields_resolved());
        let names: Vec<_> = ty.fields().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["id", "friend", "name"]);
        assert!(ty.field_by_name("friend").is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_access_retains_one_result() {
        let ty = Arc::new(ObjectType::new("Slow").fields_with(|| {
            std::thread::sleep(std::time::Duration::from_millis(10));
            vec![FieldDefinition::new("a", Type::named("Int"))]
        }));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ty = ty.clone();
                std::thread::spawn(move || {
                    ty.field_by_name("a").map(Arc::as_ptr).map(|ptr| ptr as usize)
                })
            })
            .collect();
        let pointers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(pointers[0].is_some());
        assert!(pointers.iter().all(|ptr| *ptr == pointers[0]));
    }

    #[test]
    fn duplicate_fields_are_recorded() {
        let ty = ObjectType::new("T")
            .field(FieldDefinition::new("a", Type::named("Int")))
            .field(FieldDefinition::new("a", Type::named("String")));
        assert_eq!(ty.fields().len(), 1);
        assert_eq!(ty.fields().duplicates, [name!("a")]);
        assert_eq!(ty.field_by_name("a").unwrap().ty, Type::named("Int"));
    }

    #[test]
    fn enum_coercion() {
        let color = EnumType::new("Color")
            .value_definition(EnumValueDefinition::new("RED", 0))
            .value("GREEN");
        assert_eq!(color.serialize(&0.into()).unwrap(), JsonValue::from("RED"));
        assert_eq!(
            color.serialize(&"GREEN".into()).unwrap(),
            JsonValue::from("GREEN")
        );
        assert_eq!(
            color.serialize(&7.into()).unwrap_err().message,
            "Enum \"Color\" cannot represent value: 7"
        );
        assert_eq!(color.parse_value(&"RED".into()).unwrap(), JsonValue::from(0));
        assert_eq!(
            color.parse_literal(&Value::Enum(name!("GREEN"))).unwrap(),
            JsonValue::from("GREEN")
        );
        assert!(color.parse_literal(&Value::String("RED".into())).is_err());
    }
}
