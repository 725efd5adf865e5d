//! The type system: named types defined in code, wrapper types, and the [`Schema`] registry
//!
//! Types refer to each other by name.
//! The schema owns the mapping from names to type instances,
//! so types that reference each other (including themselves) can be constructed independently.

use crate::collections::IndexMap;
use crate::executable::OperationType;
use crate::Name;
use parking_lot::Mutex;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

mod directives;
mod scalars;
mod types;
pub(crate) mod validation;

pub use self::directives::DirectiveDefinition;
pub use self::directives::DirectiveLocation;
pub use self::types::literal_to_json;
pub use self::types::DefinitionMap;
pub use self::types::EnumType;
pub use self::types::EnumValueDefinition;
pub use self::types::FieldDefinition;
pub use self::types::InputObjectType;
pub use self::types::InputValueDefinition;
pub use self::types::InterfaceType;
pub use self::types::IsTypeOf;
pub use self::types::ObjectType;
pub use self::types::Resolver;
pub use self::types::ScalarType;
pub use self::types::TypeResolver;
pub use self::types::UnionType;
pub use self::validation::SchemaError;

/// A reference to a named type, possibly wrapped in list and non-null markers
///
/// <https://spec.graphql.org/October2021/#sec-Wrapping-Types>
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Named(Name),
    NonNullNamed(Name),
    List(Box<Type>),
    NonNullList(Box<Type>),
}

/// A named type definition
///
/// Cloning is cheap: each variant holds a reference-counted handle.
/// Two handles are [the same type][Self::ptr_eq] if they point to the same instance.
#[derive(Clone)]
pub enum NamedType {
    Scalar(Arc<ScalarType>),
    Object(Arc<ObjectType>),
    Interface(Arc<InterfaceType>),
    Union(Arc<UnionType>),
    Enum(Arc<EnumType>),
    InputObject(Arc<InputObjectType>),
}

/// Looks up a type by name for a schema in lazy mode.
///
/// Must return the same instance every time it is called with the same name.
pub type TypeLoader = Arc<dyn Fn(&str) -> Option<NamedType> + Send + Sync>;

type TypesThunk = Box<dyn FnOnce() -> Vec<NamedType> + Send>;

/// A value could not be converted to or from the representation of a leaf type,
/// or an input value does not match its declared type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CoercionError {
    pub message: String,
}

/// A contract violation by code configuring the schema
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaConfigError {
    #[error("Type loader is expected to return type \"{requested}\", but it returned \"{returned}\"")]
    TypeLoaderNameMismatch { requested: String, returned: String },

    #[error(
        "Type loader returns different instance for {0} than field/argument definitions. \
         Make sure you always return the same instance for the same type name."
    )]
    TypeLoaderInstanceMismatch(Name),

    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n\n"))]
    Invalid(Vec<SchemaError>),
}

/// Options for [`Schema::new`]
#[derive(Default)]
pub struct SchemaConfig {
    query: Option<Arc<ObjectType>>,
    mutation: Option<Arc<ObjectType>>,
    subscription: Option<Arc<ObjectType>>,
    types: Vec<NamedType>,
    types_with: Option<TypesThunk>,
    directives: Option<Vec<Arc<DirectiveDefinition>>>,
    type_loader: Option<TypeLoader>,
    assume_valid: bool,
}

/// An immutable registry of types, with root operation types and directives.
///
/// Cloning is cheap: clones share the same registry.
///
/// Without a [type loader][SchemaConfig::type_loader] every type reachable
/// from the roots and from [`SchemaConfig::types`] is discovered during construction.
/// With a type loader, types are loaded by name on first use.
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

struct SchemaInner {
    query: Option<Arc<ObjectType>>,
    mutation: Option<Arc<ObjectType>>,
    subscription: Option<Arc<ObjectType>>,
    directives: Vec<Arc<DirectiveDefinition>>,
    /// Roots, configured types, built-in scalars, then anything returned by the type loader
    resolved_types: RwLock<IndexMap<Name, NamedType>>,
    registration_errors: Vec<SchemaError>,
    types_with: Mutex<Option<TypesThunk>>,
    type_loader: Option<TypeLoader>,
    assume_valid: bool,
    type_map: OnceLock<TypeMap>,
    possible_types: OnceLock<IndexMap<Name, Vec<Arc<ObjectType>>>>,
    loader_errors: Mutex<Vec<SchemaConfigError>>,
    validation_errors: OnceLock<Vec<SchemaError>>,
}

struct TypeMap {
    types: IndexMap<Name, NamedType>,
    errors: Vec<SchemaError>,
}

impl Type {
    pub fn named(name: impl Into<Name>) -> Self {
        Type::Named(name.into())
    }

    /// Returns this type made non-null, if it isn’t already.
    pub fn non_null(self) -> Self {
        match self {
            Type::Named(name) => Type::NonNullNamed(name),
            Type::List(inner) => Type::NonNullList(inner),
            Type::NonNullNamed(_) => self,
            Type::NonNullList(_) => self,
        }
    }

    /// Returns this type without its non-null marker, if any.
    pub fn nullable(self) -> Self {
        match self {
            Type::NonNullNamed(name) => Type::Named(name),
            Type::NonNullList(inner) => Type::List(inner),
            Type::Named(_) | Type::List(_) => self,
        }
    }

    /// Returns a list type whose items are this type.
    pub fn list(self) -> Self {
        Type::List(Box::new(self))
    }

    /// Removes one wrapper, or every wrapper if `recurse` is true.
    ///
    /// A non-null list unwraps to the nullable list, which unwraps to its item type.
    pub fn unwrap_type(&self, recurse: bool) -> Type {
        let once = match self {
            Type::Named(_) => return self.clone(),
            Type::NonNullNamed(name) => Type::Named(name.clone()),
            Type::NonNullList(inner) => Type::List(inner.clone()),
            Type::List(inner) => (**inner).clone(),
        };
        if recurse {
            once.unwrap_type(true)
        } else {
            once
        }
    }

    /// Returns the inner named type, after unwrapping any non-null or list markers.
    pub fn inner_named_type(&self) -> &Name {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => name,
            Type::List(inner) | Type::NonNullList(inner) => inner.inner_named_type(),
        }
    }

    /// For a list type, the type of its items
    pub fn item_type(&self) -> Option<&Type> {
        match self {
            Type::List(inner) | Type::NonNullList(inner) => Some(inner),
            Type::Named(_) | Type::NonNullNamed(_) => None,
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_) | Type::NonNullList(_))
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Type::Named(_) | Type::NonNullNamed(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::NonNullNamed(name) => write!(f, "{name}!"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNullList(inner) => write!(f, "[{inner}]!"),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl NamedType {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(def) => def.description.as_deref(),
            Self::Object(def) => def.description.as_deref(),
            Self::Interface(def) => def.description.as_deref(),
            Self::Union(def) => def.description.as_deref(),
            Self::Enum(def) => def.description.as_deref(),
            Self::InputObject(def) => def.description.as_deref(),
        }
    }

    /// Whether both handles point to the same type instance
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Interface(a), Self::Interface(b)) => Arc::ptr_eq(a, b),
            (Self::Union(a), Self::Union(b)) => Arc::ptr_eq(a, b),
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::InputObject(a), Self::InputObject(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// A human-readable name of the kind of type, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Object(_) => "object",
            Self::Interface(_) => "interface",
            Self::Union(_) => "union",
            Self::Enum(_) => "enum",
            Self::InputObject(_) => "input object",
        }
    }

    /// Scalars, enums, and input objects
    pub fn is_input_type(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    /// Everything but input objects
    pub fn is_output_type(&self) -> bool {
        !matches!(self, Self::InputObject(_))
    }

    /// Scalars and enums
    pub fn is_leaf_type(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    /// Objects, interfaces, and unions
    pub fn is_composite_type(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    /// Interfaces and unions
    pub fn is_abstract_type(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectType>> {
        if let Self::Object(def) = self {
            Some(def)
        } else {
            None
        }
    }
}

impl fmt::Debug for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(def) => fmt::Debug::fmt(def, f),
            Self::Object(def) => fmt::Debug::fmt(def, f),
            Self::Interface(def) => fmt::Debug::fmt(def, f),
            Self::Union(def) => fmt::Debug::fmt(def, f),
            Self::Enum(def) => fmt::Debug::fmt(def, f),
            Self::InputObject(def) => fmt::Debug::fmt(def, f),
        }
    }
}

macro_rules! named_type_from {
    ($($variant: ident($ty: ident)),+) => {
        $(
            impl From<Arc<$ty>> for NamedType {
                fn from(def: Arc<$ty>) -> Self {
                    Self::$variant(def)
                }
            }

            impl From<&'_ Arc<$ty>> for NamedType {
                fn from(def: &'_ Arc<$ty>) -> Self {
                    Self::$variant(def.clone())
                }
            }

            impl From<$ty> for NamedType {
                fn from(def: $ty) -> Self {
                    Self::$variant(Arc::new(def))
                }
            }
        )+
    };
}

named_type_from!(
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType)
);

impl CoercionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root query type. Required for a valid schema.
    pub fn query(mut self, query: impl Into<Arc<ObjectType>>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn mutation(mut self, mutation: impl Into<Arc<ObjectType>>) -> Self {
        self.mutation = Some(mutation.into());
        self
    }

    pub fn subscription(mut self, subscription: impl Into<Arc<ObjectType>>) -> Self {
        self.subscription = Some(subscription.into());
        self
    }

    /// Register types, such as types only referenced by name
    /// or object types only reachable through an interface.
    pub fn types<T: Into<NamedType>>(mut self, types: impl IntoIterator<Item = T>) -> Self {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    /// Register types produced on first full discovery of the schema
    pub fn types_with(mut self, types: impl FnOnce() -> Vec<NamedType> + Send + 'static) -> Self {
        self.types_with = Some(Box::new(types));
        self
    }

    /// Replace the standard directives (`@include`, `@skip`, and `@deprecated`).
    ///
    /// Standard directives that should stay supported must be included explicitly.
    pub fn directives(
        mut self,
        directives: impl IntoIterator<Item = Arc<DirectiveDefinition>>,
    ) -> Self {
        self.directives = Some(directives.into_iter().collect());
        self
    }

    /// Enable lazy mode: types are looked up by name when first needed
    pub fn type_loader(
        mut self,
        loader: impl Fn(&str) -> Option<NamedType> + Send + Sync + 'static,
    ) -> Self {
        self.type_loader = Some(Arc::new(loader));
        self
    }

    /// Skip structural self-validation: [`Schema::validate`] returns no error.
    ///
    /// For schemas known to be valid, such as in production after testing.
    pub fn assume_valid(mut self, assume_valid: bool) -> Self {
        self.assume_valid = assume_valid;
        self
    }
}

impl Schema {
    /// Create a schema.
    ///
    /// Problems are not reported here but by [`validate`][Self::validate]
    /// and [`assert_valid`][Self::assert_valid].
    pub fn new(config: SchemaConfig) -> Self {
        let SchemaConfig {
            query,
            mutation,
            subscription,
            types,
            types_with,
            directives,
            type_loader,
            assume_valid,
        } = config;
        let mut resolved_types = IndexMap::<Name, NamedType>::default();
        let mut registration_errors = Vec::new();
        let roots = [&query, &mutation, &subscription]
            .into_iter()
            .flatten()
            .map(NamedType::from);
        for ty in roots.chain(types) {
            if let Some(existing) = resolved_types.get(ty.name()) {
                if !existing.ptr_eq(&ty) {
                    registration_errors.push(SchemaError::DuplicateType(ty.name().clone()))
                }
            } else {
                resolved_types.insert(ty.name().clone(), ty);
            }
        }
        for ty in scalars::standard_types() {
            resolved_types.entry(ty.name().clone()).or_insert(ty);
        }
        let eager = type_loader.is_none();
        let schema = Self(Arc::new(SchemaInner {
            query,
            mutation,
            subscription,
            directives: directives.unwrap_or_else(DirectiveDefinition::standard_directives),
            resolved_types: RwLock::new(resolved_types),
            registration_errors,
            types_with: Mutex::new(types_with),
            type_loader,
            assume_valid,
            type_map: OnceLock::new(),
            possible_types: OnceLock::new(),
            loader_errors: Mutex::new(Vec::new()),
            validation_errors: OnceLock::new(),
        }));
        if eager {
            schema.type_map();
        }
        schema
    }

    pub fn query_type(&self) -> Option<&Arc<ObjectType>> {
        self.0.query.as_ref()
    }

    pub fn mutation_type(&self) -> Option<&Arc<ObjectType>> {
        self.0.mutation.as_ref()
    }

    pub fn subscription_type(&self) -> Option<&Arc<ObjectType>> {
        self.0.subscription.as_ref()
    }

    /// The root type for the given kind of operation, if defined
    pub fn root_type(&self, operation_type: OperationType) -> Option<&Arc<ObjectType>> {
        match operation_type {
            OperationType::Query => self.query_type(),
            OperationType::Mutation => self.mutation_type(),
            OperationType::Subscription => self.subscription_type(),
        }
    }

    pub fn directives(&self) -> &[Arc<DirectiveDefinition>] {
        &self.0.directives
    }

    pub fn get_directive(&self, name: &str) -> Option<&Arc<DirectiveDefinition>> {
        self.0.directives.iter().find(|def| def.name == name)
    }

    pub fn has_type_loader(&self) -> bool {
        self.0.type_loader.is_some()
    }

    /// Returns the type with the given name.
    ///
    /// In lazy mode, the type loader is called the first time a name is not yet known,
    /// and its result is kept for subsequent calls.
    /// Returns an error if the loader returns a type with a different name.
    pub fn get_type(&self, name: &str) -> Result<Option<NamedType>, SchemaConfigError> {
        if let Some(ty) = self.0.resolved_types.read().get(name) {
            return Ok(Some(ty.clone()));
        }
        if self.0.type_loader.is_some() {
            if let Some(ty) = self.load_type(name)? {
                return Ok(Some(ty));
            }
            // Types registered with `types_with` are only known after full discovery
            return Ok(self
                .0
                .type_map
                .get()
                .and_then(|map| map.types.get(name).cloned()));
        }
        Ok(self.type_map().get(name).cloned())
    }

    /// Whether a type with this name can be found.
    /// Like [`get_type`][Self::get_type], may call the type loader.
    pub fn has_type(&self, name: &str) -> bool {
        matches!(self.get_type(name), Ok(Some(_)))
    }

    pub fn get_object(&self, name: &str) -> Result<Option<Arc<ObjectType>>, SchemaConfigError> {
        Ok(self.get_type(name)?.as_ref().and_then(NamedType::as_object).cloned())
    }

    /// Call the type loader, keeping the first instance returned for each name
    fn load_type(&self, name: &str) -> Result<Option<NamedType>, SchemaConfigError> {
        let Some(loader) = &self.0.type_loader else {
            return Ok(None);
        };
        tracing::trace!(type_name = name, "calling type loader");
        let Some(ty) = loader(name) else {
            return Ok(None);
        };
        if ty.name() != name {
            let error = SchemaConfigError::TypeLoaderNameMismatch {
                requested: name.to_owned(),
                returned: ty.name().to_string(),
            };
            self.0.loader_errors.lock().push(error.clone());
            return Err(error);
        }
        // Another thread may have loaded the same name concurrently: keep the first
        let mut resolved = self.0.resolved_types.write();
        Ok(Some(resolved.entry(ty.name().clone()).or_insert(ty).clone()))
    }

    /// Every type reachable from the roots, configured types, and directive arguments,
    /// in discovery order.
    ///
    /// Expensive on first call. In lazy mode this defeats the purpose of the type loader,
    /// which is called for every referenced type: avoid in hot paths.
    pub fn type_map(&self) -> &IndexMap<Name, NamedType> {
        &self.full_type_map().types
    }

    fn full_type_map(&self) -> &TypeMap {
        self.0.type_map.get_or_init(|| {
            let seeds: Vec<NamedType> = self.0.resolved_types.read().values().cloned().collect();
            let additional: Vec<NamedType> = self
                .0
                .types_with
                .lock()
                .take()
                .map(|thunk| thunk())
                .unwrap_or_default();
            let mut discovery = Discovery {
                schema: self,
                types: IndexMap::default(),
                errors: Vec::new(),
                additional: IndexMap::default(),
            };
            for ty in &additional {
                discovery
                    .additional
                    .entry(ty.name().clone())
                    .or_insert_with(|| ty.clone());
            }
            for ty in &seeds {
                discovery.extract(ty)
            }
            for directive in &self.0.directives {
                for arg in &directive.arguments {
                    discovery.reference(arg.ty.inner_named_type(), || {
                        format!("@{}({}:)", directive.name, arg.name)
                    })
                }
            }
            for ty in &additional {
                discovery.extract(ty)
            }
            TypeMap {
                types: discovery.types,
                errors: discovery.errors,
            }
        })
    }

    /// The concrete object types of an interface or union, in discovery order.
    ///
    /// Computed once from the [full type map][Self::type_map].
    pub fn possible_types(&self, abstract_type: &str) -> &[Arc<ObjectType>] {
        self.possible_type_map()
            .get(abstract_type)
            .map_or(&[], Vec::as_slice)
    }

    fn possible_type_map(&self) -> &IndexMap<Name, Vec<Arc<ObjectType>>> {
        self.0.possible_types.get_or_init(|| {
            let type_map = self.type_map();
            let mut map = IndexMap::<Name, Vec<Arc<ObjectType>>>::default();
            let mut add = |abstract_name: &Name, object: &Arc<ObjectType>| {
                let entry = map.entry(abstract_name.clone()).or_default();
                if !entry.iter().any(|existing| existing.name == object.name) {
                    entry.push(object.clone())
                }
            };
            for ty in type_map.values() {
                match ty {
                    NamedType::Object(object) => {
                        for interface in object.interfaces() {
                            if let Some(NamedType::Interface(_)) = type_map.get(interface) {
                                add(interface, object)
                            }
                        }
                    }
                    NamedType::Union(union_) => {
                        for member in union_.members() {
                            if let Some(NamedType::Object(object)) = type_map.get(member) {
                                add(&union_.name, object)
                            }
                        }
                    }
                    _ => {}
                }
            }
            map
        })
    }

    /// Whether `object` is a concrete type of the interface or union `abstract_type`.
    /// Always false if `abstract_type` is not abstract.
    pub fn is_possible_type(&self, abstract_type: &NamedType, object: &ObjectType) -> bool {
        match abstract_type {
            NamedType::Interface(interface) => object.implements_interface(&interface.name),
            NamedType::Union(union_) => union_.has_member(&object.name),
            _ => false,
        }
    }

    /// Look up the named type of a type reference.
    /// Unknown names and type loader errors are treated as absent.
    pub fn named_type(&self, ty: &Type) -> Option<NamedType> {
        self.get_type(ty.inner_named_type()).ok().flatten()
    }

    pub fn is_input_type(&self, ty: &Type) -> bool {
        self.named_type(ty).is_some_and(|def| def.is_input_type())
    }

    pub fn is_output_type(&self, ty: &Type) -> bool {
        self.named_type(ty).is_some_and(|def| def.is_output_type())
    }

    /// Leaf types, possibly wrapped
    pub fn is_leaf_type(&self, ty: &Type) -> bool {
        self.named_type(ty).is_some_and(|def| def.is_leaf_type())
    }

    pub fn is_composite_type(&self, ty: &Type) -> bool {
        self.named_type(ty).is_some_and(|def| def.is_composite_type())
    }

    pub fn is_abstract_type(&self, ty: &Type) -> bool {
        self.named_type(ty).is_some_and(|def| def.is_abstract_type())
    }

    /// Check the schema for structural problems.
    ///
    /// The result is computed once: later calls return the same list.
    /// Always empty for a schema configured with [`assume_valid`][SchemaConfig::assume_valid].
    pub fn validate(&self) -> &[SchemaError] {
        self.0.validation_errors.get_or_init(|| {
            if self.0.assume_valid {
                return Vec::new();
            }
            let errors = validation::validate_schema(self);
            if !errors.is_empty() {
                tracing::debug!(errors = errors.len(), "schema validation found errors")
            }
            errors
        })
    }

    /// Like [`validate`][Self::validate] but returns the first problem as an error.
    ///
    /// In lazy mode this also calls the type loader again for every known type
    /// and checks that it returns the same instance as before.
    pub fn assert_valid(&self) -> Result<(), SchemaConfigError> {
        let errors = self.validate();
        let type_map = self.type_map();
        if let Some(error) = self.0.loader_errors.lock().first() {
            return Err(error.clone());
        }
        if !errors.is_empty() {
            return Err(SchemaConfigError::Invalid(errors.to_vec()));
        }
        let Some(loader) = &self.0.type_loader else {
            return Ok(());
        };
        for (name, ty) in type_map {
            if scalars::is_standard_scalar(name) {
                continue;
            }
            match loader(name) {
                Some(loaded) if loaded.ptr_eq(ty) => {}
                _ => return Err(SchemaConfigError::TypeLoaderInstanceMismatch(name.clone())),
            }
        }
        Ok(())
    }

    pub(crate) fn registration_errors(&self) -> &[SchemaError] {
        &self.0.registration_errors
    }

    pub(crate) fn discovery_errors(&self) -> &[SchemaError] {
        &self.full_type_map().errors
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("query", &self.0.query)
            .field("mutation", &self.0.mutation)
            .field("subscription", &self.0.subscription)
            .field("types", &self.0.resolved_types.read().keys())
            .finish_non_exhaustive()
    }
}

/// Walks type references by name, depth-first.
struct Discovery<'a> {
    schema: &'a Schema,
    types: IndexMap<Name, NamedType>,
    errors: Vec<SchemaError>,
    /// From `SchemaConfig::types_with`
    additional: IndexMap<Name, NamedType>,
}

impl Discovery<'_> {
    fn extract(&mut self, ty: &NamedType) {
        if let Some(existing) = self.types.get(ty.name()) {
            if !existing.ptr_eq(ty) {
                self.errors.push(SchemaError::DuplicateType(ty.name().clone()))
            }
            return;
        }
        self.types.insert(ty.name().clone(), ty.clone());
        match ty {
            NamedType::Scalar(_) | NamedType::Enum(_) => {}
            NamedType::Union(def) => {
                for member in def.members() {
                    self.reference(member, || def.name.to_string())
                }
            }
            NamedType::Object(def) => {
                for interface in def.interfaces() {
                    self.reference(interface, || def.name.to_string())
                }
                self.fields(&def.name, def.fields())
            }
            NamedType::Interface(def) => self.fields(&def.name, def.fields()),
            NamedType::InputObject(def) => {
                for field in def.fields().values() {
                    self.reference(field.ty.inner_named_type(), || {
                        format!("{}.{}", def.name, field.name)
                    })
                }
            }
        }
    }

    fn fields(&mut self, type_name: &Name, fields: &DefinitionMap<FieldDefinition>) {
        for field in fields.values() {
            for arg in &field.arguments {
                self.reference(arg.ty.inner_named_type(), || {
                    format!("{type_name}.{}({}:)", field.name, arg.name)
                })
            }
            self.reference(field.ty.inner_named_type(), || {
                format!("{type_name}.{}", field.name)
            })
        }
    }

    fn reference(&mut self, name: &Name, referenced_by: impl FnOnce() -> String) {
        if self.types.contains_key(name) {
            return;
        }
        match self.resolve(name) {
            Ok(Some(ty)) => self.extract(&ty),
            Ok(None) => self.errors.push(SchemaError::UnknownType {
                name: name.clone(),
                referenced_by: referenced_by(),
            }),
            Err(error) => self.errors.push(SchemaError::TypeLoader(error)),
        }
    }

    fn resolve(&self, name: &str) -> Result<Option<NamedType>, SchemaConfigError> {
        if let Some(ty) = self.schema.0.resolved_types.read().get(name) {
            return Ok(Some(ty.clone()));
        }
        if let Some(ty) = self.additional.get(name) {
            return Ok(Some(ty.clone()));
        }
        self.schema.load_type(name)
    }
}
