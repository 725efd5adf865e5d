use crate::executable::ExecutableDocument;
use crate::executable::Field;
use crate::executable::Operation;
use crate::execution::engine::LinkedPath;
use crate::response::PathElement;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::schema::Type;
use crate::JsonMap;
use crate::JsonValue;
use crate::Name;
use crate::Node;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The runtime value of a field, as returned by a resolver
pub enum FieldValue {
    /// * JSON null represents GraphQL null
    /// * Leaf values are in internal representation,
    ///   converted by the scalar’s or enum’s serialize function
    /// * A JSON object can be the value of an object, interface, or union type:
    ///   the default field resolver reads its keys
    Json(JsonValue),

    /// Expected for GraphQL list types
    List(Vec<FieldValue>),

    /// An application value with its own way to resolve fields
    Object(Arc<dyn ObjectValue>),

    /// A value available later. It is completed when the future resolves.
    Future(Thenable),
}

/// A future returned by a resolver, converted to a promise by the [`PromiseAdapter`]
///
/// [`PromiseAdapter`]: crate::promise::PromiseAdapter
pub struct Thenable(Mutex<Option<BoxFuture<'static, Result<FieldValue, FieldError>>>>);

/// Upcast to [`Any`], so that resolvers can downcast [`FieldValue::Object`] parents
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An application object whose fields can be resolved during execution.
pub trait ObjectValue: AsAny + Send + Sync {
    /// The name of the concrete object type this value represents, if known.
    ///
    /// Used by the default type resolver when the declared type is an interface or union.
    fn type_name(&self) -> Option<&str> {
        None
    }

    /// Resolve a field of this object, for fields without a resolver of their own.
    ///
    /// This is not called for the `__typename` meta-field.
    /// The default returns null.
    fn resolve_field(
        &self,
        info: &ResolveInfo<'_>,
        arguments: &JsonMap,
        context: &ContextValue,
    ) -> Result<FieldValue, FieldError> {
        let _ = (info, arguments, context);
        Ok(FieldValue::null())
    }
}

/// Application-defined state shared by every resolver of one execution,
/// such as database connections or the authenticated user.
#[derive(Clone, Default)]
pub struct ContextValue(Option<Arc<dyn Any + Send + Sync>>);

/// An error returned by a resolver. It becomes a field error in the response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
    /// Copied to the `extensions` of the response error
    pub extensions: JsonMap,
}

/// Information about the field being resolved
pub struct ResolveInfo<'a> {
    /// The name of the field in the schema, not its alias
    pub field_name: &'a Name,
    /// Every selection of this field merged under the same response key
    pub field_nodes: &'a [Node<Field>],
    pub return_type: &'a Type,
    pub parent_type: &'a Arc<ObjectType>,
    pub schema: &'a Schema,
    pub document: &'a ExecutableDocument,
    pub operation: &'a Node<Operation>,
    /// Coerced variable values of the operation
    pub variable_values: &'a JsonMap,
    pub root_value: &'a FieldValue,
    pub(crate) path: &'a LinkedPath,
}

impl FieldValue {
    pub fn null() -> Self {
        Self::Json(JsonValue::Null)
    }

    /// A leaf value, or a JSON object or list
    pub fn leaf(json: impl Into<JsonValue>) -> Self {
        Self::Json(json.into())
    }

    pub fn object(object: impl ObjectValue + 'static) -> Self {
        Self::Object(Arc::new(object))
    }

    pub fn opt_object(object: Option<impl ObjectValue + 'static>) -> Self {
        object.map_or_else(Self::null, Self::object)
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FieldValue>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// A value resolved asynchronously
    pub fn future(
        future: impl Future<Output = Result<FieldValue, FieldError>> + Send + 'static,
    ) -> Self {
        Self::Future(Thenable(Mutex::new(Some(future.boxed()))))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(JsonValue::Null))
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Downcast the application value of [`FieldValue::Object`]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => (**object).as_any().downcast_ref(),
            _ => None,
        }
    }

    /// Convert to JSON if this value contains neither objects nor futures
    pub(crate) fn to_json(&self) -> Option<JsonValue> {
        match self {
            Self::Json(json) => Some(json.clone()),
            Self::List(items) => items.iter().map(Self::to_json).collect(),
            Self::Object(_) | Self::Future(_) => None,
        }
    }
}

impl Thenable {
    /// Take the future out. Returns `None` if it was already taken.
    pub fn take(&self) -> Option<BoxFuture<'static, Result<FieldValue, FieldError>>> {
        self.0.lock().take()
    }
}

impl ContextValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref()
    }
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: JsonMap::new(),
        }
    }

    pub fn with_extension(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extensions.insert(key, value.into());
        self
    }
}

impl ResolveInfo<'_> {
    /// The path in the response to the field being resolved
    pub fn path(&self) -> Vec<PathElement> {
        self.path.to_vec()
    }

    /// The response key of the field being resolved: its alias if any, or its name
    pub fn response_key(&self) -> &Name {
        self.field_nodes
            .first()
            .map_or(self.field_name, |field| field.response_key())
    }
}

impl From<JsonValue> for FieldValue {
    fn from(json: JsonValue) -> Self {
        Self::Json(json)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        Self::List(items)
    }
}

macro_rules! field_value_from_leaf {
    ($($ty: ty),+) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::Json(value.into())
                }
            }
        )+
    };
}

field_value_from_leaf!(&str, String, bool, i32, i64, f64);

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

impl From<&'_ str> for FieldError {
    fn from(message: &'_ str) -> Self {
        Self::new(message)
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(json) => f.debug_tuple("Json").field(json).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Object(object) => f
                .debug_tuple("Object")
                .field(&object.type_name().unwrap_or("_"))
                .finish(),
            Self::Future(_) => f.write_str("Future"),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextValue")
            .field(&self.0.as_ref().map(|_| ".."))
            .finish()
    }
}
