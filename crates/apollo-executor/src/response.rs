//! The result of executing a request: data, errors, and extensions

use crate::JsonMap;
use crate::JsonValue;
use crate::Name;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Public message of errors that are not safe to show to clients,
/// such as a panic inside a resolver.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Formats a single error into its wire shape.
///
/// The default is [`GraphQLError::to_json`].
pub type ErrorFormatter = Arc<dyn Fn(&GraphQLError) -> JsonMap + Send + Sync>;

/// Post-processes the whole error list before serialization (filtering, logging, redaction…).
///
/// Receives the errors and the formatter prepared for the current [`DebugFlags`].
/// The default maps the formatter over every error.
pub type ErrorsHandler =
    Arc<dyn Fn(&[GraphQLError], &dyn Fn(&GraphQLError) -> JsonMap) -> Vec<JsonMap> + Send + Sync>;

/// The outcome of executing an operation
/// in the [GraphQL response format](https://spec.graphql.org/October2021/#sec-Response-Format).
///
/// Formatting hooks are only applied by [`to_json`][Self::to_json]
/// (and by the [`Serialize`] implementation, which calls it with default flags).
#[derive(Clone)]
pub struct ExecutionResult {
    /// Data collected from resolvers during execution
    pub data: ResponseData,

    /// Errors collected during execution, ordered by their position in the response
    pub errors: Vec<GraphQLError>,

    /// Reserved for any additional information
    pub extensions: JsonMap,

    error_formatter: Option<ErrorFormatter>,
    errors_handler: Option<ErrorsHandler>,
}

/// The `data` entry of an [`ExecutionResult`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Option<JsonMap>")]
pub enum ResponseData {
    /// Execution returned an object.
    Object(JsonMap),

    /// Execution encountered a [field error] on a non-null field,
    /// and null was [propagated] all the way to the root of the response.
    ///
    /// [field error]: https://spec.graphql.org/October2021/#sec-Errors.Field-errors
    /// [propagated]: https://spec.graphql.org/October2021/#sec-Handling-Field-Errors
    Null,

    /// A [request error] was encountered. Execution did not start.
    /// The `data` key is omitted from serialization.
    ///
    /// [request error]: https://spec.graphql.org/October2021/#sec-Errors.Request-errors
    Absent,
}

/// An [error](https://spec.graphql.org/October2021/#sec-Errors.Error-result-format)
/// recorded while handling a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in the query text relevant to the error, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub locations: Vec<GraphQLLocation>,

    /// If non-empty, the error is a [field error]
    /// for the particular field found at this path in [`ExecutionResult::data`].
    ///
    /// [field error]: https://spec.graphql.org/October2021/#sec-Errors.Field-errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub path: Vec<PathElement>,

    /// Reserved for any additional information
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    #[serde(default)]
    pub extensions: JsonMap,

    /// For errors that are not client-safe, the original message.
    /// `message` is then [`INTERNAL_ERROR_MESSAGE`].
    #[serde(skip)]
    pub debug_message: Option<String>,
}

/// A source location (line and column numbers) for a [`GraphQLError`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphQLLocation {
    /// The line number for this location, starting at 1 for the first line.
    pub line: usize,
    /// The column number for this location, starting at 1 and counting characters (Unicode Scalar
    /// Values) like [`str::chars`].
    pub column: usize,
}

/// An element of [`GraphQLError::path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// The relevant key in an object value
    Field(Name),

    /// The index of the relevant item in a list value
    ListIndex(usize),
}

/// Options of [`ExecutionResult::to_json`] that expose details meant for developers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    /// Add a `debugMessage` entry with the original message of internal errors
    pub include_debug_message: bool,
}

impl ExecutionResult {
    pub fn new(data: ResponseData, errors: Vec<GraphQLError>) -> Self {
        Self {
            data,
            errors,
            extensions: JsonMap::new(),
            error_formatter: None,
            errors_handler: None,
        }
    }

    /// Create a result for a [request error]:
    /// handling of a request was aborted before execution started.
    ///
    /// [request error]: https://spec.graphql.org/October2021/#sec-Errors.Request-errors
    pub fn from_request_error(error: impl Into<GraphQLError>) -> Self {
        Self::from_request_errors(vec![error.into()])
    }

    pub fn from_request_errors(errors: Vec<GraphQLError>) -> Self {
        Self::new(ResponseData::Absent, errors)
    }

    pub fn with_extensions(mut self, extensions: JsonMap) -> Self {
        self.extensions = extensions;
        self
    }

    /// Replace the per-error formatter.
    ///
    /// The formatted shape must still follow
    /// <https://spec.graphql.org/October2021/#sec-Errors>: at least a `message` entry.
    pub fn set_error_formatter(
        &mut self,
        formatter: impl Fn(&GraphQLError) -> JsonMap + Send + Sync + 'static,
    ) -> &mut Self {
        self.error_formatter = Some(Arc::new(formatter));
        self
    }

    /// Replace the error list handler
    pub fn set_errors_handler(
        &mut self,
        handler: impl Fn(&[GraphQLError], &dyn Fn(&GraphQLError) -> JsonMap) -> Vec<JsonMap>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        self.errors_handler = Some(Arc::new(handler));
        self
    }

    /// Convert to the wire shape, applying the configured error formatter and handler.
    ///
    /// Keys are in this order: `errors` (omitted when there is no error),
    /// `data` (omitted when [absent][ResponseData::Absent]), `extensions` (omitted when empty).
    pub fn to_json(&self, debug: DebugFlags) -> JsonMap {
        let mut result = JsonMap::new();
        if !self.errors.is_empty() {
            let prepared = |error: &GraphQLError| {
                let mut formatted = match &self.error_formatter {
                    Some(formatter) => formatter(error),
                    None => error.to_json(),
                };
                if debug.include_debug_message {
                    if let Some(debug_message) = &error.debug_message {
                        formatted.insert("debugMessage", debug_message.as_str().into());
                    }
                }
                formatted
            };
            let formatted: Vec<JsonValue> = match &self.errors_handler {
                Some(handler) => handler(&self.errors, &prepared),
                None => self.errors.iter().map(prepared).collect(),
            }
            .into_iter()
            .map(JsonValue::Object)
            .collect();
            result.insert("errors", JsonValue::Array(formatted));
        }
        match &self.data {
            ResponseData::Absent => {}
            ResponseData::Null => {
                result.insert("data", JsonValue::Null);
            }
            ResponseData::Object(data) => {
                result.insert("data", JsonValue::Object(data.clone()));
            }
        }
        if !self.extensions.is_empty() {
            result.insert("extensions", JsonValue::Object(self.extensions.clone()));
        }
        result
    }
}

impl fmt::Debug for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionResult")
            .field("data", &self.data)
            .field("errors", &self.errors)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl Serialize for ExecutionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_json(DebugFlags::default()).serialize(serializer)
    }
}

impl ResponseData {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            Self::Object(map) => Some(map),
            Self::Null | Self::Absent => None,
        }
    }
}

impl From<Option<JsonMap>> for ResponseData {
    fn from(value: Option<JsonMap>) -> Self {
        match value {
            Some(data) => Self::Object(data),
            None => Self::Null,
        }
    }
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: JsonMap::new(),
            debug_message: None,
        }
    }

    /// Create an error that is not safe to show to clients.
    ///
    /// The public message is [`INTERNAL_ERROR_MESSAGE`],
    /// the given message is kept as [`debug_message`][Self::debug_message].
    pub fn internal(debug_message: impl Into<String>) -> Self {
        Self {
            debug_message: Some(debug_message.into()),
            ..Self::new(INTERNAL_ERROR_MESSAGE)
        }
    }

    pub fn with_location(mut self, location: Option<GraphQLLocation>) -> Self {
        self.locations.extend(location);
        self
    }

    /// Whether `message` can be shown to clients
    pub fn is_client_safe(&self) -> bool {
        self.debug_message.is_none()
    }

    /// The default error formatter: `message`, then `locations`, `path`
    /// and `extensions` when non-empty.
    pub fn to_json(&self) -> JsonMap {
        let mut map = JsonMap::new();
        map.insert("message", self.message.as_str().into());
        if !self.locations.is_empty() {
            let locations = self
                .locations
                .iter()
                .map(|location| {
                    let mut entry = JsonMap::new();
                    entry.insert("line", location.line.into());
                    entry.insert("column", location.column.into());
                    JsonValue::Object(entry)
                })
                .collect();
            map.insert("locations", JsonValue::Array(locations));
        }
        if !self.path.is_empty() {
            let path = self
                .path
                .iter()
                .map(|element| match element {
                    PathElement::Field(name) => JsonValue::from(name.as_str()),
                    PathElement::ListIndex(index) => JsonValue::from(*index),
                })
                .collect();
            map.insert("path", JsonValue::Array(path));
        }
        if !self.extensions.is_empty() {
            map.insert("extensions", JsonValue::Object(self.extensions.clone()));
        }
        map
    }
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::ListIndex(index) => write!(f, "{index}"),
        }
    }
}
