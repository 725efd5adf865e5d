//! APIs related to [executing a GraphQL request][execution]
//! against a [`Schema`] whose fields have resolvers
//!
//! [execution]: https://spec.graphql.org/October2021/#sec-Execution

mod engine;
mod input_coercion;
mod resolver;
mod result_coercion;
mod validator;
mod value;

pub use self::input_coercion::coerce_variable_values;
pub use self::resolver::default_field_resolver;
pub use self::resolver::default_type_resolver;
pub use self::validator::QueryComplexity;
pub use self::validator::ValidationRule;
pub use self::value::AsAny;
pub use self::value::ContextValue;
pub use self::value::FieldError;
pub use self::value::FieldValue;
pub use self::value::ObjectValue;
pub use self::value::ResolveInfo;
pub use self::value::Thenable;
use crate::executable::OperationType;
use crate::promise::FuturesPromiseAdapter;
use crate::promise::Promise;
use crate::promise::PromiseAdapter;
use crate::promise::PromiseError;
use crate::promise::Rejection;
use crate::promise::SyncPromiseAdapter;
use crate::response::GraphQLError;
use crate::response::ResponseData;
use crate::schema::Resolver;
use crate::schema::SchemaConfigError;
use crate::ExecutableDocument;
use crate::ExecutionResult;
use crate::JsonMap;
use crate::Schema;
use engine::ExecutionContext;
use engine::ExecutionMode;
use engine::LinkedPath;
use engine::PropagateNull;
use std::sync::Arc;

/// A request to execute one operation of a document.
///
/// Create with [`Execution::new`], configure with builder methods,
/// then call one of [`execute`][Self::execute], [`execute_sync`][Self::execute_sync],
/// or [`execute_async`][Self::execute_async].
///
/// The document is expected to be valid against the schema.
/// Validation is not performed here: errors found by a validator are given
/// through [`validation_errors`][Self::validation_errors].
/// Additional [rules][ValidationRule] can be run before execution.
///
/// ```
/// use apollo_executor::execution::FieldValue;
/// use apollo_executor::schema::{FieldDefinition, ObjectType, Type};
/// use apollo_executor::{ExecutableDocument, Execution, Schema, SchemaConfig};
///
/// let query = ObjectType::new("Query").field(
///     FieldDefinition::new("hello", Type::named("String"))
///         .resolve(|_parent, _args, _context, _info| Ok(FieldValue::from("world"))),
/// );
/// let schema = Schema::new(SchemaConfig::new().query(query));
/// let document = ExecutableDocument::parse("{ hello }").unwrap();
/// let result = Execution::new(&schema, &document).execute_sync().unwrap();
/// assert_eq!(
///     serde_json::to_string(&result).unwrap(),
///     r#"{"data":{"hello":"world"}}"#
/// );
/// ```
pub struct Execution<'a> {
    schema: &'a Schema,
    document: &'a ExecutableDocument,
    root_value: FieldValue,
    context_value: ContextValue,
    variable_values: JsonMap,
    operation_name: Option<String>,
    field_resolver: Option<Resolver>,
    validation_errors: Vec<GraphQLError>,
    validation_rules: Vec<Box<dyn ValidationRule + 'a>>,
}

/// Execution could not produce a result
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Promise(#[from] PromiseError),

    /// A type loader misbehaved during execution
    #[error(transparent)]
    SchemaConfig(SchemaConfigError),

    #[error("execution was aborted: {0}")]
    Rejected(Rejection),
}

impl<'a> Execution<'a> {
    pub fn new(schema: &'a Schema, document: &'a ExecutableDocument) -> Self {
        Self {
            schema,
            document,
            root_value: FieldValue::null(),
            context_value: ContextValue::default(),
            variable_values: JsonMap::new(),
            operation_name: None,
            field_resolver: None,
            validation_errors: Vec::new(),
            validation_rules: Vec::new(),
        }
    }

    /// The parent value of root fields. Defaults to null.
    pub fn root_value(mut self, root_value: impl Into<FieldValue>) -> Self {
        self.root_value = root_value.into();
        self
    }

    pub fn context_value(mut self, context_value: ContextValue) -> Self {
        self.context_value = context_value;
        self
    }

    /// Variable values as provided in the request, before coercion
    pub fn variable_values(mut self, variable_values: JsonMap) -> Self {
        self.variable_values = variable_values;
        self
    }

    /// Required if the document has more than one operation
    pub fn operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    /// Replace [`default_field_resolver`] for fields that have no resolver of their own
    /// and whose parent type has no `resolve_field` function.
    pub fn field_resolver(
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
        self.field_resolver = Some(Arc::new(resolver));
        self
    }

    /// Errors found by validating the document. If any, the document is not executed.
    pub fn validation_errors(mut self, errors: Vec<GraphQLError>) -> Self {
        self.validation_errors = errors;
        self
    }

    /// Add a rule to run before execution, such as [`QueryComplexity`]
    pub fn validation_rule(mut self, rule: impl ValidationRule + 'a) -> Self {
        self.validation_rules.push(Box::new(rule));
        self
    }

    /// Execute through a promise adapter.
    ///
    /// The returned promise is fulfilled with a result, including on request errors.
    /// It is rejected only if execution was aborted by a type loader error
    /// ([`Rejection::SchemaConfig`]) or by a panic inside the adapter.
    pub fn execute<A>(self, adapter: &A) -> Promise<ExecutionResult>
    where
        A: PromiseAdapter + Clone + 'static,
    {
        if !self.validation_errors.is_empty() {
            return adapter.create_fulfilled(ExecutionResult::from_request_errors(
                self.validation_errors,
            ));
        }
        let rule_errors: Vec<_> = self
            .validation_rules
            .iter()
            .flat_map(|rule| rule.validate(self.schema, self.document, &self.variable_values))
            .collect();
        if !rule_errors.is_empty() {
            return adapter.create_fulfilled(ExecutionResult::from_request_errors(rule_errors));
        }
        let operation = match self.document.get_operation(self.operation_name.as_deref()) {
            Ok(operation) => operation.clone(),
            Err(error) => {
                return adapter.create_fulfilled(ExecutionResult::from_request_error(
                    GraphQLError::new(error.to_string()),
                ))
            }
        };
        let variable_values =
            match coerce_variable_values(self.schema, &operation, &self.variable_values) {
                Ok(values) => values,
                Err(errors) => {
                    return adapter.create_fulfilled(ExecutionResult::from_request_errors(errors))
                }
            };
        let Some(root_type) = self.schema.root_type(operation.operation_type).cloned() else {
            return adapter.create_fulfilled(ExecutionResult::from_request_error(
                GraphQLError::new(format!(
                    "Schema is not configured to execute {} operation.",
                    operation.operation_type.name()
                ))
                .with_location(operation.location()),
            ));
        };
        let mode = match operation.operation_type {
            OperationType::Mutation => ExecutionMode::Sequential,
            OperationType::Query | OperationType::Subscription => ExecutionMode::Normal,
        };
        tracing::debug!(
            operation_name = operation.name.as_deref(),
            operation_type = operation.operation_type.name(),
            "executing operation"
        );

        let ctx = Arc::new(ExecutionContext::new(
            adapter.clone(),
            self.schema.clone(),
            self.document.clone(),
            operation.clone(),
            variable_values,
            self.root_value,
            self.context_value,
            self.field_resolver
                .unwrap_or_else(|| Arc::new(default_field_resolver)),
        ));
        let data = engine::execute_selection_set(
            &ctx,
            &LinkedPath::default(),
            mode,
            &root_type,
            ctx.root_value.clone(),
            &operation.selection_set,
        );
        let finish_ctx = ctx.clone();
        ctx.adapter.then(
            data,
            move |data| {
                let ctx = finish_ctx;
                if let Some(error) = ctx.take_fatal() {
                    tracing::error!(%error, "schema configuration error aborted execution");
                    return Promise::rejected(Rejection::SchemaConfig(error));
                }
                let errors = ctx.take_errors();
                tracing::debug!(errors = errors.len(), "operation executed");
                let data = match data {
                    Ok(response_map) => ResponseData::Object(response_map),
                    Err(PropagateNull) => ResponseData::Null,
                };
                Promise::fulfilled(ExecutionResult::new(data, errors))
            },
            None,
        )
    }

    /// Execute with [`SyncPromiseAdapter`], blocking until a result is available.
    ///
    /// Resolvers returning [`FieldValue::Future`] must return futures
    /// that complete when polled, or that are completed by tasks
    /// [deferred][SyncPromiseAdapter::defer] on the same adapter.
    /// Use [`execute`][Self::execute] with an adapter given to resolvers through
    /// the context value to defer tasks.
    pub fn execute_sync(self) -> Result<ExecutionResult, ExecutionError> {
        self.execute_with_sync_adapter(&SyncPromiseAdapter::new())
    }

    /// Like [`execute_sync`][Self::execute_sync] with a given adapter,
    /// typically one shared with resolvers that defer work to it.
    pub fn execute_with_sync_adapter(
        self,
        adapter: &SyncPromiseAdapter,
    ) -> Result<ExecutionResult, ExecutionError> {
        let promise = self.execute(adapter);
        Ok(adapter.wait(promise)??)
    }

    /// Execute with [`FuturesPromiseAdapter`] on the async runtime of the caller
    pub async fn execute_async(self) -> Result<ExecutionResult, ExecutionError> {
        Ok(self.execute(&FuturesPromiseAdapter).await?)
    }
}

impl From<Rejection> for ExecutionError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::SchemaConfig(error) => Self::SchemaConfig(error),
            rejection => Self::Rejected(rejection),
        }
    }
}
