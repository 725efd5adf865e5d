use crate::collections::HashSet;
use crate::collections::IndexMap;
use crate::executable::ExecutableDocument;
use crate::executable::Field;
use crate::executable::Operation;
use crate::executable::Selection;
use crate::executable::Value;
use crate::execution::input_coercion::coerce_argument_values;
use crate::execution::result_coercion::complete_value;
use crate::execution::ContextValue;
use crate::execution::FieldError;
use crate::execution::FieldValue;
use crate::execution::ResolveInfo;
use crate::promise::panic_message;
use crate::promise::Promise;
use crate::promise::PromiseAdapter;
use crate::promise::Rejection;
use crate::response::GraphQLError;
use crate::response::GraphQLLocation;
use crate::response::PathElement;
use crate::schema::FieldDefinition;
use crate::schema::NamedType;
use crate::schema::ObjectType;
use crate::schema::Resolver;
use crate::schema::Schema;
use crate::schema::SchemaConfigError;
use crate::schema::Type;
use crate::JsonMap;
use crate::JsonValue;
use crate::Name;
use crate::Node;
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// <https://spec.graphql.org/October2021/#sec-Normal-and-Serial-Execution>
#[derive(Debug, Copy, Clone)]
pub(crate) enum ExecutionMode {
    /// Allowed to resolve fields in any order, including concurrently
    Normal,
    /// Top-level fields of a mutation operation must be executed in order
    Sequential,
}

/// Return in `Err` when a field error occurred at some non-nullable place
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
pub(crate) struct PropagateNull;

/// The completed value of a field, or a null being propagated
pub(crate) type Completed = Result<JsonValue, PropagateNull>;

/// Linked-list version of `Vec<PathElement>`, shared by pending promises
#[derive(Clone, Default)]
pub(crate) struct LinkedPath(Option<Arc<LinkedPathElement>>);

pub(crate) struct LinkedPathElement {
    element: PathElement,
    /// Index of the response key in its grouped field set, or list index
    position: usize,
    next: LinkedPath,
}

pub(crate) struct ExecutionContext<A> {
    pub(crate) adapter: A,
    pub(crate) schema: Schema,
    pub(crate) document: ExecutableDocument,
    pub(crate) operation: Node<Operation>,
    pub(crate) variable_values: JsonMap,
    pub(crate) root_value: Arc<FieldValue>,
    pub(crate) context_value: ContextValue,
    pub(crate) field_resolver: Resolver,
    /// With the position of each error in the response, for ordering
    errors: Mutex<Vec<(Vec<usize>, GraphQLError)>>,
    fatal: Mutex<Option<SchemaConfigError>>,
}

/// What is known about a field before it is resolved.
/// Shared by the completion of its value, including list items.
pub(crate) struct FieldPlan {
    pub(crate) parent_type: Arc<ObjectType>,
    pub(crate) definition: Arc<FieldDefinition>,
    /// Every selection merged under the response key. Never empty.
    pub(crate) fields: Vec<Node<Field>>,
}

impl LinkedPath {
    pub(crate) fn child(&self, element: PathElement, position: usize) -> Self {
        Self(Some(Arc::new(LinkedPathElement {
            element,
            position,
            next: self.clone(),
        })))
    }

    fn iter(&self) -> impl Iterator<Item = &LinkedPathElement> {
        std::iter::successors(self.0.as_deref(), |node| node.next.0.as_deref())
    }

    pub(crate) fn to_vec(&self) -> Vec<PathElement> {
        let mut path: Vec<_> = self.iter().map(|node| node.element.clone()).collect();
        path.reverse();
        path
    }

    fn positions(&self) -> Vec<usize> {
        let mut positions: Vec<_> = self.iter().map(|node| node.position).collect();
        positions.reverse();
        positions
    }
}

impl<A: PromiseAdapter> ExecutionContext<A> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        adapter: A,
        schema: Schema,
        document: ExecutableDocument,
        operation: Node<Operation>,
        variable_values: JsonMap,
        root_value: FieldValue,
        context_value: ContextValue,
        field_resolver: Resolver,
    ) -> Self {
        Self {
            adapter,
            schema,
            document,
            operation,
            variable_values,
            root_value: Arc::new(root_value),
            context_value,
            field_resolver,
            errors: Mutex::new(Vec::new()),
            fatal: Mutex::new(None),
        }
    }

    /// Look up a type by name. A type loader error aborts the execution.
    pub(crate) fn get_type(&self, name: &str) -> Option<NamedType> {
        match self.schema.get_type(name) {
            Ok(ty) => ty,
            Err(error) => {
                self.fatal.lock().get_or_insert(error);
                None
            }
        }
    }

    pub(crate) fn record(&self, path: &LinkedPath, mut error: GraphQLError) {
        error.path = path.to_vec();
        self.errors.lock().push((path.positions(), error))
    }

    pub(crate) fn field_error(
        &self,
        path: &LinkedPath,
        location: Option<GraphQLLocation>,
        message: impl Into<String>,
    ) {
        self.record(path, GraphQLError::new(message).with_location(location))
    }

    pub(crate) fn resolver_error(
        &self,
        path: &LinkedPath,
        location: Option<GraphQLLocation>,
        error: FieldError,
    ) {
        let FieldError {
            message,
            extensions,
        } = error;
        let mut error = GraphQLError::new(message).with_location(location);
        error.extensions = extensions;
        self.record(path, error)
    }

    /// A failure not caused by the request, such as a panic in application code
    pub(crate) fn internal_error(
        &self,
        path: &LinkedPath,
        location: Option<GraphQLLocation>,
        message: String,
    ) {
        self.record(path, GraphQLError::internal(message).with_location(location))
    }

    pub(crate) fn rejection(
        &self,
        path: &LinkedPath,
        location: Option<GraphQLLocation>,
        rejection: Rejection,
    ) {
        match rejection {
            Rejection::Field(error) => self.resolver_error(path, location, error),
            Rejection::SchemaConfig(error) => {
                self.fatal.lock().get_or_insert(error);
            }
            // Already logged when caught
            Rejection::Panic(message) => self.internal_error(path, location, message),
            Rejection::Abandoned => {
                self.internal_error(path, location, Rejection::Abandoned.to_string())
            }
        }
    }

    /// Run application code, turning a panic into an internal field error
    pub(crate) fn guard<R>(
        &self,
        path: &LinkedPath,
        location: Option<GraphQLLocation>,
        callback: impl FnOnce() -> R,
    ) -> Option<R> {
        match std::panic::catch_unwind(AssertUnwindSafe(callback)) {
            Ok(result) => Some(result),
            Err(payload) => {
                let message = panic_message(&*payload);
                tracing::warn!(
                    path = %DisplayPath(path),
                    panic = %message,
                    "resolver panicked"
                );
                self.internal_error(path, location, message);
                None
            }
        }
    }

    pub(crate) fn take_fatal(&self) -> Option<SchemaConfigError> {
        self.fatal.lock().take()
    }

    /// Errors ordered by their position in the response
    pub(crate) fn take_errors(&self) -> Vec<GraphQLError> {
        let mut errors = std::mem::take(&mut *self.errors.lock());
        errors.sort_by(|(a, _), (b, _)| a.cmp(b));
        errors.into_iter().map(|(_, error)| error).collect()
    }
}

impl FieldPlan {
    pub(crate) fn location(&self) -> Option<GraphQLLocation> {
        self.fields.first().and_then(|field| field.location())
    }

    pub(crate) fn info<'a, A>(
        &'a self,
        ctx: &'a ExecutionContext<A>,
        path: &'a LinkedPath,
    ) -> ResolveInfo<'a> {
        ResolveInfo {
            field_name: &self.definition.name,
            field_nodes: &self.fields,
            return_type: &self.definition.ty,
            parent_type: &self.parent_type,
            schema: &ctx.schema,
            document: &ctx.document,
            operation: &ctx.operation,
            variable_values: &ctx.variable_values,
            root_value: &*ctx.root_value,
            path,
        }
    }

    /// `Parent.field`, for error messages
    pub(crate) fn coordinate(&self) -> String {
        format!("{}.{}", self.parent_type.name, self.definition.name)
    }
}

/// <https://spec.graphql.org/October2021/#ExecuteSelectionSet()>
pub(crate) fn execute_selection_set<A: PromiseAdapter + 'static>(
    ctx: &Arc<ExecutionContext<A>>,
    path: &LinkedPath,
    mode: ExecutionMode,
    object_type: &Arc<ObjectType>,
    object_value: Arc<FieldValue>,
    selections: &[Selection],
) -> Promise<Result<JsonMap, PropagateNull>> {
    let mut grouped_field_set = IndexMap::default();
    collect_fields(
        ctx,
        object_type,
        selections,
        &mut HashSet::default(),
        &mut grouped_field_set,
    );

    match mode {
        ExecutionMode::Normal => {
            let mut keys = Vec::with_capacity(grouped_field_set.len());
            let mut promises = Vec::with_capacity(grouped_field_set.len());
            for (position, (response_key, fields)) in grouped_field_set.into_iter().enumerate() {
                let field_path = path.child(PathElement::Field(response_key.clone()), position);
                promises.push(execute_field(
                    ctx,
                    field_path,
                    object_type,
                    &object_value,
                    fields,
                ));
                keys.push(response_key);
            }
            ctx.adapter.then(
                ctx.adapter.all(promises),
                move |values| {
                    let mut response_map = JsonMap::with_capacity(keys.len());
                    for (response_key, value) in keys.into_iter().zip(values) {
                        match value {
                            Ok(Some(value)) => {
                                response_map.insert(response_key.as_str(), value);
                            }
                            Ok(None) => {}
                            Err(PropagateNull) => return Promise::fulfilled(Err(PropagateNull)),
                        }
                    }
                    Promise::fulfilled(Ok(response_map))
                },
                None,
            )
        }
        ExecutionMode::Sequential => {
            // Each field starts when the previous one settled
            let mut chain = ctx
                .adapter
                .create_fulfilled(Ok(JsonMap::with_capacity(grouped_field_set.len())));
            for (position, (response_key, fields)) in grouped_field_set.into_iter().enumerate() {
                let field_ctx = ctx.clone();
                let path = path.clone();
                let object_type = object_type.clone();
                let object_value = object_value.clone();
                chain = ctx.adapter.then(
                    chain,
                    move |response_map: Result<JsonMap, PropagateNull>| {
                        let ctx = field_ctx;
                        let Ok(mut response_map) = response_map else {
                            return Promise::fulfilled(Err(PropagateNull));
                        };
                        let field_path =
                            path.child(PathElement::Field(response_key.clone()), position);
                        let field =
                            execute_field(&ctx, field_path, &object_type, &object_value, fields);
                        ctx.adapter.then(
                            field,
                            move |value| {
                                Promise::fulfilled(value.map(|value| {
                                    if let Some(value) = value {
                                        response_map.insert(response_key.as_str(), value);
                                    }
                                    response_map
                                }))
                            },
                            None,
                        )
                    },
                    None,
                );
            }
            chain
        }
    }
}

/// <https://spec.graphql.org/October2021/#CollectFields()>
fn collect_fields<A: PromiseAdapter>(
    ctx: &ExecutionContext<A>,
    object_type: &ObjectType,
    selections: &[Selection],
    visited_fragments: &mut HashSet<Name>,
    grouped_fields: &mut IndexMap<Name, Vec<Node<Field>>>,
) {
    for selection in selections {
        if eval_if_arg(selection, "skip", &ctx.variable_values).unwrap_or(false)
            || !eval_if_arg(selection, "include", &ctx.variable_values).unwrap_or(true)
        {
            continue;
        }
        match selection {
            Selection::Field(field) => grouped_fields
                .entry(field.response_key().clone())
                .or_default()
                .push(field.clone()),
            Selection::FragmentSpread(spread) => {
                let new = visited_fragments.insert(spread.fragment_name.clone());
                if !new {
                    continue;
                }
                let Some(fragment) = ctx.document.fragments.get(&spread.fragment_name) else {
                    continue;
                };
                if !does_fragment_type_apply(ctx, object_type, &fragment.type_condition) {
                    continue;
                }
                collect_fields(
                    ctx,
                    object_type,
                    &fragment.selection_set,
                    visited_fragments,
                    grouped_fields,
                )
            }
            Selection::InlineFragment(inline) => {
                if let Some(condition) = &inline.type_condition {
                    if !does_fragment_type_apply(ctx, object_type, condition) {
                        continue;
                    }
                }
                collect_fields(
                    ctx,
                    object_type,
                    &inline.selection_set,
                    visited_fragments,
                    grouped_fields,
                )
            }
        }
    }
}

/// <https://spec.graphql.org/October2021/#DoesFragmentTypeApply()>
fn does_fragment_type_apply<A: PromiseAdapter>(
    ctx: &ExecutionContext<A>,
    object_type: &ObjectType,
    fragment_type: &Name,
) -> bool {
    if *fragment_type == object_type.name {
        return true;
    }
    match ctx.get_type(fragment_type) {
        Some(NamedType::Interface(_)) => object_type.implements_interface(fragment_type),
        Some(NamedType::Union(def)) => def.has_member(&object_type.name),
        // Undefined or not a composite type: validation should have caught this
        _ => false,
    }
}

pub(crate) fn eval_if_arg(
    selection: &Selection,
    directive_name: &str,
    variable_values: &JsonMap,
) -> Option<bool> {
    match selection
        .directives()
        .get(directive_name)?
        .argument_by_name("if")?
        .as_ref()
    {
        Value::Boolean(value) => Some(*value),
        Value::Variable(var) => variable_values.get(var.as_str())?.as_bool(),
        _ => None,
    }
}

/// <https://spec.graphql.org/October2021/#ExecuteField()>
///
/// Return `Ok(None)` for silently skipping that field.
fn execute_field<A: PromiseAdapter + 'static>(
    ctx: &Arc<ExecutionContext<A>>,
    path: LinkedPath,
    object_type: &Arc<ObjectType>,
    object_value: &FieldValue,
    fields: Vec<Node<Field>>,
) -> Promise<Result<Option<JsonValue>, PropagateNull>> {
    // Indexing should not panic: `collect_fields` only creates a `Vec` to push to it
    let field = fields[0].clone();
    if field.name == "__typename" {
        return Promise::fulfilled(Ok(Some(object_type.name.as_str().into())));
    }
    let Some(definition) = object_type.field_by_name(&field.name).cloned() else {
        // Undefined field: validation should have caught this
        return Promise::fulfilled(Ok(None));
    };
    let plan = Arc::new(FieldPlan {
        parent_type: object_type.clone(),
        definition,
        fields,
    });
    let location = field.location();
    let resolved = match coerce_argument_values(
        &ctx.schema,
        &plan.definition,
        &field,
        &ctx.variable_values,
    ) {
        Ok(arguments) => {
            let resolver = plan
                .definition
                .resolver
                .as_ref()
                .or(object_type.resolve_field.as_ref())
                .unwrap_or(&ctx.field_resolver);
            let info = plan.info(ctx, &path);
            ctx.guard(&path, location, || {
                resolver(object_value, &arguments, &ctx.context_value, &info)
            })
        }
        Err(error) => {
            ctx.field_error(&path, location, error.message);
            None
        }
    };
    let completed = match resolved {
        Some(Ok(value)) => complete_value(ctx, &plan, path, &plan.definition.ty, value),
        Some(Err(error)) => {
            ctx.resolver_error(&path, location, error);
            Promise::fulfilled(Err(PropagateNull))
        }
        // Error already recorded
        None => Promise::fulfilled(Err(PropagateNull)),
    };
    ctx.adapter.then(
        completed,
        move |result| Promise::fulfilled(try_nullify(&plan.definition.ty, result).map(Some)),
        None,
    )
}

/// Try to insert a propagated null if possible, or keep propagating it.
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
pub(crate) fn try_nullify(ty: &Type, result: Completed) -> Completed {
    match result {
        Ok(json) => Ok(json),
        Err(PropagateNull) => {
            if ty.is_non_null() {
                Err(PropagateNull)
            } else {
                Ok(JsonValue::Null)
            }
        }
    }
}

struct DisplayPath<'a>(&'a LinkedPath);

impl std::fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, element) in self.0.to_vec().iter().enumerate() {
            if index > 0 {
                f.write_str(".")?
            }
            write!(f, "{element}")?
        }
        Ok(())
    }
}
