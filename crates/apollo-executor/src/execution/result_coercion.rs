use crate::execution::engine::execute_selection_set;
use crate::execution::engine::try_nullify;
use crate::execution::engine::Completed;
use crate::execution::engine::ExecutionContext;
use crate::execution::engine::ExecutionMode;
use crate::execution::engine::FieldPlan;
use crate::execution::engine::LinkedPath;
use crate::execution::engine::PropagateNull;
use crate::execution::resolver::default_type_resolver;
use crate::execution::FieldValue;
use crate::promise::OnRejected;
use crate::promise::Promise;
use crate::promise::PromiseAdapter;
use crate::response::PathElement;
use crate::schema::NamedType;
use crate::schema::ObjectType;
use crate::schema::Type;
use crate::JsonValue;
use std::sync::Arc;

macro_rules! field_error {
    ($ctx: expr, $path: expr, $plan: expr, $($arg: tt)+) => {{
        $ctx.field_error($path, $plan.location(), format!($($arg)+));
        return Promise::fulfilled(Err(PropagateNull));
    }};
}

/// <https://spec.graphql.org/October2021/#CompleteValue()>
///
/// Returns `Err` for a field error being propagated upwards to find a nullable place
pub(crate) fn complete_value<A: PromiseAdapter + 'static>(
    ctx: &Arc<ExecutionContext<A>>,
    plan: &Arc<FieldPlan>,
    path: LinkedPath,
    ty: &Type,
    value: FieldValue,
) -> Promise<Completed> {
    let value = match value {
        FieldValue::Future(thenable) => {
            let promise = ctx.adapter.convert_thenable(thenable);
            let on_rejected: OnRejected<Completed> = {
                let ctx = ctx.clone();
                let plan = plan.clone();
                let path = path.clone();
                Box::new(move |rejection| {
                    ctx.rejection(&path, plan.location(), rejection);
                    Promise::fulfilled(Err(PropagateNull))
                })
            };
            let field_ctx = ctx.clone();
            let plan = plan.clone();
            let ty = ty.clone();
            return ctx.adapter.then(
                promise,
                move |value| complete_value(&field_ctx, &plan, path, &ty, value),
                Some(on_rejected),
            );
        }
        value => value,
    };
    if value.is_null() {
        if ty.is_non_null() {
            field_error!(
                ctx,
                &path,
                plan,
                "Cannot return null for non-nullable field {}.",
                plan.coordinate()
            )
        }
        return Promise::fulfilled(Ok(JsonValue::Null));
    }
    if let Some(item_type) = ty.item_type() {
        let items: Vec<FieldValue> = match value {
            FieldValue::List(items) => items,
            FieldValue::Json(JsonValue::Array(items)) => {
                items.into_iter().map(FieldValue::Json).collect()
            }
            _ => field_error!(
                ctx,
                &path,
                plan,
                "Expected Iterable, but did not find one for field \"{}\".",
                plan.coordinate()
            ),
        };
        let promises = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let item_path = path.child(PathElement::ListIndex(index), index);
                complete_value(ctx, plan, item_path, item_type, item)
            })
            .collect();
        let item_type = item_type.clone();
        return ctx.adapter.then(
            ctx.adapter.all(promises),
            move |items| {
                // A null propagated from a non-null item nullifies the whole list
                let completed = items
                    .into_iter()
                    .map(|item| try_nullify(&item_type, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(JsonValue::Array);
                Promise::fulfilled(completed)
            },
            None,
        );
    }

    let ty_name = ty.inner_named_type();
    let Some(ty_def) = ctx.get_type(ty_name) else {
        field_error!(ctx, &path, plan, "Unknown type \"{ty_name}\".")
    };
    match &ty_def {
        NamedType::Scalar(def) => {
            let Some(json) = value.to_json() else {
                field_error!(
                    ctx,
                    &path,
                    plan,
                    "Expected a leaf value of type \"{ty_name}\" for field \"{}\", got {value:?}.",
                    plan.coordinate()
                )
            };
            match def.serialize(&json) {
                Ok(serialized) => Promise::fulfilled(Ok(serialized)),
                Err(error) => field_error!(ctx, &path, plan, "{}", error.message),
            }
        }
        NamedType::Enum(def) => {
            let Some(json) = value.to_json() else {
                field_error!(
                    ctx,
                    &path,
                    plan,
                    "Expected a leaf value of type \"{ty_name}\" for field \"{}\", got {value:?}.",
                    plan.coordinate()
                )
            };
            match def.serialize(&json) {
                Ok(serialized) => Promise::fulfilled(Ok(serialized)),
                Err(error) => field_error!(ctx, &path, plan, "{}", error.message),
            }
        }
        NamedType::InputObject(_) => field_error!(
            ctx,
            &path,
            plan,
            "Field \"{}\" has input object type \"{ty_name}\", which is not an output type.",
            plan.coordinate()
        ),
        NamedType::Object(object_type) => {
            complete_object_value(ctx, plan, path, object_type.clone(), value)
        }
        NamedType::Interface(_) | NamedType::Union(_) => {
            let resolve_type = match &ty_def {
                NamedType::Interface(def) => def.resolve_type.clone(),
                NamedType::Union(def) => def.resolve_type.clone(),
                _ => None,
            };
            let info = plan.info(ctx, &path);
            let Some(runtime_type) = ctx.guard(&path, plan.location(), || match &resolve_type {
                Some(resolve_type) => resolve_type(&value, &ctx.context_value, &info),
                None => default_type_resolver(&value, &ctx.context_value, &info),
            }) else {
                return Promise::fulfilled(Err(PropagateNull));
            };
            let Some(runtime_type) = runtime_type else {
                field_error!(
                    ctx,
                    &path,
                    plan,
                    "Abstract type \"{ty_name}\" must resolve to an Object type at runtime \
                     for field \"{}\". Either the \"{ty_name}\" type should provide \
                     a \"resolveType\" function or each possible type should provide \
                     an \"isTypeOf\" function.",
                    plan.coordinate()
                )
            };
            match ctx.get_type(&runtime_type) {
                Some(NamedType::Object(object_type)) => {
                    if !ctx.schema.is_possible_type(&ty_def, &object_type) {
                        field_error!(
                            ctx,
                            &path,
                            plan,
                            "Runtime Object type \"{runtime_type}\" is not a possible type \
                             for \"{ty_name}\"."
                        )
                    }
                    complete_object_value(ctx, plan, path, object_type, value)
                }
                Some(_) => field_error!(
                    ctx,
                    &path,
                    plan,
                    "Abstract type \"{ty_name}\" must resolve to an Object type at runtime \
                     for field \"{}\". Received \"{runtime_type}\".",
                    plan.coordinate()
                ),
                None => field_error!(
                    ctx,
                    &path,
                    plan,
                    "Abstract type \"{ty_name}\" was resolved to a type \"{runtime_type}\" \
                     that does not exist inside the schema."
                ),
            }
        }
    }
}

fn complete_object_value<A: PromiseAdapter + 'static>(
    ctx: &Arc<ExecutionContext<A>>,
    plan: &Arc<FieldPlan>,
    path: LinkedPath,
    object_type: Arc<ObjectType>,
    value: FieldValue,
) -> Promise<Completed> {
    if !matches!(
        value,
        FieldValue::Object(_) | FieldValue::Json(JsonValue::Object(_))
    ) {
        field_error!(
            ctx,
            &path,
            plan,
            "Expected value of type \"{}\" but got: {}.",
            object_type.name,
            describe(&value)
        )
    }
    if let Some(is_type_of) = &object_type.is_type_of {
        let info = plan.info(ctx, &path);
        match ctx.guard(&path, plan.location(), || {
            is_type_of(&value, &ctx.context_value, &info)
        }) {
            Some(true) => {}
            Some(false) => field_error!(
                ctx,
                &path,
                plan,
                "Expected value of type \"{}\" but got: {}.",
                object_type.name,
                describe(&value)
            ),
            None => return Promise::fulfilled(Err(PropagateNull)),
        }
    }
    let selections: Vec<_> = plan
        .fields
        .iter()
        .flat_map(|field| field.selection_set.iter().cloned())
        .collect();
    let promise = execute_selection_set(
        ctx,
        &path,
        ExecutionMode::Normal,
        &object_type,
        Arc::new(value),
        &selections,
    );
    ctx.adapter.then(
        promise,
        |response_map| Promise::fulfilled(response_map.map(JsonValue::Object)),
        None,
    )
}

fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::Json(json) => json.to_string(),
        FieldValue::List(_) => "a list".to_owned(),
        FieldValue::Object(object) => match object.type_name() {
            Some(name) => format!("an object of type \"{name}\""),
            None => "an object".to_owned(),
        },
        FieldValue::Future(_) => "a future".to_owned(),
    }
}
