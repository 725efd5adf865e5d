use crate::execution::ContextValue;
use crate::execution::FieldError;
use crate::execution::FieldValue;
use crate::execution::ResolveInfo;
use crate::JsonMap;
use crate::JsonValue;
use crate::Name;

/// Used for fields without a resolver when neither the field, its parent type,
/// nor the [`Execution`][crate::Execution] configures one.
///
/// * For a JSON object parent, returns the entry keyed by the field name, or null.
/// * For an [`ObjectValue`][crate::execution::ObjectValue] parent,
///   delegates to its [`resolve_field`][crate::execution::ObjectValue::resolve_field] method.
/// * Anything else resolves to null.
pub fn default_field_resolver(
    parent: &FieldValue,
    arguments: &JsonMap,
    context: &ContextValue,
    info: &ResolveInfo<'_>,
) -> Result<FieldValue, FieldError> {
    match parent {
        FieldValue::Json(JsonValue::Object(map)) => Ok(map
            .get(info.field_name.as_str())
            .cloned()
            .map_or_else(FieldValue::null, FieldValue::Json)),
        FieldValue::Object(object) => object.resolve_field(info, arguments, context),
        _ => Ok(FieldValue::null()),
    }
}

/// Used for interfaces and unions without a type resolver.
///
/// Tries in order:
///
/// * A string `__typename` entry of a JSON object value
/// * [`ObjectValue::type_name`][crate::execution::ObjectValue::type_name]
/// * The first possible type whose `is_type_of` function accepts the value
pub fn default_type_resolver(
    value: &FieldValue,
    context: &ContextValue,
    info: &ResolveInfo<'_>,
) -> Option<Name> {
    let declared = match value {
        FieldValue::Json(JsonValue::Object(map)) => map
            .get("__typename")
            .and_then(JsonValue::as_str)
            .map(Name::from),
        FieldValue::Object(object) => object.type_name().map(Name::from),
        _ => None,
    };
    if declared.is_some() {
        return declared;
    }
    let abstract_type = info.return_type.inner_named_type();
    info.schema
        .possible_types(abstract_type)
        .iter()
        .find(|object| {
            object
                .is_type_of
                .as_ref()
                .is_some_and(|is_type_of| is_type_of(value, context, info))
        })
        .map(|object| object.name.clone())
}
