use crate::executable::Field;
use crate::executable::Operation;
use crate::executable::Value;
use crate::response::GraphQLError;
use crate::schema::CoercionError;
use crate::schema::FieldDefinition;
use crate::schema::NamedType;
use crate::schema::Schema;
use crate::schema::Type;
use crate::JsonMap;
use crate::JsonValue;

macro_rules! coercion_error {
    ($($arg: tt)+) => {
        return Err(CoercionError::new(format!($($arg)+)))
    };
}

/// A problem found somewhere inside a variable value
struct InputError {
    /// Like `.field[2]`, relative to the variable
    path: String,
    value: JsonValue,
    message: String,
}

/// Coerce the values of variables from a GraphQL request to the types expected by the operation.
///
/// If type coercion fails, request errors are returned and the request must not be executed.
/// Every invalid variable gets its own error.
///
/// This is [CoerceVariableValues()](https://spec.graphql.org/October2021/#CoerceVariableValues())
/// in the GraphQL specification.
pub fn coerce_variable_values(
    schema: &Schema,
    operation: &Operation,
    values: &JsonMap,
) -> Result<JsonMap, Vec<GraphQLError>> {
    let mut coerced_values = JsonMap::new();
    let mut errors = Vec::new();
    for variable_def in &operation.variables {
        let name = variable_def.name.as_str();
        let ty = &variable_def.ty;
        let location = variable_def.location();
        if !schema
            .named_type(ty)
            .is_some_and(|ty_def| ty_def.is_input_type())
        {
            errors.push(
                GraphQLError::new(format!(
                    "Variable \"${name}\" expected value of type \"{ty}\" \
                     which cannot be used as an input type."
                ))
                .with_location(location),
            );
            continue;
        }
        let Some(value) = values.get(name) else {
            if let Some(default) = &variable_def.default_value {
                match value_from_literal(schema, default, ty, &JsonMap::new()) {
                    Some(value) => {
                        coerced_values.insert(name, value);
                    }
                    None => errors.push(
                        GraphQLError::new(format!(
                            "Variable \"${name}\" has invalid default value {}.",
                            **default
                        ))
                        .with_location(location),
                    ),
                }
            } else if ty.is_non_null() {
                errors.push(
                    GraphQLError::new(format!(
                        "Variable \"${name}\" of required type \"{ty}\" was not provided."
                    ))
                    .with_location(location),
                )
            } else {
                // Nullable and not provided: absent, which differs from an explicit null
            }
            continue;
        };
        if value.is_null() && ty.is_non_null() {
            errors.push(
                GraphQLError::new(format!(
                    "Variable \"${name}\" of non-null type \"{ty}\" must not be null."
                ))
                .with_location(location),
            );
            continue;
        }
        let mut input_errors = Vec::new();
        match coerce_input_value(schema, value, ty, &mut String::new(), &mut input_errors) {
            Some(value) if input_errors.is_empty() => {
                coerced_values.insert(name, value);
            }
            _ => errors.extend(input_errors.into_iter().map(|error| {
                let at = if error.path.is_empty() {
                    String::new()
                } else {
                    format!(" at \"{name}{}\"", error.path)
                };
                GraphQLError::new(format!(
                    "Variable \"${name}\" got invalid value {}{at}; {}",
                    error.value, error.message
                ))
                .with_location(location)
            })),
        }
    }
    if errors.is_empty() {
        Ok(coerced_values)
    } else {
        Err(errors)
    }
}

/// <https://spec.graphql.org/October2021/#sec-Input-Values>
///
/// Returns `None` if any error was pushed.
fn coerce_input_value(
    schema: &Schema,
    value: &JsonValue,
    ty: &Type,
    path: &mut String,
    errors: &mut Vec<InputError>,
) -> Option<JsonValue> {
    if value.is_null() {
        if ty.is_non_null() {
            let message = format!("Expected non-nullable type \"{ty}\" not to be null.");
            push_error(errors, path, value, message);
            return None;
        }
        return Some(JsonValue::Null);
    }
    if let Some(item_type) = ty.item_type() {
        // https://spec.graphql.org/October2021/#sec-List.Input-Coercion
        let Some(items) = value.as_array() else {
            // Not a list: treat the value as a list of size one
            return coerce_input_value(schema, value, item_type, path, errors)
                .map(|item| JsonValue::Array(vec![item]));
        };
        let mut coerced = Some(Vec::with_capacity(items.len()));
        for (index, item) in items.iter().enumerate() {
            let len = path.len();
            path.push_str(&format!("[{index}]"));
            let item = coerce_input_value(schema, item, item_type, path, errors);
            path.truncate(len);
            match (&mut coerced, item) {
                (Some(coerced), Some(item)) => coerced.push(item),
                _ => coerced = None,
            }
        }
        return coerced.map(JsonValue::Array);
    }
    let ty_name = ty.inner_named_type();
    match schema.named_type(ty) {
        Some(NamedType::Scalar(def)) => match def.parse_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                push_error(errors, path, value, err.message);
                None
            }
        },
        Some(NamedType::Enum(def)) => match def.parse_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                push_error(errors, path, value, err.message);
                None
            }
        },
        Some(NamedType::InputObject(def)) => {
            // https://spec.graphql.org/October2021/#sec-Input-Objects.Input-Coercion
            let Some(object) = value.as_object() else {
                let message = format!("Expected type \"{ty_name}\" to be an object.");
                push_error(errors, path, value, message);
                return None;
            };
            let mut valid = true;
            let mut coerced = JsonMap::new();
            for (field_name, field_def) in def.fields().iter() {
                match object.get(field_name.as_str()) {
                    Some(field_value) => {
                        let len = path.len();
                        path.push('.');
                        path.push_str(field_name);
                        let field_value =
                            coerce_input_value(schema, field_value, &field_def.ty, path, errors);
                        path.truncate(len);
                        match field_value {
                            Some(field_value) => {
                                coerced.insert(field_name.as_str(), field_value);
                            }
                            None => valid = false,
                        }
                    }
                    None => {
                        if let Some(default) = &field_def.default_value {
                            coerced.insert(field_name.as_str(), default.clone());
                        } else if field_def.ty.is_non_null() {
                            push_error(
                                errors,
                                path,
                                value,
                                format!(
                                    "Field \"{field_name}\" of required type \"{}\" \
                                     was not provided.",
                                    field_def.ty
                                ),
                            );
                            valid = false;
                        }
                    }
                }
            }
            for key in object.keys() {
                if !def.fields().contains_key(key.as_str()) {
                    push_error(
                        errors,
                        path,
                        value,
                        format!(
                            "Field \"{}\" is not defined by type \"{ty_name}\".",
                            key.as_str()
                        ),
                    );
                    valid = false;
                }
            }
            valid.then(|| coerced.into())
        }
        _ => {
            let message = format!("Expected type \"{ty_name}\" to be an input type.");
            push_error(errors, path, value, message);
            None
        }
    }
}

fn push_error(errors: &mut Vec<InputError>, path: &str, value: &JsonValue, message: String) {
    errors.push(InputError {
        path: path.to_owned(),
        value: value.clone(),
        message,
    })
}

/// Coerce the arguments of a field from literals and coerced variable values.
///
/// <https://spec.graphql.org/October2021/#CoerceArgumentValues()>
pub(crate) fn coerce_argument_values(
    schema: &Schema,
    field_def: &FieldDefinition,
    field: &Field,
    variable_values: &JsonMap,
) -> Result<JsonMap, CoercionError> {
    let mut coerced_values = JsonMap::new();
    for arg_def in &field_def.arguments {
        let name = arg_def.name.as_str();
        let ty = &arg_def.ty;
        let Some(literal) = field.argument_by_name(name) else {
            if let Some(default) = &arg_def.default_value {
                coerced_values.insert(name, default.clone());
            } else if ty.is_non_null() {
                coercion_error!("Argument \"{name}\" of required type \"{ty}\" was not provided.")
            }
            continue;
        };
        if let Value::Variable(variable) = &**literal {
            match variable_values.get(variable.as_str()) {
                Some(value) if value.is_null() && ty.is_non_null() => {
                    coercion_error!("Argument \"{name}\" of non-null type \"{ty}\" must not be null.")
                }
                Some(value) => {
                    coerced_values.insert(name, value.clone());
                }
                None => {
                    if let Some(default) = &arg_def.default_value {
                        coerced_values.insert(name, default.clone());
                    } else if ty.is_non_null() {
                        coercion_error!(
                            "Argument \"{name}\" of required type \"{ty}\" was provided \
                             the variable \"${variable}\" which was not provided a runtime value."
                        )
                    }
                }
            }
            continue;
        }
        if literal.is_null() && ty.is_non_null() {
            coercion_error!("Argument \"{name}\" of non-null type \"{ty}\" must not be null.")
        }
        match value_from_literal(schema, literal, ty, variable_values) {
            Some(value) => {
                coerced_values.insert(name, value);
            }
            None => coercion_error!("Argument \"{name}\" has invalid value {}.", **literal),
        }
    }
    Ok(coerced_values)
}

/// Convert a literal to the internal representation of `ty`.
///
/// `None` means the literal is invalid for the type.
fn value_from_literal(
    schema: &Schema,
    literal: &Value,
    ty: &Type,
    variables: &JsonMap,
) -> Option<JsonValue> {
    if let Value::Variable(variable) = literal {
        // Missing variables are handled by callers
        let value = variables.get(variable.as_str())?;
        if value.is_null() && ty.is_non_null() {
            return None;
        }
        return Some(value.clone());
    }
    if literal.is_null() {
        return (!ty.is_non_null()).then_some(JsonValue::Null);
    }
    if let Some(item_type) = ty.item_type() {
        let Value::List(items) = literal else {
            return value_from_literal(schema, literal, item_type, variables)
                .map(|item| JsonValue::Array(vec![item]));
        };
        return items
            .iter()
            .map(|item| {
                if is_missing_variable(item, variables) {
                    // A list item can not be absent: use null instead
                    return (!item_type.is_non_null()).then_some(JsonValue::Null);
                }
                value_from_literal(schema, item, item_type, variables)
            })
            .collect::<Option<Vec<_>>>()
            .map(JsonValue::Array);
    }
    match schema.named_type(ty)? {
        NamedType::Scalar(def) => def.parse_literal(literal, variables).ok(),
        NamedType::Enum(def) => def.parse_literal(literal).ok(),
        NamedType::InputObject(def) => {
            let Value::Object(fields) = literal else {
                return None;
            };
            if fields
                .iter()
                .any(|(name, _)| !def.fields().contains_key(name))
            {
                return None;
            }
            let mut coerced = JsonMap::new();
            for (field_name, field_def) in def.fields().iter() {
                let field_literal = fields
                    .iter()
                    .find(|(name, _)| name == field_name)
                    .map(|(_, value)| value)
                    .filter(|value| !is_missing_variable(value, variables));
                match field_literal {
                    Some(value) => {
                        let value = value_from_literal(schema, value, &field_def.ty, variables)?;
                        coerced.insert(field_name.as_str(), value);
                    }
                    None => {
                        if let Some(default) = &field_def.default_value {
                            coerced.insert(field_name.as_str(), default.clone());
                        } else if field_def.ty.is_non_null() {
                            return None;
                        }
                    }
                }
            }
            Some(coerced.into())
        }
        _ => None,
    }
}

fn is_missing_variable(value: &Value, variables: &JsonMap) -> bool {
    value
        .as_variable()
        .is_some_and(|variable| !variables.contains_key(variable.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDefinition;
    use crate::schema::InputObjectType;
    use crate::schema::InputValueDefinition;
    use crate::schema::ObjectType;
    use crate::schema::SchemaConfig;
    use crate::ExecutableDocument;
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    fn schema() -> Schema {
        let filter = InputObjectType::new("Filter")
            .field(InputValueDefinition::new("term", Type::named("String").non_null()))
            .field(InputValueDefinition::new("limit", Type::named("Int")).default_value(10));
        let query = ObjectType::new("Query").field(
            FieldDefinition::new("search", Type::named("String").list())
                .argument(InputValueDefinition::new("filter", Type::named("Filter")))
                .argument(InputValueDefinition::new("ids", Type::named("ID").list()))
                .argument(
                    InputValueDefinition::new("first", Type::named("Int").non_null())
                        .default_value(5),
                ),
        );
        Schema::new(SchemaConfig::new().query(query).types([filter]))
    }

    fn variables(source: &str, values: JsonMap) -> Result<JsonMap, Vec<String>> {
        let schema = schema();
        let document = ExecutableDocument::parse(source).unwrap();
        let operation = document.get_operation(None).unwrap();
        coerce_variable_values(&schema, operation, &values)
            .map_err(|errors| errors.into_iter().map(|error| error.message).collect())
    }

    fn object(value: JsonValue) -> JsonMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn variable_defaults_and_promotion() {
        let coerced = variables(
            "query($f: Filter, $ids: [ID] = 7, $absent: Int) { search }",
            object(json!({"f": {"term": "rust"}})),
        )
        .unwrap();
        assert_eq!(
            JsonValue::Object(coerced),
            json!({"f": {"term": "rust", "limit": 10}, "ids": ["7"]})
        );
    }

    #[test]
    fn variable_errors() {
        let errors = variables(
            "query($a: Int!, $b: Int!, $c: Int, $d: Filter, $e: Query) { search }",
            object(json!({"b": null, "c": "three", "d": {"limit": 1, "extra": true}})),
        )
        .unwrap_err();
        assert_eq!(
            errors,
            [
                "Variable \"$a\" of required type \"Int!\" was not provided.",
                "Variable \"$b\" of non-null type \"Int!\" must not be null.",
                "Variable \"$c\" got invalid value \"three\"; \
                 Int cannot represent non-integer value: \"three\"",
                "Variable \"$d\" got invalid value {\"limit\":1,\"extra\":true}; \
                 Field \"term\" of required type \"String!\" was not provided.",
                "Variable \"$d\" got invalid value {\"limit\":1,\"extra\":true}; \
                 Field \"extra\" is not defined by type \"Filter\".",
                "Variable \"$e\" expected value of type \"Query\" \
                 which cannot be used as an input type.",
            ]
        );
    }

    #[test]
    fn nested_variable_error_path() {
        let errors = variables(
            "query($ids: [Int]) { search }",
            object(json!({"ids": [1, true]})),
        )
        .unwrap_err();
        assert_eq!(
            errors,
            ["Variable \"$ids\" got invalid value true at \"ids[1]\"; \
              Int cannot represent non-integer value: true"]
        );
    }

    fn arguments(source: &str, variable_values: JsonValue) -> Result<JsonMap, String> {
        let schema = schema();
        let document = ExecutableDocument::parse(source).unwrap();
        let operation = document.get_operation(None).unwrap();
        let crate::executable::Selection::Field(field) = &operation.selection_set[0] else {
            panic!("expected a field")
        };
        let query = schema.query_type().unwrap();
        let field_def = query.field_by_name("search").unwrap();
        coerce_argument_values(&schema, field_def, field, &object(variable_values))
            .map_err(|error| error.message)
    }

    #[test]
    fn argument_literals_and_variables() {
        let coerced = arguments(
            r#"query($ids: [ID]) { search(filter: {term: "a"}, ids: $ids, first: 2) }"#,
            json!({"ids": ["x"]}),
        )
        .unwrap();
        assert_eq!(
            JsonValue::Object(coerced),
            json!({"filter": {"term": "a", "limit": 10}, "ids": ["x"], "first": 2})
        );

        let coerced = arguments("{ search(ids: \"one\") }", json!({})).unwrap();
        assert_eq!(JsonValue::Object(coerced), json!({"ids": ["one"], "first": 5}));
    }

    #[test]
    fn argument_errors() {
        assert_eq!(
            arguments("{ search(first: null) }", json!({})).unwrap_err(),
            "Argument \"first\" of non-null type \"Int!\" must not be null."
        );
        assert_eq!(
            arguments("{ search(filter: {limit: 1}) }", json!({})).unwrap_err(),
            "Argument \"filter\" has invalid value {limit: 1}."
        );
        assert_eq!(
            arguments("query($n: Int!) { search(first: $n) }", json!({"n": null})).unwrap_err(),
            "Argument \"first\" of non-null type \"Int!\" must not be null."
        );
    }
}
