//! Built-in scalars: `Int`, `Float`, `String`, `Boolean`, and `ID`
//!
//! Result coercion is lenient where no information is lost (numeric strings, booleans),
//! input coercion is strict.

use crate::executable::Value;
use crate::schema::CoercionError;
use crate::schema::NamedType;
use crate::schema::ScalarType;
use crate::JsonValue;
use std::sync::Arc;
use std::sync::OnceLock;

pub(crate) const STANDARD_SCALAR_NAMES: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

macro_rules! coercion_error {
    ($($arg: tt)+) => {
        return Err(CoercionError::new(format!($($arg)+)))
    };
}

macro_rules! standard_scalar {
    ($fn_name: ident, $cell: ident, $build: ident) => {
        static $cell: OnceLock<Arc<ScalarType>> = OnceLock::new();

        impl ScalarType {
            /// The shared instance of this built-in scalar, registered in every schema
            pub fn $fn_name() -> Arc<ScalarType> {
                $cell.get_or_init(|| Arc::new($build())).clone()
            }
        }
    };
}

standard_scalar!(int, INT, int_type);
standard_scalar!(float, FLOAT, float_type);
standard_scalar!(string, STRING, string_type);
standard_scalar!(boolean, BOOLEAN, boolean_type);
standard_scalar!(id, ID, id_type);

/// Built-in scalars in registration order
pub(crate) fn standard_types() -> [NamedType; 5] {
    [
        NamedType::Scalar(ScalarType::int()),
        NamedType::Scalar(ScalarType::float()),
        NamedType::Scalar(ScalarType::string()),
        NamedType::Scalar(ScalarType::boolean()),
        NamedType::Scalar(ScalarType::id()),
    ]
}

pub(crate) fn is_standard_scalar(name: &str) -> bool {
    STANDARD_SCALAR_NAMES.contains(&name)
}

fn int_type() -> ScalarType {
    ScalarType::new("Int")
        .description(
            "The `Int` scalar type represents non-fractional signed whole numeric values. \
             Int can represent values between -(2^31) and 2^31 - 1.",
        )
        .with_serialize(|value| {
            let float = match value {
                JsonValue::Bool(b) => return Ok(JsonValue::from(i32::from(*b))),
                JsonValue::Number(_) => value.as_f64(),
                JsonValue::String(s) if !s.as_str().trim().is_empty() => {
                    s.as_str().trim().parse::<f64>().ok()
                }
                _ => None,
            };
            let Some(float) = float.filter(|f| f.is_finite() && f.fract() == 0.0) else {
                coercion_error!("Int cannot represent non-integer value: {value}")
            };
            int_in_range(float, value)
        })
        .with_parse_value(|value| {
            if let Some(int) = value.as_i64() {
                return int_in_range(int as f64, value);
            }
            match value.as_f64() {
                Some(float) if float.fract() == 0.0 => int_in_range(float, value),
                _ => coercion_error!("Int cannot represent non-integer value: {value}"),
            }
        })
        .with_parse_literal(|literal, _variables| {
            if let Value::Int(int) = literal {
                if let Some(int) = int.try_to_i32() {
                    return Ok(int.into());
                }
                coercion_error!("Int cannot represent non 32-bit signed integer value: {literal}")
            }
            coercion_error!("Int cannot represent non-integer value: {literal}")
        })
}

fn int_in_range(float: f64, original: &JsonValue) -> Result<JsonValue, CoercionError> {
    if float < f64::from(i32::MIN) || float > f64::from(i32::MAX) {
        coercion_error!("Int cannot represent non 32-bit signed integer value: {original}")
    }
    Ok(JsonValue::from(float as i32))
}

fn float_type() -> ScalarType {
    ScalarType::new("Float")
        .description(
            "The `Float` scalar type represents signed double-precision fractional values \
             as specified by [IEEE 754](http://en.wikipedia.org/wiki/IEEE_floating_point).",
        )
        .with_serialize(|value| {
            let float = match value {
                JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                JsonValue::Number(_) => value.as_f64(),
                JsonValue::String(s) if !s.as_str().trim().is_empty() => {
                    s.as_str().trim().parse::<f64>().ok()
                }
                _ => None,
            };
            match float.filter(|f| f.is_finite()) {
                Some(float) => Ok(JsonValue::from(float)),
                None => coercion_error!("Float cannot represent non numeric value: {value}"),
            }
        })
        .with_parse_value(|value| match value.as_f64() {
            Some(float) if value.is_number() && float.is_finite() => Ok(JsonValue::from(float)),
            _ => coercion_error!("Float cannot represent non numeric value: {value}"),
        })
        .with_parse_literal(|literal, _variables| {
            let float = match literal {
                Value::Float(float) => float.try_to_f64(),
                Value::Int(int) => int.try_to_f64(),
                _ => None,
            };
            match float {
                Some(float) => Ok(JsonValue::from(float)),
                None => coercion_error!("Float cannot represent non numeric value: {literal}"),
            }
        })
}

fn string_type() -> ScalarType {
    ScalarType::new("String")
        .description(
            "The `String` scalar type represents textual data, represented as UTF-8 \
             character sequences. The String type is most often used by GraphQL to \
             represent free-form human-readable text.",
        )
        .with_serialize(|value| match value {
            JsonValue::String(_) => Ok(value.clone()),
            JsonValue::Bool(b) => Ok(JsonValue::from(if *b { "true" } else { "false" })),
            JsonValue::Number(number) => Ok(JsonValue::from(number.to_string())),
            _ => coercion_error!("String cannot represent value: {value}"),
        })
        .with_parse_value(|value| match value {
            JsonValue::String(_) => Ok(value.clone()),
            _ => coercion_error!("String cannot represent a non string value: {value}"),
        })
        .with_parse_literal(|literal, _variables| match literal {
            Value::String(s) => Ok(JsonValue::from(s.as_str())),
            _ => coercion_error!("String cannot represent a non string value: {literal}"),
        })
}

fn boolean_type() -> ScalarType {
    ScalarType::new("Boolean")
        .description("The `Boolean` scalar type represents `true` or `false`.")
        .with_serialize(|value| match value {
            JsonValue::Bool(_) => Ok(value.clone()),
            JsonValue::Number(_) => match value.as_f64() {
                Some(float) if float.is_finite() => Ok(JsonValue::Bool(float != 0.0)),
                _ => coercion_error!("Boolean cannot represent a non boolean value: {value}"),
            },
            _ => coercion_error!("Boolean cannot represent a non boolean value: {value}"),
        })
        .with_parse_value(|value| match value {
            JsonValue::Bool(_) => Ok(value.clone()),
            _ => coercion_error!("Boolean cannot represent a non boolean value: {value}"),
        })
        .with_parse_literal(|literal, _variables| match literal {
            Value::Boolean(b) => Ok(JsonValue::Bool(*b)),
            _ => coercion_error!("Boolean cannot represent a non boolean value: {literal}"),
        })
}

fn id_type() -> ScalarType {
    ScalarType::new("ID")
        .description(
            "The `ID` scalar type represents a unique identifier, often used to \
             refetch an object or as key for a cache. The ID type appears in a JSON \
             response as a String; however, it is not intended to be human-readable. \
             When expected as an input type, any string (such as `\"4\"`) or integer \
             (such as `4`) input value will be accepted as an ID.",
        )
        .with_serialize(|value| match value {
            JsonValue::String(_) => Ok(value.clone()),
            JsonValue::Number(_) if value.is_i64() || value.is_u64() => {
                Ok(JsonValue::from(value.to_string()))
            }
            _ => coercion_error!("ID cannot represent value: {value}"),
        })
        .with_parse_value(|value| match value {
            JsonValue::String(_) => Ok(value.clone()),
            JsonValue::Number(_) if value.is_i64() || value.is_u64() => {
                Ok(JsonValue::from(value.to_string()))
            }
            _ => coercion_error!("ID cannot represent a non-string and non-integer value: {value}"),
        })
        .with_parse_literal(|literal, _variables| match literal {
            Value::String(s) => Ok(JsonValue::from(s.as_str())),
            Value::Int(int) => Ok(JsonValue::from(int.as_str())),
            _ => coercion_error!(
                "ID cannot represent a non-string and non-integer value: {literal}"
            ),
        })
}
