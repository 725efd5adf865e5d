use crate::common::ada;
use crate::common::blog_schema;
use crate::common::json_map;
use crate::common::parse;
use apollo_executor::executable::Selection;
use apollo_executor::execution::QueryComplexity;
use apollo_executor::response::GraphQLError;
use apollo_executor::response::GraphQLLocation;
use apollo_executor::ExecutableDocument;
use apollo_executor::Execution;
use apollo_executor::ExecutionResult;
use apollo_executor::JsonMap;
use apollo_executor::Schema;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

fn compact(result: &ExecutionResult) -> String {
    serde_json::to_string(result).unwrap()
}

#[test]
fn operation_selection() {
    let schema = blog_schema();
    let document = parse("query A { user { name } } query B { viewer { name } }");

    let result = Execution::new(&schema, &document).execute_sync().unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"Must provide operation name if query contains multiple operations."}]}"#
    );

    let result = Execution::new(&schema, &document)
        .operation_name("C")
        .execute_sync()
        .unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"Unknown operation named \"C\"."}]}"#
    );

    let result = Execution::new(&schema, &document)
        .operation_name("A")
        .root_value(ada())
        .execute_sync()
        .unwrap();
    assert_eq!(compact(&result), r#"{"data":{"user":{"name":"Ada"}}}"#);

    let document = parse("fragment F on Query { user { name } }");
    let result = Execution::new(&schema, &document).execute_sync().unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"Must provide an operation."}]}"#
    );
}

#[test]
fn missing_root_operation_type() {
    let document = parse("mutation { like }");
    let result = Execution::new(&blog_schema(), &document)
        .execute_sync()
        .unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"Schema is not configured to execute mutation operation.","locations":[{"line":1,"column":1}]}]}"#
    );
}

#[test]
fn invalid_variables_prevent_execution() {
    let document = parse("query Q($id: ID!, $age: Int) { user { name } }");
    let result = Execution::new(&blog_schema(), &document)
        .root_value(ada())
        .variable_values(json_map(json!({"age": "old"})))
        .execute_sync()
        .unwrap();
    assert!(result.data.is_absent());
    let messages: Vec<_> = result
        .errors
        .iter()
        .map(|error| error.message.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "Variable \"$id\" of required type \"ID!\" was not provided.",
            "Variable \"$age\" got invalid value \"old\"; \
             Int cannot represent non-integer value: \"old\"",
        ]
    );
    assert_eq!(
        result.errors[0].locations,
        [GraphQLLocation {
            line: 1,
            column: 9
        }]
    );
}

#[test]
fn validation_errors_are_returned_as_is() {
    let document = parse("{ nope }");
    let error = GraphQLError::new("Cannot query field \"nope\" on type \"Query\".").with_location(
        Some(GraphQLLocation {
            line: 1,
            column: 3,
        }),
    );
    let result = Execution::new(&blog_schema(), &document)
        .validation_errors(vec![error])
        .execute_sync()
        .unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"Cannot query field \"nope\" on type \"Query\".","locations":[{"line":1,"column":3}]}]}"#
    );
}

#[test]
fn query_complexity_limit() {
    let schema = blog_schema();
    let document = parse("{ user { name age } }");

    let result = Execution::new(&schema, &document)
        .root_value(ada())
        .validation_rule(QueryComplexity::new(2))
        .execute_sync()
        .unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"Max query complexity should be 2 but got 3.","locations":[{"line":1,"column":1}]}]}"#
    );

    let result = Execution::new(&schema, &document)
        .root_value(ada())
        .validation_rule(QueryComplexity::new(3))
        .execute_sync()
        .unwrap();
    assert_eq!(compact(&result), r#"{"data":{"user":{"name":"Ada","age":36}}}"#);

    let result = Execution::new(&schema, &document)
        .root_value(ada())
        .validation_rule(QueryComplexity::new(0))
        .execute_sync()
        .unwrap();
    assert!(result.errors.is_empty());
}

#[test]
fn custom_validation_rule() {
    let no_viewer = |_: &Schema, document: &ExecutableDocument, _: &JsonMap| {
        let uses_viewer = document.operations.iter().any(|operation| {
            operation.selection_set.iter().any(|selection| {
                matches!(selection, Selection::Field(field) if field.name == "viewer")
            })
        });
        if uses_viewer {
            vec![GraphQLError::new("viewer is disabled")]
        } else {
            Vec::new()
        }
    };
    let schema = blog_schema();

    let document = parse("{ viewer { name } }");
    let result = Execution::new(&schema, &document)
        .validation_rule(no_viewer)
        .execute_sync()
        .unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"viewer is disabled"}]}"#
    );

    let document = parse("{ user { name } }");
    let result = Execution::new(&schema, &document)
        .validation_rule(no_viewer)
        .root_value(ada())
        .execute_sync()
        .unwrap();
    assert_eq!(compact(&result), r#"{"data":{"user":{"name":"Ada"}}}"#);
}
