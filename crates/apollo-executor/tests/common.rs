use apollo_executor::response::DebugFlags;
use apollo_executor::schema::FieldDefinition;
use apollo_executor::schema::ObjectType;
use apollo_executor::schema::Type;
use apollo_executor::ExecutableDocument;
use apollo_executor::Execution;
use apollo_executor::ExecutionResult;
use apollo_executor::JsonMap;
use apollo_executor::JsonValue;
use apollo_executor::Schema;
use apollo_executor::SchemaConfig;
use tracing_subscriber::EnvFilter;

/// `User` and `Post` objects resolved from JSON by the default field resolver
pub(crate) fn blog_schema() -> Schema {
    let post = ObjectType::new("Post")
        .field(FieldDefinition::new("title", Type::named("String").non_null()))
        .field(FieldDefinition::new("likes", Type::named("Int")));
    let user = ObjectType::new("User")
        .field(FieldDefinition::new("name", Type::named("String").non_null()))
        .field(FieldDefinition::new("age", Type::named("Int")))
        .field(FieldDefinition::new(
            "posts",
            Type::named("Post").non_null().list(),
        ));
    let query = ObjectType::new("Query")
        .field(FieldDefinition::new("user", Type::named("User")))
        .field(FieldDefinition::new("viewer", Type::named("User").non_null()));
    Schema::new(SchemaConfig::new().query(query).types([user, post]))
}

pub(crate) fn ada() -> JsonValue {
    serde_json_bytes::json!({
        "user": {
            "name": "Ada",
            "age": 36,
            "posts": [
                {"title": "Notes", "likes": 3},
                {"title": "Engines"},
            ],
        },
    })
}

pub(crate) fn parse(source: &str) -> ExecutableDocument {
    ExecutableDocument::parse(source).unwrap()
}

pub(crate) fn json_map(value: JsonValue) -> JsonMap {
    match value {
        JsonValue::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

/// Print logs of the executor with `RUST_LOG=apollo_executor=trace`
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Execute synchronously with a JSON root value
pub(crate) fn run(schema: &Schema, source: &str, root_value: JsonValue) -> ExecutionResult {
    init_tracing();
    let document = parse(source);
    Execution::new(schema, &document)
        .root_value(root_value)
        .execute_sync()
        .unwrap()
}

/// The response as pretty JSON, with a trailing newline for snapshots
pub(crate) fn pretty(result: &ExecutionResult) -> String {
    let mut json = serde_json::to_string_pretty(result).unwrap();
    json.push('\n');
    json
}

pub(crate) fn pretty_debug(result: &ExecutionResult) -> String {
    let debug = DebugFlags {
        include_debug_message: true,
    };
    let mut json = serde_json::to_string_pretty(&result.to_json(debug)).unwrap();
    json.push('\n');
    json
}
