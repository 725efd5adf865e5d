use crate::common::blog_schema;
use crate::common::parse;
use apollo_executor::execution::ContextValue;
use apollo_executor::execution::ExecutionError;
use apollo_executor::execution::FieldError;
use apollo_executor::execution::FieldValue;
use apollo_executor::promise::PromiseAdapter;
use apollo_executor::promise::PromiseError;
use apollo_executor::promise::Settle;
use apollo_executor::promise::SyncPromiseAdapter;
use apollo_executor::schema::FieldDefinition;
use apollo_executor::schema::InputValueDefinition;
use apollo_executor::schema::ObjectType;
use apollo_executor::schema::Type;
use apollo_executor::Execution;
use apollo_executor::ExecutionResult;
use apollo_executor::Schema;
use apollo_executor::SchemaConfig;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

fn compact(result: &ExecutionResult) -> String {
    serde_json::to_string(result).unwrap()
}

type Log = Arc<Mutex<Vec<String>>>;

/// A resolver for a `String` field that completes after `delay`
fn delayed(
    log: &Log,
    name: &'static str,
    delay: Duration,
    outcome: Result<&'static str, &'static str>,
) -> FieldDefinition {
    let log = log.clone();
    FieldDefinition::new(name, Type::named("String")).resolve(move |_, _, _, _| {
        log.lock().push(format!("{name} start"));
        let log = log.clone();
        Ok(FieldValue::future(async move {
            tokio::time::sleep(delay).await;
            log.lock().push(format!("{name} end"));
            outcome.map(FieldValue::from).map_err(FieldError::from)
        }))
    })
}

/// Loads posts by id, in batches of every id requested before the first deferred task runs
struct PostLoader {
    adapter: SyncPromiseAdapter,
    pending: Arc<Mutex<Vec<(i64, Settle<FieldValue>)>>>,
    batches: Arc<Mutex<Vec<Vec<i64>>>>,
}

impl PostLoader {
    fn load(&self, id: i64) -> impl Future<Output = Result<FieldValue, FieldError>> + Send {
        let promise = self.adapter.create(|settle| {
            let mut pending = self.pending.lock();
            pending.push((id, settle));
            if pending.len() == 1 {
                let pending = self.pending.clone();
                let batches = self.batches.clone();
                self.adapter.defer(move || {
                    let batch = std::mem::take(&mut *pending.lock());
                    batches
                        .lock()
                        .push(batch.iter().map(|(id, _)| *id).collect());
                    for (id, settle) in batch {
                        settle.resolve(json!({"title": format!("Post {id}")}).into())
                    }
                })
            }
        });
        async move {
            promise
                .await
                .map_err(|rejection| FieldError::new(rejection.to_string()))
        }
    }
}

#[test]
fn deferred_batch_loading() {
    let post = ObjectType::new("Post").field(FieldDefinition::new("title", Type::named("String")));
    let query = ObjectType::new("Query").field(
        FieldDefinition::new("post", Type::named("Post"))
            .argument(InputValueDefinition::new("id", Type::named("Int").non_null()))
            .resolve(|_, args, context, _| {
                let loader = context
                    .get::<PostLoader>()
                    .ok_or("missing post loader")?;
                let id = args
                    .get("id")
                    .and_then(|id| id.as_i64())
                    .ok_or("missing id")?;
                Ok(FieldValue::future(loader.load(id)))
            }),
    );
    let schema = Schema::new(SchemaConfig::new().query(query).types([post]));
    let adapter = SyncPromiseAdapter::new();
    let batches = Arc::new(Mutex::new(Vec::new()));
    let loader = PostLoader {
        adapter: adapter.clone(),
        pending: Arc::default(),
        batches: batches.clone(),
    };
    let document =
        parse("{ a: post(id: 1) { title } b: post(id: 2) { title } c: post(id: 3) { title } }");
    let result = Execution::new(&schema, &document)
        .context_value(ContextValue::new(loader))
        .execute_with_sync_adapter(&adapter)
        .unwrap();
    assert_eq!(
        compact(&result),
        r#"{"data":{"a":{"title":"Post 1"},"b":{"title":"Post 2"},"c":{"title":"Post 3"}}}"#
    );
    assert_eq!(*batches.lock(), [vec![1, 2, 3]]);
    assert_eq!(adapter.pending_tasks(), 0);
}

#[test]
fn ready_futures_complete_synchronously() {
    let query = ObjectType::new("Query")
        .field(
            FieldDefinition::new("user", Type::named("User")).resolve(|_, _, _, _| {
                Ok(FieldValue::future(async {
                    Ok(FieldValue::from(json!({"name": "Ada", "age": 36})))
                }))
            }),
        )
        .field(
            FieldDefinition::new("broken", Type::named("String")).resolve(|_, _, _, _| {
                Ok(FieldValue::future(async {
                    Err(FieldError::new("boom").with_extension("code", "E1"))
                }))
            }),
        );
    let user = blog_schema().get_type("User").unwrap().unwrap();
    let schema = Schema::new(SchemaConfig::new().query(query).types([user]));
    let document = parse("{ user { name } broken }");
    let result = Execution::new(&schema, &document).execute_sync().unwrap();
    assert_eq!(
        compact(&result),
        r#"{"errors":[{"message":"boom","locations":[{"line":1,"column":17}],"path":["broken"],"extensions":{"code":"E1"}}],"data":{"user":{"name":"Ada"},"broken":null}}"#
    );
}

#[test]
fn foreign_futures_never_settle_synchronously() {
    let query = ObjectType::new("Query").field(
        FieldDefinition::new("forever", Type::named("String")).resolve(|_, _, _, _| {
            Ok(FieldValue::future(futures::future::pending()))
        }),
    );
    let schema = Schema::new(SchemaConfig::new().query(query));
    let document = parse("{ forever }");
    let result = Execution::new(&schema, &document).execute_sync();
    assert!(matches!(
        result,
        Err(ExecutionError::Promise(PromiseError::NeverSettles))
    ));
}

#[tokio::test]
async fn sibling_futures_run_concurrently() {
    let log = Log::default();
    let query = ObjectType::new("Query")
        .field(delayed(&log, "slow", Duration::from_millis(50), Ok("tortoise")))
        .field(delayed(&log, "fast", Duration::from_millis(1), Ok("hare")));
    let schema = Schema::new(SchemaConfig::new().query(query));
    let document = parse("{ slow fast }");
    let result = Execution::new(&schema, &document)
        .execute_async()
        .await
        .unwrap();
    assert_eq!(
        compact(&result),
        r#"{"data":{"slow":"tortoise","fast":"hare"}}"#
    );
    let ends: Vec<_> = log
        .lock()
        .iter()
        .filter(|entry| entry.ends_with(" end"))
        .cloned()
        .collect();
    assert_eq!(ends, ["fast end", "slow end"]);
}

#[tokio::test]
async fn mutation_fields_run_serially() {
    let log = Log::default();
    let query = ObjectType::new("Query").field(FieldDefinition::new("up", Type::named("Boolean")));
    let mutation = ObjectType::new("Mutation")
        .field(delayed(&log, "first", Duration::from_millis(30), Ok("1")))
        .field(delayed(&log, "second", Duration::from_millis(1), Ok("2")));
    let schema = Schema::new(SchemaConfig::new().query(query).mutation(mutation));
    let document = parse("mutation { first second }");
    let result = Execution::new(&schema, &document)
        .execute_async()
        .await
        .unwrap();
    assert_eq!(compact(&result), r#"{"data":{"first":"1","second":"2"}}"#);
    assert_eq!(
        *log.lock(),
        ["first start", "first end", "second start", "second end"]
    );
}

#[tokio::test]
async fn errors_follow_response_order() {
    let log = Log::default();
    let query = ObjectType::new("Query")
        .field(delayed(&log, "early", Duration::from_millis(40), Err("early field failed")))
        .field(delayed(&log, "late", Duration::from_millis(1), Err("late field failed")));
    let schema = Schema::new(SchemaConfig::new().query(query));
    let document = parse("{ early late }");
    let result = Execution::new(&schema, &document)
        .execute_async()
        .await
        .unwrap();
    let messages: Vec<_> = result
        .errors
        .iter()
        .map(|error| error.message.as_str())
        .collect();
    assert_eq!(messages, ["early field failed", "late field failed"]);
    assert_eq!(log.lock().last().map(String::as_str), Some("early end"));
    assert!(compact(&result).ends_with(r#""data":{"early":null,"late":null}}"#));
}
