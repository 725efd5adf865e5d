use crate::common::pretty;
use crate::common::run;
use apollo_executor::execution::ContextValue;
use apollo_executor::execution::FieldError;
use apollo_executor::execution::FieldValue;
use apollo_executor::execution::ObjectValue;
use apollo_executor::execution::ResolveInfo;
use apollo_executor::schema::FieldDefinition;
use apollo_executor::schema::InterfaceType;
use apollo_executor::schema::NamedType;
use apollo_executor::schema::ObjectType;
use apollo_executor::schema::Type;
use apollo_executor::schema::UnionType;
use apollo_executor::JsonMap;
use apollo_executor::JsonValue;
use apollo_executor::Name;
use apollo_executor::Schema;
use apollo_executor::SchemaConfig;
use expect_test::expect;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

fn json_key<'a>(value: &'a FieldValue, key: &str) -> Option<&'a JsonValue> {
    value.as_json()?.as_object()?.get(key)
}

fn pets_schema() -> Schema {
    let node = InterfaceType::new("Node")
        .field(FieldDefinition::new("id", Type::named("ID").non_null()))
        .resolve_type(|value, _, _| {
            json_key(value, "kind")
                .and_then(JsonValue::as_str)
                .map(Name::from)
        });
    let dog = ObjectType::new("Dog")
        .implements("Node")
        .field(FieldDefinition::new("id", Type::named("ID").non_null()))
        .field(FieldDefinition::new("barks", Type::named("Boolean")));
    let cat = ObjectType::new("Cat")
        .implements("Node")
        .field(FieldDefinition::new("id", Type::named("ID").non_null()))
        .field(FieldDefinition::new("meows", Type::named("Boolean")));
    let user = ObjectType::new("User").field(FieldDefinition::new("id", Type::named("ID")));
    let pet = UnionType::new("Pet").member("Dog").member("Cat");
    let query = ObjectType::new("Query")
        .field(FieldDefinition::new("node", Type::named("Node")))
        .field(FieldDefinition::new("pet", Type::named("Pet")))
        .field(FieldDefinition::new("pets", Type::named("Pet").list()))
        .field(FieldDefinition::new("notMember", Type::named("Pet")))
        .field(FieldDefinition::new("ghost", Type::named("Pet")))
        .field(FieldDefinition::new("unknown", Type::named("Pet")));
    Schema::new(SchemaConfig::new().query(query).types([
        NamedType::from(node),
        NamedType::from(dog),
        NamedType::from(cat),
        NamedType::from(user),
        NamedType::from(pet),
    ]))
}

#[test]
fn type_resolver_and_typename_entry() {
    let source = r#"
        {
          node { id ... on Dog { barks } ... on Cat { meows } }
          pet { __typename ... on Node { id } ... on Cat { meows } }
        }
    "#;
    let root = json!({
        "node": {"kind": "Dog", "id": "1", "barks": true},
        "pet": {"__typename": "Cat", "id": "2", "meows": false},
    });
    let result = run(&pets_schema(), source, root);
    let expected = expect![[r#"
        {
          "data": {
            "node": {
              "id": "1",
              "barks": true
            },
            "pet": {
              "__typename": "Cat",
              "id": "2",
              "meows": false
            }
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

struct Dog;
struct Cat {
    lives: i32,
}

impl ObjectValue for Dog {
    fn type_name(&self) -> Option<&str> {
        Some("Dog")
    }

    fn resolve_field(
        &self,
        info: &ResolveInfo<'_>,
        _arguments: &JsonMap,
        _context: &ContextValue,
    ) -> Result<FieldValue, FieldError> {
        match info.field_name.as_str() {
            "id" => Ok("dog".into()),
            "barks" => Ok(true.into()),
            _ => Ok(FieldValue::null()),
        }
    }
}

impl ObjectValue for Cat {
    fn type_name(&self) -> Option<&str> {
        Some("Cat")
    }

    fn resolve_field(
        &self,
        info: &ResolveInfo<'_>,
        _arguments: &JsonMap,
        _context: &ContextValue,
    ) -> Result<FieldValue, FieldError> {
        match info.field_name.as_str() {
            "id" => Ok(format!("cat-{}", self.lives).into()),
            _ => Ok(FieldValue::null()),
        }
    }
}

#[test]
fn object_value_type_names() {
    let query = ObjectType::new("Query").field(
        FieldDefinition::new("pets", Type::named("Pet").list()).resolve(|_, _, _, _| {
            Ok(FieldValue::List(vec![
                FieldValue::object(Dog),
                FieldValue::object(Cat { lives: 9 }),
            ]))
        }),
    );
    let schema = Schema::new(SchemaConfig::new().query(query).types([
        NamedType::from(UnionType::new("Pet").member("Dog").member("Cat")),
        NamedType::from(
            ObjectType::new("Dog")
                .field(FieldDefinition::new("id", Type::named("ID")))
                .field(FieldDefinition::new("barks", Type::named("Boolean"))),
        ),
        NamedType::from(
            ObjectType::new("Cat").field(FieldDefinition::new("id", Type::named("ID"))),
        ),
    ]));
    let result = run(
        &schema,
        "{ pets { __typename ... on Dog { id barks } ... on Cat { id } } }",
        json!(null),
    );
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"data":{"pets":[{"__typename":"Dog","id":"dog","barks":true},{"__typename":"Cat","id":"cat-9"}]}}"#
    );
}

#[test]
fn is_type_of_scan() {
    let has_key = |key: &'static str| {
        move |value: &FieldValue, _: &ContextValue, _: &ResolveInfo<'_>| {
            json_key(value, key).is_some()
        }
    };
    let circle = ObjectType::new("Circle")
        .field(FieldDefinition::new("radius", Type::named("Float")))
        .is_type_of(has_key("radius"));
    let square = ObjectType::new("Square")
        .field(FieldDefinition::new("side", Type::named("Float")))
        .is_type_of(has_key("side"));
    let shape = UnionType::new("Shape").member("Circle").member("Square");
    let query = ObjectType::new("Query")
        .field(FieldDefinition::new("shapes", Type::named("Shape").list()))
        .field(FieldDefinition::new("circle", Type::named("Circle")));
    let schema = Schema::new(SchemaConfig::new().query(query).types([
        NamedType::from(circle),
        NamedType::from(square),
        NamedType::from(shape),
    ]));
    assert_eq!(
        schema
            .possible_types("Shape")
            .iter()
            .map(|object| object.name.as_str())
            .collect::<Vec<_>>(),
        ["Circle", "Square"]
    );
    let root = json!({
        "shapes": [{"side": 2}, {"radius": 1}],
        "circle": {"side": 3},
    });
    let result = run(
        &schema,
        "{ shapes { __typename } circle { radius } }",
        root,
    );
    assert_eq!(
        result.data.as_object().unwrap().get("shapes"),
        Some(&json!([{"__typename": "Square"}, {"__typename": "Circle"}]))
    );
    assert_eq!(
        result.data.as_object().unwrap().get("circle"),
        Some(&JsonValue::Null)
    );
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0]
        .message
        .starts_with("Expected value of type \"Circle\" but got: "));
}

#[test]
fn unresolvable_runtime_types() {
    let root = json!({
        "notMember": {"__typename": "User"},
        "ghost": {"__typename": "Ghost"},
        "unknown": {"id": "3"},
    });
    let result = run(
        &pets_schema(),
        "{ notMember { __typename } ghost { __typename } unknown { __typename } }",
        root,
    );
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Runtime Object type \"User\" is not a possible type for \"Pet\".",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "notMember"
              ]
            },
            {
              "message": "Abstract type \"Pet\" was resolved to a type \"Ghost\" that does not exist inside the schema.",
              "locations": [
                {
                  "line": 1,
                  "column": 28
                }
              ],
              "path": [
                "ghost"
              ]
            },
            {
              "message": "Abstract type \"Pet\" must resolve to an Object type at runtime for field \"Query.unknown\". Either the \"Pet\" type should provide a \"resolveType\" function or each possible type should provide an \"isTypeOf\" function.",
              "locations": [
                {
                  "line": 1,
                  "column": 49
                }
              ],
              "path": [
                "unknown"
              ]
            }
          ],
          "data": {
            "notMember": null,
            "ghost": null,
            "unknown": null
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}
