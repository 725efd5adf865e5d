use crate::common::ada;
use crate::common::blog_schema;
use crate::common::json_map;
use crate::common::parse;
use crate::common::pretty;
use crate::common::pretty_debug;
use crate::common::run;
use apollo_executor::execution::ContextValue;
use apollo_executor::execution::FieldError;
use apollo_executor::execution::FieldValue;
use apollo_executor::execution::ObjectValue;
use apollo_executor::execution::ResolveInfo;
use apollo_executor::response::GraphQLError;
use apollo_executor::response::PathElement;
use apollo_executor::schema::EnumType;
use apollo_executor::schema::EnumValueDefinition;
use apollo_executor::schema::FieldDefinition;
use apollo_executor::schema::InputValueDefinition;
use apollo_executor::schema::ObjectType;
use apollo_executor::schema::Type;
use apollo_executor::Execution;
use apollo_executor::JsonMap;
use apollo_executor::Schema;
use apollo_executor::SchemaConfig;
use expect_test::expect;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

#[test]
fn resolves_nested_json_with_default_resolver() {
    let result = run(
        &blog_schema(),
        "{ user { name age posts { title likes } } }",
        ada(),
    );
    let expected = expect![[r#"
        {
          "data": {
            "user": {
              "name": "Ada",
              "age": 36,
              "posts": [
                {
                  "title": "Notes",
                  "likes": 3
                },
                {
                  "title": "Engines",
                  "likes": null
                }
              ]
            }
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

#[test]
fn null_in_non_null_field_nullifies_parent() {
    let result = run(
        &blog_schema(),
        "{ user { name } }",
        json!({"user": {"name": null}}),
    );
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Cannot return null for non-nullable field User.name.",
              "locations": [
                {
                  "line": 1,
                  "column": 10
                }
              ],
              "path": [
                "user",
                "name"
              ]
            }
          ],
          "data": {
            "user": null
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
    assert_eq!(
        result.errors[0].path,
        [
            PathElement::Field("user".into()),
            PathElement::Field("name".into())
        ]
    );
}

#[test]
fn null_propagates_to_data() {
    let result = run(&blog_schema(), "{ viewer { name } user { age } }", ada());
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Cannot return null for non-nullable field Query.viewer.",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "viewer"
              ]
            }
          ],
          "data": null
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

#[test]
fn non_null_list_item_nullifies_list() {
    let root = json!({"user": {"posts": [{"title": "Notes"}, {"title": null}]}});
    let result = run(&blog_schema(), "{ user { posts { title } } }", root);
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Cannot return null for non-nullable field Post.title.",
              "locations": [
                {
                  "line": 1,
                  "column": 18
                }
              ],
              "path": [
                "user",
                "posts",
                1,
                "title"
              ]
            }
          ],
          "data": {
            "user": {
              "posts": null
            }
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

#[test]
fn sibling_fields_survive_resolver_errors() {
    let query = ObjectType::new("Query")
        .field(
            FieldDefinition::new("a", Type::named("Int"))
                .resolve(|_, _, _, _| Ok(FieldValue::from(1))),
        )
        .field(
            FieldDefinition::new("b", Type::named("Int")).resolve(|_, _, _, _| {
                Err(FieldError::new("b failed").with_extension("code", "B"))
            }),
        )
        .field(
            FieldDefinition::new("c", Type::named("Int"))
                .resolve(|_, _, _, _| Ok(FieldValue::from(3))),
        );
    let schema = Schema::new(SchemaConfig::new().query(query));
    let result = run(&schema, "{ a b c }", json!(null));
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "b failed",
              "locations": [
                {
                  "line": 1,
                  "column": 5
                }
              ],
              "path": [
                "b"
              ],
              "extensions": {
                "code": "B"
              }
            }
          ],
          "data": {
            "a": 1,
            "b": null,
            "c": 3
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

#[test]
fn aliases_fragments_and_typename() {
    let source = r#"
        {
          u: user { __typename ...Names }
          user { age }
          user { name }
        }
        fragment Names on User { name first: name }
    "#;
    let result = run(&blog_schema(), source, ada());
    let expected = expect![[r#"
        {
          "data": {
            "u": {
              "__typename": "User",
              "name": "Ada",
              "first": "Ada"
            },
            "user": {
              "age": 36,
              "name": "Ada"
            }
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

#[test]
fn skip_and_include() {
    let source = r#"
        query($withAge: Boolean!) {
          user {
            name
            age @include(if: $withAge)
            posts @skip(if: true) { title }
            ... @skip(if: $withAge) { first: name }
          }
        }
    "#;
    let document = parse(source);
    let schema = blog_schema();
    let execute = |with_age: bool| {
        let result = Execution::new(&schema, &document)
            .root_value(ada())
            .variable_values(json_map(json!({"withAge": with_age})))
            .execute_sync()
            .unwrap();
        serde_json::to_string(&result).unwrap()
    };
    assert_eq!(
        execute(false),
        r#"{"data":{"user":{"name":"Ada","first":"Ada"}}}"#
    );
    assert_eq!(execute(true), r#"{"data":{"user":{"name":"Ada","age":36}}}"#);
}

#[test]
fn leaf_serialization() {
    let color = EnumType::new("Color")
        .value_definition(EnumValueDefinition::new("RED", 1))
        .value_definition(EnumValueDefinition::new("GREEN", 2));
    let leaf = |name: &str, ty: &str, value: serde_json_bytes::Value| {
        FieldDefinition::new(name, Type::named(ty))
            .resolve(move |_, _, _, _| Ok(FieldValue::leaf(value.clone())))
    };
    let query = ObjectType::new("Query")
        .field(leaf("count", "Int", json!("abc")))
        .field(leaf("big", "Int", json!(1_099_511_627_776_i64)))
        .field(leaf("ratio", "Float", json!("1.5")))
        .field(leaf("id", "ID", json!(7)))
        .field(leaf("color", "Color", json!(2)))
        .field(leaf("badColor", "Color", json!(9)));
    let schema = Schema::new(SchemaConfig::new().query(query).types([color]));
    let result = run(&schema, "{ count big ratio id color badColor }", json!(null));
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Int cannot represent non-integer value: \"abc\"",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "count"
              ]
            },
            {
              "message": "Int cannot represent non 32-bit signed integer value: 1099511627776",
              "locations": [
                {
                  "line": 1,
                  "column": 9
                }
              ],
              "path": [
                "big"
              ]
            },
            {
              "message": "Enum \"Color\" cannot represent value: 9",
              "locations": [
                {
                  "line": 1,
                  "column": 28
                }
              ],
              "path": [
                "badColor"
              ]
            }
          ],
          "data": {
            "count": null,
            "big": null,
            "ratio": 1.5,
            "id": "7",
            "color": "GREEN",
            "badColor": null
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

#[test]
fn expected_list_or_object() {
    let query = ObjectType::new("Query")
        .field(
            FieldDefinition::new("tags", Type::named("String").list())
                .resolve(|_, _, _, _| Ok(FieldValue::from("not a list"))),
        )
        .field(
            FieldDefinition::new("user", Type::named("User"))
                .resolve(|_, _, _, _| Ok(FieldValue::from(42))),
        );
    let user = ObjectType::new("User").field(FieldDefinition::new("name", Type::named("String")));
    let schema = Schema::new(SchemaConfig::new().query(query).types([user]));
    let result = run(&schema, "{ tags user { name } }", json!(null));
    let messages: Vec<_> = result.errors.iter().map(|error| &error.message).collect();
    assert_eq!(
        messages,
        [
            "Expected Iterable, but did not find one for field \"Query.tags\".",
            "Expected value of type \"User\" but got: 42.",
        ]
    );
}

#[test]
fn arguments_reach_resolvers() {
    let query = ObjectType::new("Query").field(
        FieldDefinition::new("greet", Type::named("String").non_null())
            .argument(
                InputValueDefinition::new("name", Type::named("String").non_null())
                    .default_value("you"),
            )
            .argument(InputValueDefinition::new("times", Type::named("Int")).default_value(1))
            .resolve(|_, args, _, _| {
                let name = args.get("name").and_then(|name| name.as_str());
                let name = name.unwrap_or_default();
                let times = args.get("times").and_then(|times| times.as_i64());
                let times = times.unwrap_or_default();
                Ok(FieldValue::from(
                    vec![format!("Hello {name}!"); times as usize].join(" "),
                ))
            }),
    );
    let schema = Schema::new(SchemaConfig::new().query(query));
    let document = parse(
        r#"query($n: String!) { a: greet b: greet(name: $n, times: 2) c: greet(times: "x") }"#,
    );
    let result = Execution::new(&schema, &document)
        .variable_values(json_map(json!({"n": "Bob"})))
        .execute_sync()
        .unwrap();
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Argument \"times\" has invalid value \"x\".",
              "locations": [
                {
                  "line": 1,
                  "column": 60
                }
              ],
              "path": [
                "c"
              ]
            }
          ],
          "data": null
        }
    "#]];
    expected.assert_eq(&pretty(&result));

    let document = parse(r#"query($n: String!) { a: greet b: greet(name: $n, times: 2) }"#);
    let result = Execution::new(&schema, &document)
        .variable_values(json_map(json!({"n": "Bob"})))
        .execute_sync()
        .unwrap();
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"data":{"a":"Hello you!","b":"Hello Bob! Hello Bob!"}}"#
    );
}

struct Person {
    name: &'static str,
    friends: Vec<Person>,
}

impl ObjectValue for Person {
    fn type_name(&self) -> Option<&str> {
        Some("Person")
    }

    fn resolve_field(
        &self,
        info: &ResolveInfo<'_>,
        _arguments: &JsonMap,
        _context: &ContextValue,
    ) -> Result<FieldValue, FieldError> {
        match info.field_name.as_str() {
            "name" => Ok(self.name.into()),
            "friends" => Ok(FieldValue::list(self.friends.iter().map(|friend| {
                FieldValue::object(Person {
                    name: friend.name,
                    friends: Vec::new(),
                })
            }))),
            "path" => Ok(FieldValue::list(info.path().iter().map(|element| {
                FieldValue::from(element.to_string())
            }))),
            _ => Err(FieldError::new(format!("no field {}", info.field_name))),
        }
    }
}

#[test]
fn object_values_and_type_level_resolver() {
    let person = ObjectType::new("Person")
        .field(FieldDefinition::new("name", Type::named("String")))
        .field(FieldDefinition::new("friends", Type::named("Person").list()))
        .field(FieldDefinition::new("path", Type::named("String").list()));
    let query = ObjectType::new("Query")
        .field(FieldDefinition::new("me", Type::named("Person")))
        .field(FieldDefinition::new("version", Type::named("String")))
        .resolve_field(|_, _, _, info| match info.field_name.as_str() {
            "me" => Ok(FieldValue::object(Person {
                name: "Ada",
                friends: vec![Person {
                    name: "Charles",
                    friends: Vec::new(),
                }],
            })),
            _ => Ok(FieldValue::from("1.0")),
        });
    let schema = Schema::new(SchemaConfig::new().query(query).types([person]));
    let result = run(
        &schema,
        "{ version me { name friends { name path } } }",
        json!(null),
    );
    let expected = expect![[r#"
        {
          "data": {
            "version": "1.0",
            "me": {
              "name": "Ada",
              "friends": [
                {
                  "name": "Charles",
                  "path": [
                    "me",
                    "friends",
                    "0",
                    "path"
                  ]
                }
              ]
            }
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
}

#[test]
fn execution_wide_field_resolver() {
    let query = ObjectType::new("Query")
        .field(FieldDefinition::new("hello", Type::named("String")))
        .field(
            FieldDefinition::new("own", Type::named("String"))
                .resolve(|_, _, _, _| Ok(FieldValue::from("own resolver"))),
        );
    let schema = Schema::new(SchemaConfig::new().query(query));
    let document = parse("{ hello own }");
    let result = Execution::new(&schema, &document)
        .field_resolver(|_, _, _, info| Ok(info.field_name.to_uppercase().into()))
        .execute_sync()
        .unwrap();
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"data":{"hello":"HELLO","own":"own resolver"}}"#
    );
}

#[test]
fn context_value_reaches_resolvers() {
    struct Viewer {
        name: String,
    }
    let query = ObjectType::new("Query").field(
        FieldDefinition::new("viewer", Type::named("String")).resolve(|_, _, context, _| {
            Ok(context.get::<Viewer>().map(|viewer| viewer.name.clone()).into())
        }),
    );
    let schema = Schema::new(SchemaConfig::new().query(query));
    let document = parse("{ viewer }");
    let result = Execution::new(&schema, &document)
        .context_value(ContextValue::new(Viewer {
            name: "Grace".into(),
        }))
        .execute_sync()
        .unwrap();
    assert_eq!(
        result.data.as_object().unwrap().get("viewer"),
        Some(&json!("Grace"))
    );
}

#[test]
fn resolver_panics_are_internal_errors() {
    let query = ObjectType::new("Query")
        .field(
            FieldDefinition::new("boom", Type::named("String"))
                .resolve(|_, _, _, _| panic!("boom")),
        )
        .field(
            FieldDefinition::new("fine", Type::named("String"))
                .resolve(|_, _, _, _| Ok(FieldValue::from("fine"))),
        );
    let schema = Schema::new(SchemaConfig::new().query(query));
    let result = run(&schema, "{ boom fine }", json!(null));
    assert!(!result.errors[0].is_client_safe());
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Internal server error",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "boom"
              ]
            }
          ],
          "data": {
            "boom": null,
            "fine": "fine"
          }
        }
    "#]];
    expected.assert_eq(&pretty(&result));
    let expected = expect![[r#"
        {
          "errors": [
            {
              "message": "Internal server error",
              "locations": [
                {
                  "line": 1,
                  "column": 3
                }
              ],
              "path": [
                "boom"
              ],
              "debugMessage": "boom"
            }
          ],
          "data": {
            "boom": null,
            "fine": "fine"
          }
        }
    "#]];
    expected.assert_eq(&pretty_debug(&result));
}

#[test]
fn custom_error_formatting() {
    let mut result = run(
        &blog_schema(),
        "{ user { name } }",
        json!({"user": {"name": null}}),
    );
    result.set_error_formatter(|error: &GraphQLError| {
        let mut map = JsonMap::new();
        map.insert("msg", error.message.as_str().into());
        map
    });
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"errors":[{"msg":"Cannot return null for non-nullable field User.name."}],"data":{"user":null}}"#
    );
    result.set_errors_handler(|errors, format| {
        errors.iter().take(0).map(format).collect()
    });
    assert_eq!(
        serde_json::to_string(&result).unwrap(),
        r#"{"errors":[],"data":{"user":null}}"#
    );
}
