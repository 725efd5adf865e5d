use crate::schema::InputValueDefinition;
use crate::schema::Type;
use crate::Name;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

pub(crate) const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// <https://spec.graphql.org/October2021/#sec-Type-System.Directives>
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    pub name: Name,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDefinition>,
    pub locations: Vec<DirectiveLocation>,
    pub repeatable: bool,
}

/// <https://spec.graphql.org/October2021/#DirectiveLocation>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveDefinition {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            locations: Vec::new(),
            repeatable: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, argument: InputValueDefinition) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn location(mut self, location: DirectiveLocation) -> Self {
        self.locations.push(location);
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// `@include(if: Boolean!)`
    pub fn include() -> Arc<Self> {
        static INCLUDE: OnceLock<Arc<DirectiveDefinition>> = OnceLock::new();
        INCLUDE
            .get_or_init(|| {
                Arc::new(
                    Self::new("include")
                        .description(
                            "Directs the executor to include this field or fragment \
                             only when the `if` argument is true.",
                        )
                        .argument(
                            InputValueDefinition::new("if", Type::named("Boolean").non_null())
                                .description("Included when true."),
                        )
                        .location(DirectiveLocation::Field)
                        .location(DirectiveLocation::FragmentSpread)
                        .location(DirectiveLocation::InlineFragment),
                )
            })
            .clone()
    }

    /// `@skip(if: Boolean!)`
    pub fn skip() -> Arc<Self> {
        static SKIP: OnceLock<Arc<DirectiveDefinition>> = OnceLock::new();
        SKIP.get_or_init(|| {
            Arc::new(
                Self::new("skip")
                    .description(
                        "Directs the executor to skip this field or fragment \
                         when the `if` argument is true.",
                    )
                    .argument(
                        InputValueDefinition::new("if", Type::named("Boolean").non_null())
                            .description("Skipped when true."),
                    )
                    .location(DirectiveLocation::Field)
                    .location(DirectiveLocation::FragmentSpread)
                    .location(DirectiveLocation::InlineFragment),
            )
        })
        .clone()
    }

    /// `@deprecated(reason: String = "No longer supported")`
    pub fn deprecated() -> Arc<Self> {
        static DEPRECATED: OnceLock<Arc<DirectiveDefinition>> = OnceLock::new();
        DEPRECATED
            .get_or_init(|| {
                Arc::new(
                    Self::new("deprecated")
                        .description("Marks an element of a GraphQL schema as no longer supported.")
                        .argument(
                            InputValueDefinition::new("reason", Type::named("String"))
                                .description(
                                    "Explains why this element was deprecated, usually also \
                                     including a suggestion for how to access supported similar \
                                     data. Formatted using the Markdown syntax \
                                     (as specified by [CommonMark](https://commonmark.org/).",
                                )
                                .default_value(DEFAULT_DEPRECATION_REASON),
                        )
                        .location(DirectiveLocation::FieldDefinition)
                        .location(DirectiveLocation::EnumValue),
                )
            })
            .clone()
    }

    /// `@include`, `@skip`, and `@deprecated`
    pub fn standard_directives() -> Vec<Arc<Self>> {
        vec![Self::include(), Self::skip(), Self::deprecated()]
    }
}

impl DirectiveLocation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::VariableDefinition => "VARIABLE_DEFINITION",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
