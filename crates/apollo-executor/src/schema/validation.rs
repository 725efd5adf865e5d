//! Structural self-validation of a [`Schema`]
//!
//! <https://spec.graphql.org/October2021/#sec-Type-System>

use crate::collections::HashSet;
use crate::collections::IndexMap;
use crate::schema::DefinitionMap;
use crate::schema::DirectiveDefinition;
use crate::schema::EnumType;
use crate::schema::FieldDefinition;
use crate::schema::InputObjectType;
use crate::schema::InputValueDefinition;
use crate::schema::InterfaceType;
use crate::schema::NamedType;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::schema::SchemaConfigError;
use crate::schema::Type;
use crate::schema::UnionType;
use crate::Name;
use std::sync::Arc;

/// Names of the introspection types, allowed to start with `__`
const INTROSPECTION_TYPES: [&str; 8] = [
    "__Schema",
    "__Type",
    "__TypeKind",
    "__Field",
    "__InputValue",
    "__EnumValue",
    "__Directive",
    "__DirectiveLocation",
];

/// A structural problem in a schema, found by [`Schema::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Query root type must be provided.")]
    MissingQueryType,

    #[error("Names must match /^[_a-zA-Z][_a-zA-Z0-9]*$/ but \"{0}\" does not.")]
    InvalidName(String),

    #[error(
        "Name \"{0}\" must not begin with \"__\", which is reserved by GraphQL introspection."
    )]
    ReservedName(Name),

    #[error(
        "Schema must contain unique named types but contains multiple types named \"{0}\"."
    )]
    DuplicateType(Name),

    #[error("Unknown type \"{name}\" referenced by {referenced_by}.")]
    UnknownType { name: Name, referenced_by: String },

    #[error("{0}")]
    TypeLoader(SchemaConfigError),

    #[error("Directive @{0} can only be defined once.")]
    DuplicateDirective(Name),

    #[error("Directive @{0} must include 1 or more locations.")]
    DirectiveWithoutLocations(Name),

    #[error("Type {0} must define one or more fields.")]
    EmptyFields(Name),

    #[error("Input Object type {0} must define one or more fields.")]
    EmptyInputFields(Name),

    #[error("Field {type_name}.{field} can only be defined once.")]
    DuplicateField { type_name: Name, field: Name },

    #[error("Argument {coordinate}({argument}:) can only be defined once.")]
    DuplicateArgument { coordinate: String, argument: Name },

    #[error("The type of {coordinate} must be Output Type but got: {ty}.")]
    NotOutputType { coordinate: String, ty: Type },

    #[error("The type of {coordinate} must be Input Type but got: {ty}.")]
    NotInputType { coordinate: String, ty: Type },

    #[error("Type {type_name} must only implement Interface types, it cannot implement {interface}.")]
    NotInterface { type_name: Name, interface: Name },

    #[error("Type {type_name} can only implement {interface} once.")]
    DuplicateInterface { type_name: Name, interface: Name },

    #[error("Interface field {interface}.{field} expected but {type_name} does not provide it.")]
    MissingInterfaceField {
        interface: Name,
        field: Name,
        type_name: Name,
    },

    #[error(
        "Interface field {interface}.{field} expects type {expected} \
         but {type_name}.{field} is type {actual}."
    )]
    InterfaceFieldType {
        interface: Name,
        field: Name,
        expected: Type,
        type_name: Name,
        actual: Type,
    },

    #[error(
        "Interface field argument {interface}.{field}({argument}:) expected \
         but {type_name}.{field} does not provide it."
    )]
    MissingInterfaceArgument {
        interface: Name,
        field: Name,
        argument: Name,
        type_name: Name,
    },

    #[error(
        "Interface field argument {interface}.{field}({argument}:) expects type {expected} \
         but {type_name}.{field}({argument}:) is type {actual}."
    )]
    InterfaceArgumentType {
        interface: Name,
        field: Name,
        argument: Name,
        expected: Type,
        type_name: Name,
        actual: Type,
    },

    #[error(
        "Object field {type_name}.{field} includes required argument {argument} \
         that is missing from the Interface field {interface}.{field}."
    )]
    RequiredExtraArgument {
        type_name: Name,
        field: Name,
        argument: Name,
        interface: Name,
    },

    #[error("Union type {0} must define one or more member types.")]
    EmptyUnion(Name),

    #[error("Union type {union_name} can only include Object types, it cannot include {member}.")]
    NonObjectUnionMember { union_name: Name, member: Name },

    #[error("Union type {union_name} can only include type {member} once.")]
    DuplicateUnionMember { union_name: Name, member: Name },

    #[error("Enum type {0} must define one or more values.")]
    EmptyEnum(Name),

    #[error("Enum type {enum_name} can include value {value} only once.")]
    DuplicateEnumValue { enum_name: Name, value: Name },

    #[error("Enum type {enum_name} cannot include value: {value}.")]
    InvalidEnumValue { enum_name: Name, value: Name },
}

struct Validator<'a> {
    schema: &'a Schema,
    types: &'a IndexMap<Name, NamedType>,
    errors: Vec<SchemaError>,
}

pub(crate) fn validate_schema(schema: &Schema) -> Vec<SchemaError> {
    let mut validator = Validator {
        schema,
        types: schema.type_map(),
        errors: Vec::new(),
    };
    if schema.query_type().is_none() {
        validator.errors.push(SchemaError::MissingQueryType)
    }
    validator.directives(schema.directives());
    validator
        .errors
        .extend(schema.registration_errors().iter().cloned());
    validator
        .errors
        .extend(schema.discovery_errors().iter().cloned());
    let types = validator.types;
    for ty in types.values() {
        validator.named_type(ty)
    }
    validator.errors
}

impl Validator<'_> {
    fn directives(&mut self, directives: &[Arc<DirectiveDefinition>]) {
        let mut seen = HashSet::default();
        for directive in directives {
            self.name(&directive.name, false);
            if !seen.insert(&directive.name) {
                self.errors
                    .push(SchemaError::DuplicateDirective(directive.name.clone()));
                continue;
            }
            if directive.locations.is_empty() {
                self.errors
                    .push(SchemaError::DirectiveWithoutLocations(directive.name.clone()))
            }
            self.arguments(&format!("@{}", directive.name), &directive.arguments);
        }
    }

    /// <https://spec.graphql.org/October2021/#Name>
    fn name(&mut self, name: &Name, allow_reserved: bool) {
        if !Name::valid_syntax(name) {
            self.errors.push(SchemaError::InvalidName(name.to_string()));
        } else if name.is_reserved() && !allow_reserved {
            self.errors.push(SchemaError::ReservedName(name.clone()));
        }
    }

    fn named_type(&mut self, ty: &NamedType) {
        let is_introspection = INTROSPECTION_TYPES.contains(&ty.name().as_str());
        self.name(ty.name(), is_introspection);
        match ty {
            NamedType::Scalar(_) => {}
            NamedType::Object(def) => self.object(def, is_introspection),
            NamedType::Interface(def) => self.interface(def, is_introspection),
            NamedType::Union(def) => self.union_(def),
            NamedType::Enum(def) => self.enum_(def, is_introspection),
            NamedType::InputObject(def) => self.input_object(def),
        }
    }

    fn get(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    /// <https://spec.graphql.org/October2021/#sec-Objects.Type-Validation>
    fn object(&mut self, def: &ObjectType, is_introspection: bool) {
        self.fields(&def.name, def.fields(), is_introspection);
        let mut seen = HashSet::default();
        for interface_name in def.interfaces() {
            if !seen.insert(interface_name) {
                self.errors.push(SchemaError::DuplicateInterface {
                    type_name: def.name.clone(),
                    interface: interface_name.clone(),
                });
                continue;
            }
            match self.get(interface_name) {
                Some(NamedType::Interface(interface)) => {
                    let interface = interface.clone();
                    self.implements(def, &interface)
                }
                Some(_) => self.errors.push(SchemaError::NotInterface {
                    type_name: def.name.clone(),
                    interface: interface_name.clone(),
                }),
                // Reported during discovery
                None => {}
            }
        }
    }

    /// <https://spec.graphql.org/October2021/#sec-Interfaces.Type-Validation>
    fn interface(&mut self, def: &InterfaceType, is_introspection: bool) {
        self.fields(&def.name, def.fields(), is_introspection)
    }

    fn fields(
        &mut self,
        type_name: &Name,
        fields: &DefinitionMap<FieldDefinition>,
        is_introspection: bool,
    ) {
        if fields.is_empty() {
            self.errors.push(SchemaError::EmptyFields(type_name.clone()))
        }
        for name in &fields.duplicates {
            self.errors.push(SchemaError::DuplicateField {
                type_name: type_name.clone(),
                field: name.clone(),
            })
        }
        for field in fields.values() {
            self.name(&field.name, is_introspection);
            let coordinate = format!("{type_name}.{}", field.name);
            if self.get(field.ty.inner_named_type()).is_some_and(|ty| !ty.is_output_type()) {
                self.errors.push(SchemaError::NotOutputType {
                    coordinate: coordinate.clone(),
                    ty: field.ty.clone(),
                })
            }
            self.arguments(&coordinate, &field.arguments)
        }
    }

    fn arguments(&mut self, coordinate: &str, arguments: &[InputValueDefinition]) {
        let mut seen = HashSet::default();
        for arg in arguments {
            self.name(&arg.name, false);
            if !seen.insert(&arg.name) {
                self.errors.push(SchemaError::DuplicateArgument {
                    coordinate: coordinate.to_owned(),
                    argument: arg.name.clone(),
                });
                continue;
            }
            if self.get(arg.ty.inner_named_type()).is_some_and(|ty| !ty.is_input_type()) {
                self.errors.push(SchemaError::NotInputType {
                    coordinate: format!("{coordinate}({}:)", arg.name),
                    ty: arg.ty.clone(),
                })
            }
        }
    }

    /// <https://spec.graphql.org/October2021/#IsValidImplementation()>
    fn implements(&mut self, object: &ObjectType, interface: &InterfaceType) {
        for interface_field in interface.fields().values() {
            let Some(object_field) = object.field_by_name(&interface_field.name) else {
                self.errors.push(SchemaError::MissingInterfaceField {
                    interface: interface.name.clone(),
                    field: interface_field.name.clone(),
                    type_name: object.name.clone(),
                });
                continue;
            };
            if !self.is_sub_type(&object_field.ty, &interface_field.ty) {
                self.errors.push(SchemaError::InterfaceFieldType {
                    interface: interface.name.clone(),
                    field: interface_field.name.clone(),
                    expected: interface_field.ty.clone(),
                    type_name: object.name.clone(),
                    actual: object_field.ty.clone(),
                })
            }
            for interface_arg in &interface_field.arguments {
                let Some(object_arg) = object_field.argument_by_name(&interface_arg.name) else {
                    self.errors.push(SchemaError::MissingInterfaceArgument {
                        interface: interface.name.clone(),
                        field: interface_field.name.clone(),
                        argument: interface_arg.name.clone(),
                        type_name: object.name.clone(),
                    });
                    continue;
                };
                // Arguments are invariant
                if object_arg.ty != interface_arg.ty {
                    self.errors.push(SchemaError::InterfaceArgumentType {
                        interface: interface.name.clone(),
                        field: interface_field.name.clone(),
                        argument: interface_arg.name.clone(),
                        expected: interface_arg.ty.clone(),
                        type_name: object.name.clone(),
                        actual: object_arg.ty.clone(),
                    })
                }
            }
            for object_arg in &object_field.arguments {
                if object_arg.is_required()
                    && interface_field.argument_by_name(&object_arg.name).is_none()
                {
                    self.errors.push(SchemaError::RequiredExtraArgument {
                        type_name: object.name.clone(),
                        field: object_field.name.clone(),
                        argument: object_arg.name.clone(),
                        interface: interface.name.clone(),
                    })
                }
            }
        }
    }

    /// Whether a field of type `maybe_sub` can stand in for a field of type `super_type`
    ///
    /// <https://spec.graphql.org/October2021/#IsValidImplementationFieldType()>
    fn is_sub_type(&self, maybe_sub: &Type, super_type: &Type) -> bool {
        if maybe_sub == super_type {
            return true;
        }
        if super_type.is_non_null() {
            return maybe_sub.is_non_null()
                && self.is_sub_type(
                    &maybe_sub.clone().nullable(),
                    &super_type.clone().nullable(),
                );
        }
        if maybe_sub.is_non_null() {
            return self.is_sub_type(&maybe_sub.clone().nullable(), super_type);
        }
        match (maybe_sub, super_type) {
            (Type::List(sub_item), Type::List(super_item)) => {
                self.is_sub_type(sub_item, super_item)
            }
            (Type::List(_), _) | (_, Type::List(_)) => false,
            _ => {
                let (Some(sub_def), Some(super_def)) = (
                    self.get(maybe_sub.inner_named_type()),
                    self.get(super_type.inner_named_type()),
                ) else {
                    return false;
                };
                match sub_def {
                    NamedType::Object(object) => self.schema.is_possible_type(super_def, object),
                    _ => false,
                }
            }
        }
    }

    /// <https://spec.graphql.org/October2021/#sec-Unions.Type-Validation>
    fn union_(&mut self, def: &UnionType) {
        if def.members().is_empty() {
            self.errors.push(SchemaError::EmptyUnion(def.name.clone()))
        }
        let mut seen = HashSet::default();
        for member in def.members() {
            if !seen.insert(member) {
                self.errors.push(SchemaError::DuplicateUnionMember {
                    union_name: def.name.clone(),
                    member: member.clone(),
                });
                continue;
            }
            if self.get(member).is_some_and(|ty| ty.as_object().is_none()) {
                self.errors.push(SchemaError::NonObjectUnionMember {
                    union_name: def.name.clone(),
                    member: member.clone(),
                })
            }
        }
    }

    /// <https://spec.graphql.org/October2021/#sec-Enums.Type-Validation>
    fn enum_(&mut self, def: &EnumType, is_introspection: bool) {
        let values = def.values();
        if values.is_empty() {
            self.errors.push(SchemaError::EmptyEnum(def.name.clone()))
        }
        for name in &values.duplicates {
            self.errors.push(SchemaError::DuplicateEnumValue {
                enum_name: def.name.clone(),
                value: name.clone(),
            })
        }
        for value in values.values() {
            self.name(&value.name, is_introspection);
            if matches!(value.name.as_str(), "true" | "false" | "null") {
                self.errors.push(SchemaError::InvalidEnumValue {
                    enum_name: def.name.clone(),
                    value: value.name.clone(),
                })
            }
        }
    }

    /// <https://spec.graphql.org/October2021/#sec-Input-Objects.Type-Validation>
    fn input_object(&mut self, def: &InputObjectType) {
        let fields = def.fields();
        if fields.is_empty() {
            self.errors
                .push(SchemaError::EmptyInputFields(def.name.clone()))
        }
        for name in &fields.duplicates {
            self.errors.push(SchemaError::DuplicateField {
                type_name: def.name.clone(),
                field: name.clone(),
            })
        }
        for field in fields.values() {
            self.name(&field.name, false);
            if self.get(field.ty.inner_named_type()).is_some_and(|ty| !ty.is_input_type()) {
                self.errors.push(SchemaError::NotInputType {
                    coordinate: format!("{}.{}", def.name, field.name),
                    ty: field.ty.clone(),
                })
            }
        }
    }
}
