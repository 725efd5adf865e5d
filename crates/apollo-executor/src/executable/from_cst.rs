use super::*;
use crate::response::GraphQLLocation;
use apollo_parser::cst;
use apollo_parser::cst::CstNode;
use apollo_parser::SyntaxNode;

/// A syntax error reported by `apollo-parser`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at {}:{}: {message}", location.line, location.column)]
pub struct SyntaxError {
    pub message: String,
    /// The source text where the error was found
    pub data: String,
    pub location: GraphQLLocation,
}

/// Query text could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
pub struct SyntaxErrors {
    pub errors: Vec<SyntaxError>,
}

/// Byte offsets of line starts, to convert parser offsets to line and column numbers
struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                // \r\n counts as a single line terminator
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push(i + 1),
                _ => {}
            }
            i += 1
        }
        Self {
            source,
            line_starts,
        }
    }

    fn location(&self, offset: usize) -> GraphQLLocation {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map_or(0, |text| text.chars().count());
        GraphQLLocation {
            line: line + 1,
            column: column + 1,
        }
    }

    fn of(&self, syntax_node: &SyntaxNode) -> GraphQLLocation {
        self.location(usize::from(syntax_node.text_range().start()))
    }
}

pub(crate) fn parse(source_text: &str) -> Result<ExecutableDocument, SyntaxErrors> {
    let tree = apollo_parser::Parser::new(source_text).parse();
    let lines = LineIndex::new(source_text);
    let errors: Vec<_> = tree
        .errors()
        .map(|err| SyntaxError {
            message: err.message().to_owned(),
            data: err.data().to_owned(),
            location: lines.location(err.index()),
        })
        .collect();
    if !errors.is_empty() {
        return Err(SyntaxErrors { errors });
    }
    let mut document = ExecutableDocument::new();
    for definition in tree.document().definitions() {
        match definition {
            cst::Definition::OperationDefinition(def) => {
                if let Some(op) = def.convert(&lines) {
                    document.operations.push(with_location(&lines, def.syntax(), op))
                }
            }
            cst::Definition::FragmentDefinition(def) => {
                if let Some(fragment) = def.convert(&lines) {
                    let name = fragment.name.clone();
                    let fragment = with_location(&lines, def.syntax(), fragment);
                    // First definition wins, like a validated document would have
                    document.fragments.entry(name).or_insert(fragment);
                }
            }
            _ => {}
        }
    }
    Ok(document)
}

/// Similar to `TryFrom`, but with an `Option` return type
/// for CST nodes that are incomplete because of a parse error.
trait Convert {
    type Target;
    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target>;
}

fn with_location<T>(lines: &LineIndex<'_>, syntax_node: &SyntaxNode, node: T) -> Node<T> {
    Node::new_parsed(node, lines.of(syntax_node))
}

/// Convert and collect, silently skipping incomplete entries
#[inline]
fn collect<CstType, AstType>(
    lines: &LineIndex<'_>,
    iter: impl IntoIterator<Item = CstType>,
) -> Vec<Node<AstType>>
where
    CstType: CstNode + Convert<Target = AstType>,
{
    iter.into_iter()
        .filter_map(|value| Some(with_location(lines, value.syntax(), value.convert(lines)?)))
        .collect()
}

#[inline]
fn collect_opt<CstType1, CstType2, AstType, F, I>(
    lines: &LineIndex<'_>,
    opt: Option<CstType1>,
    convert: F,
) -> Vec<Node<AstType>>
where
    F: FnOnce(CstType1) -> I,
    I: IntoIterator<Item = CstType2>,
    CstType2: CstNode + Convert<Target = AstType>,
{
    if let Some(cst) = opt {
        collect(lines, convert(cst))
    } else {
        Vec::new()
    }
}

fn directives(lines: &LineIndex<'_>, directives: Option<cst::Directives>) -> DirectiveList {
    DirectiveList(collect_opt(lines, directives, |x| x.directives()))
}

impl<T: Convert> Convert for Option<T> {
    type Target = Option<T::Target>;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(if let Some(inner) = self {
            Some(inner.convert(lines)?)
        } else {
            None
        })
    }
}

impl Convert for cst::OperationDefinition {
    type Target = Operation;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        let operation_type = if let Some(ty) = self.operation_type() {
            ty.convert(lines)?
        } else {
            OperationType::Query
        };
        Some(Self::Target {
            operation_type,
            name: self.name().convert(lines)?,
            variables: collect_opt(lines, self.variable_definitions(), |x| {
                x.variable_definitions()
            }),
            directives: directives(lines, self.directives()),
            selection_set: self.selection_set()?.convert(lines)?,
        })
    }
}

impl Convert for cst::OperationType {
    type Target = OperationType;

    fn convert(&self, _lines: &LineIndex<'_>) -> Option<Self::Target> {
        if self.query_token().is_some() {
            Some(OperationType::Query)
        } else if self.mutation_token().is_some() {
            Some(OperationType::Mutation)
        } else if self.subscription_token().is_some() {
            Some(OperationType::Subscription)
        } else {
            None
        }
    }
}

impl Convert for cst::FragmentDefinition {
    type Target = Fragment;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.fragment_name()?.name()?.convert(lines)?,
            type_condition: self.type_condition()?.convert(lines)?,
            directives: directives(lines, self.directives()),
            selection_set: self.selection_set()?.convert(lines)?,
        })
    }
}

impl Convert for cst::TypeCondition {
    type Target = Name;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        self.named_type()?.name()?.convert(lines)
    }
}

impl Convert for cst::VariableDefinition {
    type Target = VariableDefinition;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        let default_value = if let Some(default) = self.default_value() {
            let value = default.value()?;
            Some(with_location(lines, value.syntax(), value.convert(lines)?))
        } else {
            None
        };
        Some(Self::Target {
            name: self.variable()?.name()?.convert(lines)?,
            ty: self.ty()?.convert(lines)?,
            default_value,
            directives: directives(lines, self.directives()),
        })
    }
}

impl Convert for cst::Type {
    type Target = Type;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        use cst::Type as C;
        match self {
            C::NamedType(name) => Some(Type::Named(name.name()?.convert(lines)?)),
            C::ListType(inner) => Some(Type::List(Box::new(inner.ty()?.convert(lines)?))),
            C::NonNullType(inner) => {
                if let Some(named) = inner.named_type() {
                    Some(Type::NonNullNamed(named.name()?.convert(lines)?))
                } else if let Some(list) = inner.list_type() {
                    Some(Type::NonNullList(Box::new(list.ty()?.convert(lines)?)))
                } else {
                    None
                }
            }
        }
    }
}

impl Convert for cst::Directive {
    type Target = Directive;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(lines)?,
            arguments: collect_opt(lines, self.arguments(), |x| x.arguments()),
        })
    }
}

impl Convert for cst::Argument {
    type Target = Argument;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        let name = self.name()?.convert(lines)?;
        let value = self.value()?;
        let value = with_location(lines, value.syntax(), value.convert(lines)?);
        Some(Argument { name, value })
    }
}

impl Convert for cst::SelectionSet {
    type Target = Vec<Selection>;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(
            self.selections()
                .filter_map(|selection| selection.convert(lines))
                .collect(),
        )
    }
}

impl Convert for cst::Selection {
    type Target = Selection;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        use cst::Selection as C;

        Some(match self {
            C::Field(x) => Selection::Field(with_location(lines, x.syntax(), x.convert(lines)?)),
            C::FragmentSpread(x) => {
                Selection::FragmentSpread(with_location(lines, x.syntax(), x.convert(lines)?))
            }
            C::InlineFragment(x) => {
                Selection::InlineFragment(with_location(lines, x.syntax(), x.convert(lines)?))
            }
        })
    }
}

impl Convert for cst::Field {
    type Target = Field;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            alias: self.alias().convert(lines)?,
            name: self.name()?.convert(lines)?,
            arguments: collect_opt(lines, self.arguments(), |x| x.arguments()),
            directives: directives(lines, self.directives()),
            selection_set: self.selection_set().convert(lines)?.unwrap_or_default(),
        })
    }
}

impl Convert for cst::FragmentSpread {
    type Target = FragmentSpread;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            fragment_name: self.fragment_name()?.name()?.convert(lines)?,
            directives: directives(lines, self.directives()),
        })
    }
}

impl Convert for cst::InlineFragment {
    type Target = InlineFragment;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(Self::Target {
            type_condition: self.type_condition().convert(lines)?,
            directives: directives(lines, self.directives()),
            selection_set: self.selection_set()?.convert(lines)?,
        })
    }
}

impl Convert for cst::Value {
    type Target = Value;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        use cst::Value as C;

        Some(match self {
            C::Variable(v) => Value::Variable(v.name()?.convert(lines)?),
            C::StringValue(v) => Value::String(String::from(v)),
            C::FloatValue(v) => Value::Float(FloatValue::new_parsed(
                v.syntax().first_token()?.text(),
            )),
            C::IntValue(v) => Value::Int(IntValue::new_parsed(v.syntax().first_token()?.text())),
            C::BooleanValue(v) => Value::Boolean(bool::try_from(v).ok()?),
            C::NullValue(_) => Value::Null,
            C::EnumValue(v) => Value::Enum(v.name()?.convert(lines)?),
            C::ListValue(v) => Value::List(collect(lines, v.values())),
            C::ObjectValue(v) => Value::Object(
                v.object_fields()
                    .filter_map(|x| x.convert(lines))
                    .collect(),
            ),
        })
    }
}

impl Convert for cst::ObjectField {
    type Target = (Name, Node<Value>);

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        let name = self.name()?.convert(lines)?;
        let value = with_location(lines, self.syntax(), self.value()?.convert(lines)?);
        Some((name, value))
    }
}

impl Convert for cst::Alias {
    type Target = Name;

    fn convert(&self, lines: &LineIndex<'_>) -> Option<Self::Target> {
        self.name()?.convert(lines)
    }
}

impl Convert for cst::Name {
    type Target = Name;

    fn convert(&self, _lines: &LineIndex<'_>) -> Option<Self::Target> {
        Some(Name::new_unchecked(self.text().as_str()))
    }
}
