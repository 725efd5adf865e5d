use crate::collections::HashMap;
use crate::collections::HashSet;
use crate::executable::Selection;
use crate::execution::engine::eval_if_arg;
use crate::response::GraphQLError;
use crate::ExecutableDocument;
use crate::JsonMap;
use crate::Name;
use crate::Schema;

/// An extra check run on a document before execution.
///
/// Rules are given the variable values as provided in the request, before coercion.
/// Any error returned prevents execution: the response has errors and no `data`.
pub trait ValidationRule: Send + Sync {
    fn validate(
        &self,
        schema: &Schema,
        document: &ExecutableDocument,
        raw_variable_values: &JsonMap,
    ) -> Vec<GraphQLError>;
}

impl<F> ValidationRule for F
where
    F: Fn(&Schema, &ExecutableDocument, &JsonMap) -> Vec<GraphQLError> + Send + Sync,
{
    fn validate(
        &self,
        schema: &Schema,
        document: &ExecutableDocument,
        raw_variable_values: &JsonMap,
    ) -> Vec<GraphQLError> {
        self(schema, document, raw_variable_values)
    }
}

/// Rejects operations that select too many fields.
///
/// Each selected field counts for one plus the complexity of its own selections.
/// Fragments are counted where they are spread.
/// Fields excluded by `@skip` or `@include` are not counted.
#[derive(Debug, Clone, Copy)]
pub struct QueryComplexity {
    max: usize,
}

impl QueryComplexity {
    /// A maximum of zero disables the check
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// The complexity of every operation in the document, in document order.
    ///
    /// Saturates at `usize::MAX`.
    pub fn measure(document: &ExecutableDocument, raw_variable_values: &JsonMap) -> Vec<usize> {
        let mut counter = Counter {
            document,
            variables: raw_variable_values,
            fragments: HashMap::default(),
            spreading: HashSet::default(),
        };
        document
            .operations
            .iter()
            .map(|operation| counter.selection_set(&operation.selection_set))
            .collect()
    }
}

impl ValidationRule for QueryComplexity {
    fn validate(
        &self,
        _schema: &Schema,
        document: &ExecutableDocument,
        raw_variable_values: &JsonMap,
    ) -> Vec<GraphQLError> {
        if self.max == 0 {
            return Vec::new();
        }
        document
            .operations
            .iter()
            .zip(Self::measure(document, raw_variable_values))
            .filter(|(_, complexity)| *complexity > self.max)
            .map(|(operation, complexity)| {
                GraphQLError::new(format!(
                    "Max query complexity should be {} but got {complexity}.",
                    self.max
                ))
                .with_location(operation.location())
            })
            .collect()
    }
}

struct Counter<'a> {
    document: &'a ExecutableDocument,
    variables: &'a JsonMap,
    /// Each fragment is counted once, then reused at every spread
    fragments: HashMap<Name, usize>,
    /// Fragments being counted, to stop on cycles
    spreading: HashSet<Name>,
}

impl Counter<'_> {
    fn selection_set(&mut self, selections: &[Selection]) -> usize {
        let mut total = 0usize;
        for selection in selections {
            if eval_if_arg(selection, "skip", self.variables).unwrap_or(false)
                || !eval_if_arg(selection, "include", self.variables).unwrap_or(true)
            {
                continue;
            }
            let count = match selection {
                Selection::Field(field) => {
                    1usize.saturating_add(self.selection_set(&field.selection_set))
                }
                Selection::InlineFragment(inline) => self.selection_set(&inline.selection_set),
                Selection::FragmentSpread(spread) => self.fragment(&spread.fragment_name),
            };
            total = total.saturating_add(count);
        }
        total
    }

    fn fragment(&mut self, name: &Name) -> usize {
        if let Some(count) = self.fragments.get(name) {
            return *count;
        }
        let document = self.document;
        let Some(fragment) = document.fragments.get(name) else {
            return 0;
        };
        if !self.spreading.insert(name.clone()) {
            return 0;
        }
        let count = self.selection_set(&fragment.selection_set);
        self.spreading.remove(name);
        self.fragments.insert(name.clone(), count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json_bytes::json;

    fn measure(source: &str, variables: serde_json_bytes::Value) -> Vec<usize> {
        let document = ExecutableDocument::parse(source).unwrap();
        let variables = variables.as_object().cloned().unwrap_or_default();
        QueryComplexity::measure(&document, &variables)
    }

    #[test]
    fn counts_nested_fields_and_fragments() {
        let source = r#"
            query { a { b c { d } } ...F }
            fragment F on Query { e { f } }
        "#;
        assert_eq!(measure(source, json!({})), [7]);
    }

    #[test]
    fn skipped_fields_are_free() {
        let source = r#"
            query($on: Boolean!) {
                a @include(if: $on) { b }
                c @skip(if: true)
                d
            }
        "#;
        assert_eq!(measure(source, json!({"on": false})), [1]);
        assert_eq!(measure(source, json!({"on": true})), [3]);
    }

    #[test]
    fn fragment_cycles_terminate() {
        let source = r#"
            { ...A }
            fragment A on Query { a ...B }
            fragment B on Query { b ...A }
        "#;
        assert_eq!(measure(source, json!({})), [2]);
    }

    /// `{ ...F0 }` where each fragment spreads the next one twice
    fn doubling_fragments(depth: usize) -> String {
        let mut source = String::from("{ ...F0 }\n");
        for i in 0..depth {
            source.push_str(&format!("fragment F{i} on Query {{ ...F{0} ...F{0} }}\n", i + 1));
        }
        source.push_str(&format!("fragment F{depth} on Query {{ a }}\n"));
        source
    }

    #[test]
    fn repeated_spreads_are_counted_without_rewalking() {
        assert_eq!(measure(&doubling_fragments(40), json!({})), [1 << 40]);
        assert_eq!(measure(&doubling_fragments(70), json!({})), [usize::MAX]);

        let document = ExecutableDocument::parse(&doubling_fragments(70)).unwrap();
        let schema = Schema::new(crate::SchemaConfig::new());
        let errors = QueryComplexity::new(1000).validate(&schema, &document, &JsonMap::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            format!("Max query complexity should be 1000 but got {}.", usize::MAX)
        );
    }
}
