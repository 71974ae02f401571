use graphql_parser::query::{Field, Selection};

use crate::operation;
use crate::transform::{Request, Transform};

/// Field-name segments of a dotted path. Numeric list indices and empty
/// segments carry no meaning for selection trees and are dropped.
pub(crate) fn field_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
        .filter(|segment| !segment.is_empty() && segment.parse::<usize>().is_err())
}

/// Builds a singly-nested chain of field selections from a dotted path.
///
/// The innermost field receives `selections` as its children; passing an
/// empty list produces a leaf field. An empty path returns `selections`
/// unchanged.
pub fn nest(
    path: &str,
    selections: Vec<Selection<'static, String>>,
) -> Vec<Selection<'static, String>> {
    let segments: Vec<&str> = field_segments(path).collect();
    let mut current = selections;
    for segment in segments.into_iter().rev() {
        current = vec![Selection::Field(Field {
            position: operation::synthetic_pos(),
            alias: None,
            name: segment.to_owned(),
            arguments: Vec::new(),
            directives: Vec::new(),
            selection_set: operation::synthetic_selection_set(current),
        })];
    }
    current
}

/// Re-roots the operation's selection set under a dotted path of fields.
#[derive(Debug)]
pub struct NestTransform {
    path: Option<String>,
}

impl NestTransform {
    /// A transform nesting the operation under `path`.
    pub fn new(path: impl Into<String>) -> Self {
        NestTransform {
            path: Some(path.into()),
        }
    }

    /// A pathless transform that passes every request through.
    pub fn passthrough() -> Self {
        NestTransform { path: None }
    }
}

impl Transform for NestTransform {
    fn transform_request(&mut self, mut request: Request) -> Request {
        let Some(path) = &self.path else {
            return request;
        };
        let operation = operation::required_mut(&mut request.document);
        let set = operation::selection_set_mut(operation);
        let items = std::mem::take(&mut set.items);
        set.items = nest(path, items);
        request
    }
}
