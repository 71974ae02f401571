use graphql_parser::query::Selection;

use crate::nest::field_segments;
use crate::operation;
use crate::transform::{Request, Response, Transform};

/// Descends into a selection tree along a dotted path and returns the
/// selections found there. An empty path returns the input unchanged;
/// numeric segments are dropped.
///
/// At each step only the first selection of the current list is inspected:
/// a field matching the segment is descended into (or, when it has no
/// children, the list is narrowed to the fields of that name); an inline
/// fragment is looked through transparently; anything else leaves the
/// list untouched. Documents composed through this crate have a single
/// dominant selection per level, which is the only shape this policy is
/// meant for.
pub fn pick(
    path: &str,
    selections: Vec<Selection<'static, String>>,
) -> Vec<Selection<'static, String>> {
    field_segments(path).fold(selections, pick_field)
}

fn pick_field(
    selections: Vec<Selection<'static, String>>,
    segment: &str,
) -> Vec<Selection<'static, String>> {
    let mut rest = selections.into_iter();
    let Some(first) = rest.next() else {
        return Vec::new();
    };
    match first {
        Selection::Field(field) if field.name == segment => {
            if field.selection_set.items.is_empty() {
                std::iter::once(Selection::Field(field))
                    .chain(rest)
                    .filter(|selection| {
                        matches!(selection, Selection::Field(field) if field.name == segment)
                    })
                    .collect()
            } else {
                field.selection_set.items
            }
        }
        Selection::InlineFragment(fragment) => pick_field(fragment.selection_set.items, segment),
        other => std::iter::once(other).chain(rest).collect(),
    }
}

/// Rebuilds a nested data value with `value` placed at the end of a dotted
/// path. Each numeric segment produces an array indexed by it (earlier
/// slots null), every other segment a single-key object. An empty path
/// returns `value` itself.
pub fn assign(path: &str, value: serde_json::Value) -> serde_json::Value {
    let segments: Vec<&str> = path.split('.').filter(|segment| !segment.is_empty()).collect();
    let mut current = value;
    for segment in segments.into_iter().rev() {
        current = match segment.parse::<usize>() {
            Ok(index) => {
                let mut items = vec![serde_json::Value::Null; index];
                items.push(current);
                serde_json::Value::Array(items)
            }
            Err(_) => {
                let mut map = serde_json::Map::new();
                map.insert(segment.to_owned(), current);
                serde_json::Value::Object(map)
            }
        };
    }
    current
}

/// Narrows the operation to the selections found at a dotted path, and
/// re-nests the response data under the same path on the way back.
#[derive(Debug)]
pub struct PickTransform {
    path: Option<String>,
}

impl PickTransform {
    /// A transform narrowing the operation to `path`.
    pub fn new(path: impl Into<String>) -> Self {
        PickTransform {
            path: Some(path.into()),
        }
    }

    /// A pathless transform that passes requests and responses through.
    pub fn passthrough() -> Self {
        PickTransform { path: None }
    }
}

impl Transform for PickTransform {
    fn transform_request(&mut self, mut request: Request) -> Request {
        let Some(path) = &self.path else {
            return request;
        };
        let operation = operation::required_mut(&mut request.document);
        let set = operation::selection_set_mut(operation);
        let items = std::mem::take(&mut set.items);
        set.items = pick(path, items);
        request
    }

    fn transform_result(&self, mut response: Response) -> Response {
        let Some(path) = &self.path else {
            return response;
        };
        let data = std::mem::take(&mut response.data);
        response.data = assign(path, data);
        response
    }
}
