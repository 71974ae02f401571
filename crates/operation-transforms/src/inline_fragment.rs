use graphql_parser::query::{InlineFragment, Selection, TypeCondition};

use crate::operation;
use crate::transform::{Request, Transform};

/// Re-roots the operation's selections under an inline `... on Type`
/// fragment, guarding them behind a type condition.
#[derive(Debug)]
pub struct InlineFragmentTransform {
    type_condition: Option<String>,
}

impl InlineFragmentTransform {
    /// A transform wrapping the operation in `... on <type_condition>`.
    pub fn new(type_condition: impl Into<String>) -> Self {
        InlineFragmentTransform {
            type_condition: Some(type_condition.into()),
        }
    }

    /// A conditionless transform that passes every request through.
    pub fn passthrough() -> Self {
        InlineFragmentTransform {
            type_condition: None,
        }
    }
}

impl Transform for InlineFragmentTransform {
    fn transform_request(&mut self, mut request: Request) -> Request {
        let Some(type_condition) = &self.type_condition else {
            return request;
        };
        let operation = operation::required_mut(&mut request.document);
        let set = operation::selection_set_mut(operation);
        let items = std::mem::take(&mut set.items);
        set.items = vec![Selection::InlineFragment(InlineFragment {
            position: operation::synthetic_pos(),
            type_condition: Some(TypeCondition::On(type_condition.clone())),
            directives: Vec::new(),
            selection_set: operation::synthetic_selection_set(items),
        })];
        request
    }
}
