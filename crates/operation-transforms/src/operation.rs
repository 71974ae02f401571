//! Access to the operation definition of a parsed document.

use graphql_parser::query::{
    Definition, Document, OperationDefinition, Selection, SelectionSet, VariableDefinition,
};
use graphql_parser::Pos;

pub(crate) fn operation<'a>(
    document: &'a Document<'static, String>,
) -> Option<&'a OperationDefinition<'static, String>> {
    document.definitions.iter().find_map(|definition| match definition {
        Definition::Operation(operation) => Some(operation),
        Definition::Fragment(_) => None,
    })
}

pub(crate) fn operation_mut<'a>(
    document: &'a mut Document<'static, String>,
) -> Option<&'a mut OperationDefinition<'static, String>> {
    document.definitions.iter_mut().find_map(|definition| match definition {
        Definition::Operation(operation) => Some(operation),
        Definition::Fragment(_) => None,
    })
}

/// Callers must hand us documents with an operation definition; anything
/// else is malformed input, surfaced immediately.
pub(crate) fn required<'a>(document: &'a Document<'static, String>) -> &'a OperationDefinition<'static, String> {
    operation(document).expect("document contains no operation definition")
}

pub(crate) fn required_mut<'a>(
    document: &'a mut Document<'static, String>,
) -> &'a mut OperationDefinition<'static, String> {
    operation_mut(document).expect("document contains no operation definition")
}

pub(crate) fn selection_set<'a>(
    operation: &'a OperationDefinition<'static, String>,
) -> &'a SelectionSet<'static, String> {
    match operation {
        OperationDefinition::SelectionSet(set) => set,
        OperationDefinition::Query(query) => &query.selection_set,
        OperationDefinition::Mutation(mutation) => &mutation.selection_set,
        OperationDefinition::Subscription(subscription) => &subscription.selection_set,
    }
}

pub(crate) fn selection_set_mut<'a>(
    operation: &'a mut OperationDefinition<'static, String>,
) -> &'a mut SelectionSet<'static, String> {
    match operation {
        OperationDefinition::SelectionSet(set) => set,
        OperationDefinition::Query(query) => &mut query.selection_set,
        OperationDefinition::Mutation(mutation) => &mut mutation.selection_set,
        OperationDefinition::Subscription(subscription) => &mut subscription.selection_set,
    }
}

/// The shorthand selection-set form declares no variables.
pub(crate) fn variable_definitions<'a>(
    operation: &'a OperationDefinition<'static, String>,
) -> &'a [VariableDefinition<'static, String>] {
    match operation {
        OperationDefinition::SelectionSet(_) => &[],
        OperationDefinition::Query(query) => &query.variable_definitions,
        OperationDefinition::Mutation(mutation) => &mutation.variable_definitions,
        OperationDefinition::Subscription(subscription) => &subscription.variable_definitions,
    }
}

pub(crate) fn synthetic_pos() -> Pos {
    Pos { line: 0, column: 0 }
}

pub(crate) fn synthetic_selection_set(
    items: Vec<Selection<'static, String>>,
) -> SelectionSet<'static, String> {
    SelectionSet {
        span: (synthetic_pos(), synthetic_pos()),
        items,
    }
}
