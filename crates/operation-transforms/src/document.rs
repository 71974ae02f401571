//! Splicing an operation into a template document.
//!
//! A template is an ordinary executable document containing the
//! [`SELECTIONS_MARKER`] field wherever the outer operation's selections
//! should be spliced in. The request half rewrites the template around the
//! outer operation; the result half unwraps the delegate's response at the
//! field path leading to the splice point.

use std::collections::{HashMap, HashSet};

use graphql_parser::query::{
    Definition, Directive, Document, Field, FragmentSpread, InlineFragment, Mutation,
    OperationDefinition, ParseError, Query, Selection, SelectionSet, Subscription, Value,
    VariableDefinition,
};

use crate::operation;
use crate::transform::{OperationDocument, Request, Response, Transform, Variables};

/// Field name marking the splice point inside template documents.
///
/// Embedded as an ordinary selection; it never survives into composed
/// output. Every selection set containing it receives a copy of the outer
/// operation's selections.
pub const SELECTIONS_MARKER: &str = "__SELECTIONS__";

/// Failure to build a transform from a template document.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template source is not a valid executable document.
    #[error("failed to parse template document: {0}")]
    Parse(#[from] ParseError),
    /// The template document has no operation definition to compose with.
    #[error("template document contains no operation definition")]
    MissingOperation,
}

/// Request half of [`DocumentTransform`]: splices the outer operation into
/// the template and reconciles the variables of both documents.
#[derive(Debug)]
pub struct DocumentRequest {
    template: Option<OperationDocument>,
    args: Variables,
    renamer: VariableRenamer,
}

impl DocumentRequest {
    /// Parses `template` and builds the request transform around it.
    ///
    /// `args` supplies values for template-declared variables that the
    /// outer request does not provide; they are looked up under the
    /// variable's original name even after a collision rename.
    pub fn new(template: &str, args: Variables) -> Result<Self, TemplateError> {
        let document = graphql_parser::parse_query::<String>(template)?.into_static();
        Self::from_document(document, args)
    }

    /// Builds the request transform around an already-parsed template.
    pub fn from_document(document: OperationDocument, args: Variables) -> Result<Self, TemplateError> {
        if operation::operation(&document).is_none() {
            return Err(TemplateError::MissingOperation);
        }
        Ok(DocumentRequest {
            template: Some(document),
            args,
            renamer: VariableRenamer::default(),
        })
    }

    /// A templateless transform that passes every request through.
    pub fn passthrough() -> Self {
        DocumentRequest {
            template: None,
            args: Variables::new(),
            renamer: VariableRenamer::default(),
        }
    }
}

impl Transform for DocumentRequest {
    fn transform_request(&mut self, mut request: Request) -> Request {
        let Some(template) = &self.template else {
            return request;
        };

        let outer_operation = operation::required(&request.document);
        let outer_declarations = operation::variable_definitions(outer_operation).to_vec();
        let outer_selections = operation::selection_set(outer_operation).items.clone();

        for declaration in &outer_declarations {
            self.renamer.reserve(declaration.name.clone());
        }

        let template_operation =
            operation::operation(template).expect("template operation verified at construction");

        // Final name of every declaration on the composed operation, paired
        // with the name its value is looked up under in `args`.
        let mut lookup: Vec<(String, String)> = outer_declarations
            .iter()
            .map(|declaration| (declaration.name.clone(), declaration.name.clone()))
            .collect();

        let mut declarations = outer_declarations;
        for declaration in operation::variable_definitions(template_operation) {
            let original = declaration.name.clone();
            let final_name = self.renamer.resolve(&original);
            let mut renamed = declaration.clone();
            renamed.name = final_name.clone();
            declarations.push(renamed);
            lookup.push((final_name, original));
        }

        let renames = self.renamer.mappings();
        let mut declarations = Some(declarations);
        let mut definitions = Vec::with_capacity(template.definitions.len());
        for definition in &template.definitions {
            match definition {
                Definition::Operation(operation) if declarations.is_some() => {
                    definitions.push(Definition::Operation(compose_operation(
                        operation,
                        declarations.take().unwrap_or_default(),
                        &outer_selections,
                        renames,
                    )));
                }
                other => definitions.push(other.clone()),
            }
        }

        let mut variables = std::mem::take(&mut request.variables);
        for (final_name, original) in lookup {
            if variables.contains_key(&final_name) {
                continue;
            }
            if let Some(value) = self.args.get(&original) {
                variables.insert(final_name, value.clone());
            }
        }

        request.document = Document { definitions };
        request.variables = variables;
        request
    }
}

/// Result half of [`DocumentTransform`]: replaces the response's data
/// section with the value found at the template's field path.
#[derive(Debug)]
pub struct DocumentResult {
    field_path: Vec<String>,
}

impl DocumentResult {
    /// Parses `template` and derives its field path.
    pub fn new(template: &str) -> Result<Self, TemplateError> {
        let document = graphql_parser::parse_query::<String>(template)?.into_static();
        Self::from_document(&document)
    }

    /// Derives the field path of an already-parsed template: the chain of
    /// field names from the operation root down to (but not into) the
    /// first selection set containing [`SELECTIONS_MARKER`]. Inline
    /// fragments contribute no segment. A template without the marker
    /// derives an empty path, making the transform an identity.
    pub fn from_document(document: &OperationDocument) -> Result<Self, TemplateError> {
        let operation = operation::operation(document).ok_or(TemplateError::MissingOperation)?;
        let mut field_path = Vec::new();
        if !locate_marker(operation::selection_set(operation), &mut field_path) {
            field_path.clear();
        }
        tracing::debug!(?field_path, "derived response field path");
        Ok(DocumentResult { field_path })
    }

    /// A templateless transform that passes every response through.
    pub fn passthrough() -> Self {
        DocumentResult { field_path: Vec::new() }
    }

    /// The derived field names, in root-to-leaf order.
    pub fn field_path(&self) -> &[String] {
        &self.field_path
    }
}

impl Transform for DocumentResult {
    fn transform_result(&self, mut response: Response) -> Response {
        let mut current = Some(std::mem::take(&mut response.data));
        for key in &self.field_path {
            current = match current {
                Some(serde_json::Value::Object(mut map)) => map.remove(key),
                _ => None,
            };
        }
        response.data = current.unwrap_or(serde_json::Value::Null);
        response
    }
}

/// Both halves of document composition under one transform: the request
/// phase splices the outer operation into the template, the result phase
/// unwraps the response at the matching field path.
#[derive(Debug)]
pub struct DocumentTransform {
    request: DocumentRequest,
    result: DocumentResult,
}

impl DocumentTransform {
    /// Parses `template` once and builds both halves from it.
    pub fn new(template: &str, args: Variables) -> Result<Self, TemplateError> {
        let document = graphql_parser::parse_query::<String>(template)?.into_static();
        Self::from_document(document, args)
    }

    /// Builds both halves from an already-parsed template.
    pub fn from_document(document: OperationDocument, args: Variables) -> Result<Self, TemplateError> {
        let result = DocumentResult::from_document(&document)?;
        let request = DocumentRequest::from_document(document, args)?;
        Ok(DocumentTransform { request, result })
    }

    /// A templateless transform: both phases pass their input through.
    pub fn passthrough() -> Self {
        DocumentTransform {
            request: DocumentRequest::passthrough(),
            result: DocumentResult::passthrough(),
        }
    }
}

impl Transform for DocumentTransform {
    fn transform_request(&mut self, request: Request) -> Request {
        self.request.transform_request(request)
    }

    fn transform_result(&self, response: Response) -> Response {
        self.result.transform_result(response)
    }
}

/// Collision-safe renaming of template variables.
///
/// All three pieces of state live for the whole life of the owning
/// transform and are never reset: an original name that was renamed keeps
/// its generated name, and generated names are never freed, so repeated
/// compositions keep drawing fresh counter values instead of reusing names
/// from an earlier call.
#[derive(Debug, Default)]
struct VariableRenamer {
    taken: HashSet<String>,
    renames: HashMap<String, String>,
    counter: usize,
}

impl VariableRenamer {
    fn reserve(&mut self, name: String) {
        self.taken.insert(name);
    }

    fn resolve(&mut self, name: &str) -> String {
        if let Some(renamed) = self.renames.get(name) {
            return renamed.clone();
        }
        if self.taken.contains(name) {
            let generated = self.generate(name);
            tracing::debug!(original = name, renamed = %generated, "renaming colliding template variable");
            self.taken.insert(generated.clone());
            self.renames.insert(name.to_owned(), generated.clone());
            return generated;
        }
        self.taken.insert(name.to_owned());
        name.to_owned()
    }

    fn generate(&mut self, original: &str) -> String {
        loop {
            let candidate = format!("_v{}_{original}", self.counter);
            self.counter += 1;
            if !self.taken.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn mappings(&self) -> &HashMap<String, String> {
        &self.renames
    }
}

fn compose_operation(
    operation: &OperationDefinition<'static, String>,
    declarations: Vec<VariableDefinition<'static, String>>,
    outer_selections: &[Selection<'static, String>],
    renames: &HashMap<String, String>,
) -> OperationDefinition<'static, String> {
    match operation {
        OperationDefinition::SelectionSet(set) => {
            let selection_set = splice_selection_set(set, outer_selections, renames);
            if declarations.is_empty() {
                OperationDefinition::SelectionSet(selection_set)
            } else {
                // The shorthand form cannot carry variable declarations.
                OperationDefinition::Query(Query {
                    position: set.span.0,
                    name: None,
                    variable_definitions: declarations,
                    directives: Vec::new(),
                    selection_set,
                })
            }
        }
        OperationDefinition::Query(query) => OperationDefinition::Query(Query {
            position: query.position,
            name: query.name.clone(),
            variable_definitions: declarations,
            directives: rename_directives(&query.directives, renames),
            selection_set: splice_selection_set(&query.selection_set, outer_selections, renames),
        }),
        OperationDefinition::Mutation(mutation) => OperationDefinition::Mutation(Mutation {
            position: mutation.position,
            name: mutation.name.clone(),
            variable_definitions: declarations,
            directives: rename_directives(&mutation.directives, renames),
            selection_set: splice_selection_set(&mutation.selection_set, outer_selections, renames),
        }),
        OperationDefinition::Subscription(subscription) => {
            OperationDefinition::Subscription(Subscription {
                position: subscription.position,
                name: subscription.name.clone(),
                variable_definitions: declarations,
                directives: rename_directives(&subscription.directives, renames),
                selection_set: splice_selection_set(
                    &subscription.selection_set,
                    outer_selections,
                    renames,
                ),
            })
        }
    }
}

/// Rebuilds a template selection set, renaming variable references on the
/// way down. A set containing the marker drops the marker and receives the
/// outer selections after its remaining siblings; the spliced-in outer
/// selections are inserted as-is and never revisited.
fn splice_selection_set(
    set: &SelectionSet<'static, String>,
    outer_selections: &[Selection<'static, String>],
    renames: &HashMap<String, String>,
) -> SelectionSet<'static, String> {
    let mut items = Vec::with_capacity(set.items.len());
    let mut found_marker = false;
    for selection in &set.items {
        match selection {
            Selection::Field(field) if field.name == SELECTIONS_MARKER => found_marker = true,
            Selection::Field(field) => items.push(Selection::Field(Field {
                position: field.position,
                alias: field.alias.clone(),
                name: field.name.clone(),
                arguments: rename_arguments(&field.arguments, renames),
                directives: rename_directives(&field.directives, renames),
                selection_set: splice_selection_set(&field.selection_set, outer_selections, renames),
            })),
            Selection::InlineFragment(fragment) => {
                items.push(Selection::InlineFragment(InlineFragment {
                    position: fragment.position,
                    type_condition: fragment.type_condition.clone(),
                    directives: rename_directives(&fragment.directives, renames),
                    selection_set: splice_selection_set(
                        &fragment.selection_set,
                        outer_selections,
                        renames,
                    ),
                }))
            }
            Selection::FragmentSpread(spread) => {
                items.push(Selection::FragmentSpread(FragmentSpread {
                    position: spread.position,
                    fragment_name: spread.fragment_name.clone(),
                    directives: rename_directives(&spread.directives, renames),
                }))
            }
        }
    }
    if found_marker {
        items.extend(outer_selections.iter().cloned());
    }
    SelectionSet {
        span: set.span,
        items,
    }
}

fn rename_arguments(
    arguments: &[(String, Value<'static, String>)],
    renames: &HashMap<String, String>,
) -> Vec<(String, Value<'static, String>)> {
    arguments
        .iter()
        .map(|(name, value)| (name.clone(), rename_value(value, renames)))
        .collect()
}

fn rename_directives(
    directives: &[Directive<'static, String>],
    renames: &HashMap<String, String>,
) -> Vec<Directive<'static, String>> {
    directives
        .iter()
        .map(|directive| Directive {
            position: directive.position,
            name: directive.name.clone(),
            arguments: rename_arguments(&directive.arguments, renames),
        })
        .collect()
}

fn rename_value(
    value: &Value<'static, String>,
    renames: &HashMap<String, String>,
) -> Value<'static, String> {
    match value {
        Value::Variable(name) => match renames.get(name) {
            Some(renamed) => Value::Variable(renamed.clone()),
            None => Value::Variable(name.clone()),
        },
        Value::List(values) => Value::List(
            values
                .iter()
                .map(|value| rename_value(value, renames))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), rename_value(value, renames)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn contains_marker(set: &SelectionSet<'static, String>) -> bool {
    set.items
        .iter()
        .any(|selection| matches!(selection, Selection::Field(field) if field.name == SELECTIONS_MARKER))
}

fn locate_marker(set: &SelectionSet<'static, String>, path: &mut Vec<String>) -> bool {
    if contains_marker(set) {
        return true;
    }
    for selection in &set.items {
        match selection {
            Selection::Field(field) => {
                if field.selection_set.items.is_empty() {
                    continue;
                }
                path.push(field.name.clone());
                if locate_marker(&field.selection_set, path) {
                    return true;
                }
                path.pop();
            }
            Selection::InlineFragment(fragment) => {
                if locate_marker(&fragment.selection_set, path) {
                    return true;
                }
            }
            Selection::FragmentSpread(_) => {}
        }
    }
    false
}
