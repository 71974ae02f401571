use graphql_parser::query::{Document, ParseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An operation document with all of its text owned by the tree itself,
/// detached from the source string it was parsed from.
pub type OperationDocument = Document<'static, String>;

/// Variable values keyed by variable name.
///
/// Backed by a `serde_json` map with `preserve_order`, so entries keep
/// their insertion order through composition and serialization.
pub type Variables = serde_json::Map<String, Value>;

/// A request on its way to a delegate service.
#[derive(Debug, Clone)]
pub struct Request {
    /// The operation document to execute.
    pub document: OperationDocument,
    /// Values for the variables declared by the document's operation.
    pub variables: Variables,
    /// Which operation to execute, for documents defining more than one.
    pub operation_name: Option<String>,
}

impl Request {
    /// Wraps a parsed document with an empty variable map.
    pub fn new(document: OperationDocument) -> Self {
        Request {
            document,
            variables: Variables::new(),
            operation_name: None,
        }
    }

    /// Parses `query` and wraps the resulting document.
    pub fn parse(query: &str) -> Result<Self, ParseError> {
        Ok(Self::new(graphql_parser::parse_query::<String>(query)?.into_static()))
    }

    /// Replaces the request's variable map.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }
}

/// A delegate response on its way back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The data section. Transforms reshape this; a failed extraction
    /// degrades it to `null` rather than erroring.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    /// Errors reported by the delegate, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,
    /// Free-form extensions, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl Response {
    /// Wraps a data section with no errors or extensions.
    pub fn new(data: Value) -> Self {
        Response {
            data,
            ..Response::default()
        }
    }
}

/// One stage of a request/response pipeline.
///
/// A runner applies every stage's request phase in order, dispatches the
/// final request to the delegate, then applies the result phases in
/// reverse order. Both phases default to passing their input through
/// unchanged, so a stage implements only the half it needs.
pub trait Transform {
    /// Rewrites an outgoing request.
    ///
    /// Takes `&mut self` because some stages carry bookkeeping between
    /// invocations; a single stage is meant for strictly sequential use.
    fn transform_request(&mut self, request: Request) -> Request {
        request
    }

    /// Rewrites a response on its way back through the pipeline.
    ///
    /// Read-only: result stages are immutable after construction and may
    /// be shared freely.
    fn transform_result(&self, response: Response) -> Response {
        response
    }
}
