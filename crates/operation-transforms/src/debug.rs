use std::io::{self, Write};

use crate::operation;
use crate::transform::{Request, Transform};

/// Pass-through stage that dumps each request to a line-oriented sink:
/// the operation name, the pretty-printed operation definition and the
/// variable map as pretty JSON.
pub struct DebugTransform<W = io::Stdout> {
    sink: W,
}

impl DebugTransform<io::Stdout> {
    /// A debug stage writing to stdout.
    pub fn new() -> Self {
        DebugTransform { sink: io::stdout() }
    }
}

impl Default for DebugTransform<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> DebugTransform<W> {
    /// A debug stage writing to `sink`.
    pub fn with_sink(sink: W) -> Self {
        DebugTransform { sink }
    }
}

impl<W: Write> Transform for DebugTransform<W> {
    fn transform_request(&mut self, request: Request) -> Request {
        let operation = operation::required(&request.document);
        let name = request.operation_name.as_deref().unwrap_or("<anonymous>");
        let variables = serde_json::to_string_pretty(&request.variables).unwrap_or_default();
        // Diagnostics must never fail the pipeline; sink errors are dropped.
        let _ = writeln!(self.sink, "{name}\n{operation}{variables}");
        request
    }
}
