//! # Operation Transforms
//!
//! Composable request/response transforms for GraphQL operations that are
//! delegated to another service. A pipeline applies every transform's
//! request phase in order, sends the final request to the delegate, then
//! applies the result phases in reverse order, reshaping the response back
//! into what the caller asked for.
//!
//! The available stages:
//!
//! - [`NestTransform`] / [`nest()`]: re-root the operation under a dotted
//!   path of fields
//! - [`PickTransform`] / [`pick()`]: narrow the operation to the
//!   selections at a dotted path, re-nesting response data with
//!   [`assign()`] on the way back
//! - [`InlineFragmentTransform`]: guard the operation behind an inline
//!   type condition
//! - [`DocumentTransform`]: splice the operation into a template document
//!   at every [`SELECTIONS_MARKER`] occurrence, renaming colliding
//!   variables and unwrapping the response at the splice point's field
//!   path
//! - [`DebugTransform`]: dump the request to a sink and pass it through
//!
//! Operation documents are `graphql_parser` trees owned by the request;
//! every transform returns a rewritten request or response rather than
//! mutating shared state, so stages compose in any order.

#![deny(missing_docs)]

mod debug;
mod document;
mod inline_fragment;
mod nest;
mod operation;
mod pick;
mod transform;


pub use debug::DebugTransform;
pub use document::{
    DocumentRequest, DocumentResult, DocumentTransform, TemplateError, SELECTIONS_MARKER,
};
pub use inline_fragment::InlineFragmentTransform;
pub use nest::{nest, NestTransform};
pub use pick::{assign, pick, PickTransform};
pub use transform::{OperationDocument, Request, Response, Transform, Variables};
