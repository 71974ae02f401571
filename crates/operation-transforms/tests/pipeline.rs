//! Drives the transforms the way a delegation layer does: request phases
//! applied in order, the final request dispatched, result phases applied
//! in reverse.

#![allow(unused_crate_dependencies)]

use indoc::indoc;
use operation_transforms::{
    DocumentTransform, PickTransform, Request, Response, Transform, Variables,
};
use serde_json::json;

fn apply_request_transforms(transforms: &mut [&mut dyn Transform], request: Request) -> Request {
    transforms
        .iter_mut()
        .fold(request, |request, transform| transform.transform_request(request))
}

fn apply_result_transforms(transforms: &[&dyn Transform], response: Response) -> Response {
    transforms
        .iter()
        .rev()
        .fold(response, |response, transform| transform.transform_result(response))
}

fn canonical(source: &str) -> String {
    graphql_parser::parse_query::<String>(source)
        .expect("valid document")
        .to_string()
}

#[test]
fn round_trips_a_delegated_request() {
    let mut pick = PickTransform::new("node");
    let mut document = DocumentTransform::new(
        indoc! {"
            {
              user {
                ... on User {
                  __SELECTIONS__
                }
              }
            }
        "},
        Variables::new(),
    )
    .unwrap();

    let request = Request::parse("{ node { id } }").unwrap();
    let request = apply_request_transforms(&mut [&mut pick, &mut document], request);

    assert_eq!(
        request.document.to_string(),
        canonical("{ user { ... on User { id } } }")
    );

    // What the delegate answers for the composed document.
    let delegate_response = Response::new(json!({"user": {"id": "abc"}}));

    let response = apply_result_transforms(&[&pick, &document], delegate_response);
    assert_eq!(response.data, json!({"node": {"id": "abc"}}));
}

#[test]
fn carries_variables_and_errors_through_the_pipeline() {
    let mut pick = PickTransform::new("node");
    let mut document = DocumentTransform::new(
        indoc! {"
            query Wrapped($token: ID) {
              user {
                ... on User {
                  __SELECTIONS__
                }
                meta(token: $token)
              }
            }
        "},
        json!({"token": "t-1"})
            .as_object()
            .cloned()
            .expect("an object literal"),
    )
    .unwrap();

    let request = Request::parse("query ($id: ID!) { node(id: $id) { id } }")
        .unwrap()
        .with_variables(
            json!({"id": 1})
                .as_object()
                .cloned()
                .expect("an object literal"),
        );

    let request = apply_request_transforms(&mut [&mut pick, &mut document], request);

    assert_eq!(
        request.document.to_string(),
        canonical(indoc! {"
            query Wrapped($id: ID!, $token: ID) {
              user {
                ... on User {
                  id
                }
                meta(token: $token)
              }
            }
        "})
    );
    assert_eq!(
        request.variables,
        json!({"id": 1, "token": "t-1"})
            .as_object()
            .cloned()
            .expect("an object literal")
    );

    // A wire payload with partial data and errors, as delegates send them.
    let delegate_response: Response = serde_json::from_value(json!({
        "data": {"user": {"id": 1}},
        "errors": [{"message": "meta unavailable"}],
    }))
    .unwrap();

    let response = apply_result_transforms(&[&pick, &document], delegate_response);
    assert_eq!(response.data, json!({"node": {"id": 1}}));
    assert_eq!(response.errors, vec![json!({"message": "meta unavailable"})]);
}
