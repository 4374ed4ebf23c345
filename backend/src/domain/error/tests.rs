//! Construction, validation, and serialisation of domain errors.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("twice"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::not_implemented("later"), ErrorCode::NotImplemented)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn shorthand_constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = Error::new(ErrorCode::NotFound, "");
    assert_eq!(error.message(), "not found");
}

#[rstest]
fn try_with_trace_id_rejects_blank_values() {
    let result = Error::internal("boom").try_with_trace_id(" ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[rstest]
fn trace_id_is_absent_outside_request_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn trace_id_is_captured_inside_request_scope() {
    let trace_id = TraceId::generate();
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(trace_id.to_string().as_str()));
}

#[rstest]
fn serialises_camel_case_envelope() {
    let error = Error::conflict("post already exists")
        .with_trace_id("abc")
        .with_details(json!({ "postId": 123 }));
    let value = serde_json::to_value(&error).expect("serialise");
    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "post already exists",
            "traceId": "abc",
            "details": { "postId": 123 },
        })
    );
}

#[rstest]
fn deserialise_rejects_blank_message() {
    let payload = json!({ "code": "not_found", "message": "  " });
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
