//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error() -> Error {
    Error::internal("pool exhausted at db-3")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"host": "db-3"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("exists"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::not_implemented("later"), StatusCode::NOT_IMPLEMENTED)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn render(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error envelope");
    (status, header, body)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id(internal_error: Error) {
    let (status, header, body) = render(&internal_error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body.code(), ErrorCode::InternalError);
    assert_eq!(body.message(), "Internal server error");
    assert_eq!(body.trace_id(), Some(TRACE_ID));
    assert!(body.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_pass_through_unchanged() {
    let error = Error::conflict("users/u1 already exists").with_details(json!({"field": "id"}));
    let (status, header, body) = render(&error).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(header.is_none());
    assert_eq!(body, error);
}

#[rstest]
fn actix_errors_become_redacted_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
}

#[derive(serde::Deserialize)]
struct Page {
    limit: u8,
}

#[rstest]
#[actix_web::test]
async fn malformed_queries_render_invalid_request() {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .route(
                "/",
                web::get().to(|page: web::Query<Page>| async move { page.limit.to_string() }),
            ),
    )
    .await;
    let request = actix_test::TestRequest::get().uri("/?limit=many").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Error = actix_test::read_body_json(response).await;
    assert_eq!(body.code(), ErrorCode::InvalidRequest);
}
