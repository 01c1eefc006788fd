use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use timemanager_backend::docs;
use tower::ServiceExt;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn swagger_router() -> Router {
    let openapi = docs::ApiDoc::openapi();
    Router::new().merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", openapi))
}

#[test]
fn openapi_lists_kpi_paths_and_schemas() {
    let openapi = docs::ApiDoc::openapi();
    let json = serde_json::to_value(&openapi).expect("serialize openapi");

    let paths = json
        .get("paths")
        .and_then(Value::as_object)
        .expect("paths object");
    for path in [
        "/api/health",
        "/api/kpi/users/summary",
        "/api/kpi/users/export",
        "/api/kpi/teams/{team_id}/summary",
        "/api/kpi/admin/dashboard",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }

    let schemas = json
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .expect("schemas object");
    assert!(schemas.contains_key("AdminKpiDashboard"));
    assert!(schemas.contains_key("UserKpiSummary"));
}

#[tokio::test]
async fn openapi_json_is_served() {
    let response = swagger_router()
        .oneshot(
            Request::builder()
                .uri("/api-doc/openapi.json")
                .body(Body::empty())
                .expect("build openapi request"),
        )
        .await
        .expect("call openapi route");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.contains("json"));
}
