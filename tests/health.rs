use axum::http::StatusCode;
use foodgram_api::routes::health::health_data;

#[tokio::test]
async fn health_reports_database_state() {
    let (code, data) = health_data(true);
    assert_eq!(code, StatusCode::OK);

    let body = serde_json::to_value(&data).expect("serialize");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");

    let (code, data) = health_data(false);
    assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(serde_json::to_value(&data).expect("serialize")["status"], "degraded");
}
