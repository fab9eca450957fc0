//! Integration test: Server routes (pages, upload flow, API, downloads)

use fraud_shield::model::ModelConfig;
use fraud_shield::server::{create_router, AppState, ServerConfig};
use fraud_shield::store::StoreConfig;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

const BOUNDARY: &str = "fraud-shield-test-boundary";

/// Logistic artifact over V1..V8 + Amount where V1 decides the label.
const MARKER_ARTIFACT: &str = r#"{
    "model_type": "logistic_regression",
    "coefficients": [10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    "intercept": -5.0
}"#;

fn test_config(tag: &str, with_model: bool) -> ServerConfig {
    let models_dir =
        std::env::temp_dir().join(format!("fraud-shield-server-{}-{}", std::process::id(), tag));
    std::fs::create_dir_all(&models_dir).ok();

    let search_paths = if with_model {
        let artifact = models_dir.join("logistic_regression_fraud.json");
        std::fs::write(&artifact, MARKER_ARTIFACT).unwrap();
        vec![artifact]
    } else {
        vec![models_dir.join("absent.json")]
    };

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: None,
        max_upload_size: 10 * 1024 * 1024,
        models: ModelConfig::new().with_search_paths(search_paths),
        store: StoreConfig::default(),
    }
}

fn test_app(tag: &str) -> axum::Router {
    let config = test_config(tag, true);
    let state = Arc::new(AppState::new(config.clone()));
    create_router(state, &config)
}

/// Nine-column transaction CSV with V1 as the fraud marker.
fn sample_csv(markers: &[u8]) -> String {
    let mut csv = String::from("V1,V2,V3,V4,V5,V6,V7,V8,Amount\n");
    for m in markers {
        csv.push_str(&format!("{m},0,0,0,0,0,0,0,42.5\n"));
    }
    csv
}

fn multipart_body(field_name: &str, file_name: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

fn upload_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Pull the one-time token out of the results page download link.
fn extract_token(page: &str) -> String {
    let start = page.find("/download/").expect("page links a download") + "/download/".len();
    page[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app("health");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn test_system_status_endpoint() {
    let app = test_app("status");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["pipeline"]["total_analyses"].is_number());
    assert!(body["store"]["entries"].is_number());
}

#[tokio::test]
async fn test_root_serves_landing_page() {
    let app = test_app("landing");
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Fraud Shield"));
}

#[tokio::test]
async fn test_analyze_page_has_upload_form() {
    let app = test_app("form");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/analyze")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    assert!(page.contains("multipart/form-data"));
    assert!(page.contains("name=\"file\""));
}

#[tokio::test]
async fn test_predict_without_file_field_is_rejected() {
    let app = test_app("nofile");
    let body = multipart_body("other", "txns.csv", "V1\n1\n");
    let response = app.oneshot(upload_request("/predict", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("No file part in request"));
}

#[tokio::test]
async fn test_predict_rejects_malformed_csv() {
    let app = test_app("badcsv");
    // Ragged row: more fields than the header declares
    let body = multipart_body("file", "txns.csv", "a,b\n1,2,3,4\n");
    let response = app.oneshot(upload_request("/predict", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_without_model_returns_unavailable() {
    let config = test_config("nomodel", false);
    let state = Arc::new(AppState::new(config.clone()));
    let app = create_router(state, &config);

    let body = multipart_body("file", "txns.csv", &sample_csv(&[0, 0, 1]));
    let response = app.oneshot(upload_request("/predict", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_string(response).await.contains("Model not available"));
}

#[tokio::test]
async fn test_upload_scores_and_download_is_single_use() {
    let config = test_config("flow", true);
    let state = Arc::new(AppState::new(config.clone()));
    let app = create_router(state, &config);

    // Upload five transactions, one fraudulent
    let body = multipart_body("file", "txns.csv", &sample_csv(&[0, 0, 0, 0, 1]));
    let response = app
        .clone()
        .oneshot(upload_request("/predict", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    assert!(page.contains("HIGH"));
    assert!(page.contains("20.00%"));
    assert!(page.contains("txns.csv"));
    let token = extract_token(&page);
    assert!(!token.is_empty());

    // First download succeeds and is a CSV attachment
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/download/{token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"fraud_predictions.csv\""
    );
    let csv = body_string(response).await;
    assert!(csv.contains("Fraud Prediction"));
    assert!(csv.contains("Fraudulent"));

    // Second download of the same token is gone
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/download/{token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_download_with_unknown_token_is_gone() {
    let app = test_app("unknown");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/download/nosuchtoken")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
    assert!(body_string(response).await.contains("expired"));
}

#[tokio::test]
async fn test_api_analyze_returns_metrics_json() {
    let app = test_app("api");
    let body = multipart_body("file", "batch.csv", &sample_csv(&[0, 0, 0, 0, 1]));
    let response = app
        .oneshot(upload_request("/api/analyze", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["file"], "batch.csv");
    assert_eq!(json["rows"], 5);
    assert_eq!(json["metrics"]["fraud_count"], 1);
    assert_eq!(json["metrics"]["risk_level"], "HIGH");
    assert_eq!(json["charts"]["distribution"]["kind"], "pie");
    assert!(json["download_token"].is_string());
    assert!(json["report"].as_str().unwrap().contains("HIGH RISK"));
}

#[tokio::test]
async fn test_api_analyze_validation_error_is_json() {
    let app = test_app("apivalidation");
    let body = multipart_body("file", "tiny.csv", "a,b\n1,2\n");
    let response = app
        .oneshot(upload_request("/api/analyze", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"], true);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Data validation failed"));
}

#[tokio::test]
async fn test_unknown_api_route_returns_404() {
    let app = test_app("missing");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
