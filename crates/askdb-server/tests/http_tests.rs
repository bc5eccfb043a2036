//! HTTP boundary tests against a real listener with a mocked pipeline

use askdb_llm::MockModel;
use askdb_pipeline::Pipeline;
use askdb_server::create_router;
use askdb_store::MockStore;
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::sync::Arc;

fn test_pipeline() -> Arc<Pipeline> {
    let store = MockStore::builder()
        .with_table("Employee")
        .with_table_info("CREATE TABLE Employee (EmployeeId INTEGER, LastName TEXT)")
        .with_default_result("COUNT(EmployeeId)\n8")
        .build();
    let model = MockModel::builder()
        .with_query("SELECT COUNT(EmployeeId) FROM Employee")
        .with_answer("There are 8 employees.")
        .build();
    Arc::new(Pipeline::new(Arc::new(store), Arc::new(model), 10))
}

fn failing_pipeline() -> Arc<Pipeline> {
    let store = MockStore::builder()
        .with_table("Employee")
        .with_table_info("CREATE TABLE Employee (EmployeeId INTEGER)")
        .build();
    let model = MockModel::builder()
        .with_structured_failure("backend down")
        .build();
    Arc::new(Pipeline::new(Arc::new(store), Arc::new(model), 10))
}

async fn spawn_server(pipeline: Arc<Pipeline>) -> SocketAddr {
    let app = create_router(pipeline);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn health_endpoint() {
    let addr = spawn_server(test_pipeline()).await;
    let body: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn ask_returns_ordered_stage_updates() {
    let addr = spawn_server(test_pipeline()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/ask", addr))
        .json(&serde_json::json!({ "question": "How many Employees are there?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!([
            {"write_query": {"query": "SELECT COUNT(EmployeeId) FROM Employee"}},
            {"execute_query": {"result": "COUNT(EmployeeId)\n8"}},
            {"generate_answer": {"answer": "There are 8 employees."}},
        ])
    );
}

#[tokio::test]
async fn empty_question_is_unprocessable() {
    let addr = spawn_server(test_pipeline()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/ask", addr))
        .json(&serde_json::json!({ "question": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn missing_question_field_is_unprocessable() {
    let addr = spawn_server(test_pipeline()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/ask", addr))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn model_failure_is_a_server_error() {
    let addr = spawn_server(failing_pipeline()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/ask", addr))
        .json(&serde_json::json!({ "question": "anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
}
