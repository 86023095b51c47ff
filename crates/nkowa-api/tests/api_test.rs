//! HTTP behavior tests against a live router over the in-memory store.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use nkowa_api::config::ServerConfig;
use nkowa_api::{build_router, AppState};
use nkowa_db::MemoryStore;

const UID: &str = "editor-uid";

struct TestServer {
    base_url: String,
    client: Client,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn create_word(&self, body: Value) -> Value {
        let response = self
            .client
            .post(self.url("/wordSuggestions"))
            .header("x-user-uid", UID)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.unwrap()
    }

    async fn list_words(&self, query: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .get(self.url("/wordSuggestions"))
            .query(query)
            .send()
            .await
            .unwrap()
    }
}

async fn spawn_test_server() -> TestServer {
    let config = ServerConfig::default();
    let app = build_router(AppState::in_memory(MemoryStore::new()), &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        client: Client::new(),
    }
}

fn word_body(word: &str) -> Value {
    json!({
        "word": word,
        "wordClass": "NNC",
        "definitions": [format!("meaning of {}", word)],
    })
}

// -- Create --

#[tokio::test]
async fn test_create_returns_generated_id_and_nested_examples() {
    let server = spawn_test_server().await;
    let mut body = word_body("ndewo");
    body["examples"] = json!([{ "igbo": "Ndewo", "english": "Hello" }]);
    body["dialects"] = json!([{ "dialect": "Onitsha", "word": "ndeewo" }]);

    let created = server.create_word(body).await;
    assert!(uuid::Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());
    assert_eq!(created["authorId"], UID);
    assert_eq!(created["examples"][0]["igbo"], "Ndewo");
    assert_eq!(created["examples"][0]["exampleForSuggestion"], true);
    assert_eq!(created["dialects"][0]["dialect"], "Onitsha");
}

#[tokio::test]
async fn test_create_without_uid_is_rejected() {
    let server = spawn_test_server().await;
    let response = server
        .client
        .post(server.url("/wordSuggestions"))
        .json(&word_body("ji"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "User uid is required");
}

#[tokio::test]
async fn test_create_with_malformed_data_is_rejected() {
    let server = spawn_test_server().await;
    let cases = [
        json!({ "wordClass": "NNC", "definitions": ["x"] }),
        json!({ "word": "ji", "wordClass": "NOPE", "definitions": ["x"] }),
        json!({ "word": "ji", "wordClass": "NNC", "definitions": [] }),
        json!({ "word": "ji", "wordClass": "NNC", "definitions": ["x"], "originalWordId": "bad" }),
        json!({ "word": "ji", "wordClass": "NNC", "definitions": "not-a-list" }),
    ];
    for body in cases {
        let response = server
            .client
            .post(server.url("/wordSuggestions"))
            .header("x-user-uid", UID)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let error: Value = response.json().await.unwrap();
        assert!(error["error"].is_string());
    }
}

#[tokio::test]
async fn test_create_rejects_non_json_body() {
    let server = spawn_test_server().await;
    let response = server
        .client
        .post(server.url("/wordSuggestions"))
        .header("x-user-uid", UID)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Ids --

#[tokio::test]
async fn test_invalid_ids_are_rejected() {
    let server = spawn_test_server().await;

    let response = server
        .client
        .get(server.url("/wordSuggestions/not-an-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid word suggestion id provided");

    let response = server
        .client
        .put(server.url("/wordSuggestions/not-an-id"))
        .header("x-user-uid", UID)
        .json(&word_body("ji"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client
        .delete(server.url("/exampleSuggestions/123"))
        .header("x-user-uid", UID)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let server = spawn_test_server().await;
    let missing = uuid::Uuid::now_v7();

    let response = server
        .client
        .get(server.url(&format!("/wordSuggestions/{}", missing)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .client
        .put(server.url(&format!("/wordSuggestions/{}", missing)))
        .header("x-user-uid", UID)
        .json(&word_body("ji"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Update --

#[tokio::test]
async fn test_update_syncs_nested_examples() {
    let server = spawn_test_server().await;
    let mut body = word_body("bia");
    body["examples"] = json!([
        { "igbo": "Bia ebe a", "english": "Come here" },
        { "igbo": "Bịa echi", "english": "Come tomorrow" },
    ]);
    let created = server.create_word(body).await;
    let id = created["id"].as_str().unwrap();
    let kept_id = created["examples"][0]["id"].as_str().unwrap().to_string();
    let removed_id = created["examples"][1]["id"].as_str().unwrap().to_string();

    let mut update = created.clone();
    update["examples"] = json!([
        { "id": kept_id, "igbo": "Bia ebe a ugbu a", "english": "Come here now" },
        { "igbo": "Abịala m", "english": "I have come" },
    ]);
    let response = server
        .client
        .put(server.url(&format!("/wordSuggestions/{}", id)))
        .header("x-user-uid", "another-editor")
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();

    let examples = updated["examples"].as_array().unwrap();
    assert_eq!(examples.len(), 2);
    assert_eq!(examples[0]["id"], kept_id.as_str());
    assert_eq!(examples[0]["igbo"], "Bia ebe a ugbu a");
    assert_eq!(examples[1]["igbo"], "Abịala m");
    assert_eq!(updated["authorId"], UID);

    let response = server
        .client
        .get(server.url(&format!("/exampleSuggestions/{}", removed_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rejects_mismatched_and_foreign_ids() {
    let server = spawn_test_server().await;
    let first = server.create_word(word_body("a")).await;
    let mut with_example = word_body("b");
    with_example["examples"] = json!([{ "igbo": "b", "english": "" }]);
    let second = server.create_word(with_example).await;

    let mut mismatched = first.clone();
    mismatched["id"] = second["id"].clone();
    let response = server
        .client
        .put(server.url(&format!("/wordSuggestions/{}", first["id"].as_str().unwrap())))
        .header("x-user-uid", UID)
        .json(&mismatched)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut foreign = first.clone();
    foreign["examples"] = json!([{ "id": second["examples"][0]["id"], "igbo": "x" }]);
    let response = server
        .client
        .put(server.url(&format!("/wordSuggestions/{}", first["id"].as_str().unwrap())))
        .header("x-user-uid", UID)
        .json(&foreign)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- List --

#[tokio::test]
async fn test_range_never_exceeds_span_or_maximum() {
    let server = spawn_test_server().await;
    for i in 0..30 {
        server.create_word(word_body(&format!("w{:02}", i))).await;
    }

    let response = server.list_words(&[("range", "[0,4]")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-range"], "wordSuggestions 0-4/30");
    assert_eq!(response.headers()["x-total-count"], "30");
    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(items.len(), 5);

    let response = server.list_words(&[("range", "[0,39]")]).await;
    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(items.len(), 25);

    let response = server.list_words(&[]).await;
    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(items.len(), 10);

    let response = server.list_words(&[("page", "2")]).await;
    assert_eq!(response.headers()["content-range"], "wordSuggestions 20-29/30");
}

#[tokio::test]
async fn test_malformed_list_queries_are_rejected() {
    let server = spawn_test_server().await;
    for query in [
        ("range", "incorrect"),
        ("range", "[-1,5]"),
        ("page", "-1"),
        ("page", "two"),
        ("sort", "[\"word\"]"),
        ("sort", "[\"nope\",\"asc\"]"),
        ("filter", "{\"unknown\":\"x\"}"),
        ("dialects", "maybe"),
    ] {
        let response = server.list_words(&[query]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query: {:?}", query);
    }
}

#[tokio::test]
async fn test_sort_orders_results() {
    let server = spawn_test_server().await;
    for word in ["ọkụ", "ala", "mmiri"] {
        server.create_word(word_body(word)).await;
    }

    let response = server.list_words(&[("sort", "[\"word\",\"ASC\"]")]).await;
    let items: Vec<Value> = response.json().await.unwrap();
    let words: Vec<&str> = items.iter().map(|i| i["word"].as_str().unwrap()).collect();
    assert_eq!(words, vec!["ala", "mmiri", "ọkụ"]);

    let response = server.list_words(&[("sort", "[\"word\",\"desc\"]")]).await;
    let items: Vec<Value> = response.json().await.unwrap();
    let words: Vec<&str> = items.iter().map(|i| i["word"].as_str().unwrap()).collect();
    assert_eq!(words, vec!["ọkụ", "mmiri", "ala"]);
}

#[tokio::test]
async fn test_default_order_is_approvals_descending() {
    let server = spawn_test_server().await;
    let popular = server.create_word(word_body("popular")).await;
    server.create_word(word_body("newer")).await;

    let response = server
        .client
        .put(server.url(&format!(
            "/wordSuggestions/{}/approve",
            popular["id"].as_str().unwrap()
        )))
        .header("x-user-uid", UID)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let approved: Value = response.json().await.unwrap();
    assert_eq!(approved["approvals"], json!([UID]));

    let items: Vec<Value> = server.list_words(&[]).await.json().await.unwrap();
    assert_eq!(items[0]["word"], "popular");
}

#[tokio::test]
async fn test_list_omits_examples_and_dialects_unless_requested() {
    let server = spawn_test_server().await;
    let mut body = word_body("ụlọ");
    body["examples"] = json!([{ "igbo": "Ụlọ m", "english": "My house" }]);
    body["dialects"] = json!([{ "dialect": "Owerri", "word": "ụnọ" }]);
    server.create_word(body).await;

    let items: Vec<Value> = server.list_words(&[]).await.json().await.unwrap();
    assert!(items[0].get("examples").is_none());
    assert!(items[0].get("dialects").is_none());

    let items: Vec<Value> = server
        .list_words(&[("examples", "true"), ("dialects", "true")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(items[0]["examples"].as_array().unwrap().len(), 1);
    assert_eq!(items[0]["dialects"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_put_of_list_entry_keeps_examples_and_dialects() {
    let server = spawn_test_server().await;
    let mut body = word_body("ụlọ");
    body["examples"] = json!([{ "igbo": "Ụlọ m", "english": "My house" }]);
    body["dialects"] = json!([{ "dialect": "Owerri", "word": "ụnọ" }]);
    let created = server.create_word(body).await;
    let id = created["id"].as_str().unwrap();

    let items: Vec<Value> = server.list_words(&[]).await.json().await.unwrap();
    let mut entry = items[0].clone();
    entry["word"] = json!("ụlọ akwụkwọ");
    let response = server
        .client
        .put(server.url(&format!("/wordSuggestions/{}", id)))
        .header("x-user-uid", UID)
        .json(&entry)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();

    assert_eq!(updated["word"], "ụlọ akwụkwọ");
    assert_eq!(updated["examples"][0]["id"], created["examples"][0]["id"]);
    assert_eq!(updated["dialects"][0]["dialect"], "Owerri");
}

// -- Delete --

#[tokio::test]
async fn test_delete_then_lookup_is_not_found() {
    let server = spawn_test_server().await;
    let mut body = word_body("nri");
    body["examples"] = json!([{ "igbo": "Nri dị ụtọ", "english": "Food is sweet" }]);
    let created = server.create_word(body).await;
    let id = created["id"].as_str().unwrap();
    let nested_id = created["examples"][0]["id"].as_str().unwrap();

    let response = server
        .client
        .delete(server.url(&format!("/wordSuggestions/{}", id)))
        .header("x-user-uid", UID)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], id);

    for path in [
        format!("/wordSuggestions/{}", id),
        format!("/exampleSuggestions/{}", nested_id),
    ] {
        let response = server.client.get(server.url(&path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = server
        .client
        .delete(server.url(&format!("/wordSuggestions/{}", id)))
        .header("x-user-uid", UID)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Example suggestions & merge --

#[tokio::test]
async fn test_example_suggestion_crud_and_merge() {
    let server = spawn_test_server().await;
    let response = server
        .client
        .post(server.url("/exampleSuggestions"))
        .header("x-user-uid", UID)
        .json(&json!({ "igbo": "Ọ dị mma", "english": "It is good" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let suggestion: Value = response.json().await.unwrap();
    let suggestion_id = suggestion["id"].as_str().unwrap();
    assert_eq!(suggestion["exampleForSuggestion"], false);

    let response = server
        .client
        .get(server.url("/exampleSuggestions"))
        .query(&[("keyword", "mma")])
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["content-range"],
        "exampleSuggestions 0-0/1"
    );

    let response = server
        .client
        .post(server.url("/examples"))
        .json(&json!({ "id": suggestion_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "User uid is required");

    let response = server
        .client
        .post(server.url("/examples"))
        .header("x-user-uid", UID)
        .json(&json!({ "id": "not-an-id" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid original example id provided");

    let response = server
        .client
        .post(server.url("/examples"))
        .header("x-user-uid", UID)
        .json(&json!({ "id": uuid::Uuid::now_v7() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .client
        .post(server.url("/examples"))
        .header("x-user-uid", UID)
        .json(&json!({ "id": suggestion_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let example: Value = response.json().await.unwrap();
    assert_eq!(example["igbo"], "Ọ dị mma");

    let response = server
        .client
        .get(server.url(&format!("/examples/{}", example["id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let merged: Value = server
        .client
        .get(server.url(&format!("/exampleSuggestions/{}", suggestion_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(merged["merged"], example["id"]);
    assert_eq!(merged["mergedBy"], UID);

    let response = server
        .client
        .post(server.url("/examples"))
        .header("x-user-uid", UID)
        .json(&json!({ "id": suggestion_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- System --

#[tokio::test]
async fn test_health_openapi_and_request_id() {
    let server = spawn_test_server().await;
    let response = server
        .client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    let response = server
        .client
        .get(format!("{}/openapi.json", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec: Value = response.json().await.unwrap();
    assert!(spec["paths"]["/api/v1/wordSuggestions"].is_object());
}
