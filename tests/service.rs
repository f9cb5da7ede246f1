//! End-to-end tests of the summarise/ask flow against a mock service.

use recap::client::ClientError;
use recap::summary::{AskRequest, ContentType, Exchange, Style};
use recap::{Outcome, Rejected, ServiceClient, SessionState};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn summary_body(session: &str) -> serde_json::Value {
    json!({
        "summary": "S",
        "key_insights": ["I1", "I2"],
        "content_type": "article",
        "session_id": session,
    })
}

async fn mount_summary(server: &MockServer, session: &str) {
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(session)))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ServiceClient {
    ServiceClient::new(&server.uri()).unwrap()
}

#[tokio::test]
async fn summarise_posts_once_and_populates_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(header_exists("user-agent"))
        .and(body_json(json!({"url": "https://example.com/a", "style": "executive"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body("sess-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut state = SessionState::new(Style::Executive);
    state.set_url("https://example.com/a");

    assert!(!state.is_summarizing());
    assert_eq!(state.submit_summarize(&client).await, Outcome::Applied);

    let result = state.result().unwrap();
    assert_eq!(result.summary, "S");
    assert_eq!(result.key_insights, vec!["I1", "I2"]);
    assert_eq!(result.content_type, ContentType::Article);
    assert_eq!(state.session_id(), Some("sess-1"));
    assert!(state.history().is_empty());
    assert!(state.last_error().is_none());
    assert!(!state.is_summarizing());
}

#[tokio::test]
async fn summarise_sends_the_selected_style() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(body_json(json!({"url": "https://youtu.be/xyz", "style": "bullet_points"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": "Video",
            "key_insights": [],
            "content_type": "youtube",
            "session_id": "sess-v",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = SessionState::default();
    state.set_style(Style::BulletPoints);
    state.set_url("https://youtu.be/xyz");
    assert_eq!(
        state.submit_summarize(&client_for(&server)).await,
        Outcome::Applied
    );
    assert_eq!(
        state.result().map(|r| r.content_type),
        Some(ContentType::Youtube)
    );
}

#[tokio::test]
async fn summarise_server_error_sets_message_and_no_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = SessionState::default();
    state.set_url("https://example.com/a");
    assert_eq!(
        state.submit_summarize(&client_for(&server)).await,
        Outcome::Failed
    );

    let error = state.last_error().unwrap();
    assert!(!error.is_empty());
    assert!(error.contains("500"));
    assert!(state.result().is_none());
    assert!(!state.is_summarizing());
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "S"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .summarize(&recap::summary::SummarizeRequest {
            url: "https://example.com/a".to_string(),
            style: Style::Detailed,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));

    let mut state = SessionState::default();
    state.set_url("https://example.com/a");
    assert_eq!(state.submit_summarize(&client).await, Outcome::Failed);
    assert!(state.last_error().unwrap().contains("malformed"));
    assert!(!state.is_summarizing());
}

#[tokio::test]
async fn unreachable_service_is_a_network_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = ServiceClient::new(&format!("http://{}", addr)).unwrap();
    let mut state = SessionState::default();
    state.set_url("https://example.com/a");

    assert_eq!(state.submit_summarize(&client).await, Outcome::Failed);
    assert!(state
        .last_error()
        .unwrap()
        .starts_with("could not reach the summarisation service"));
    assert!(!state.is_summarizing());
}

#[tokio::test]
async fn blank_url_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut state = SessionState::default();
    state.set_url("  ");
    assert_eq!(
        state.submit_summarize(&client_for(&server)).await,
        Outcome::Rejected(Rejected::EmptyUrl)
    );
}

#[tokio::test]
async fn question_replaces_history_with_server_copy() {
    let server = MockServer::start().await;
    mount_summary(&server, "sess-1").await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({"session_id": "sess-1", "question": "What is the main point?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_history": [
                {"question": "What is the main point?", "answer": "A1"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut state = SessionState::default();
    state.set_url("https://example.com/a");
    state.submit_summarize(&client).await;

    state.set_question("  What is the main point?  ");
    assert_eq!(state.submit_question(&client).await, Outcome::Applied);
    assert_eq!(
        state.history(),
        &[Exchange {
            question: "What is the main point?".to_string(),
            answer: "A1".to_string(),
        }]
    );
    assert_eq!(state.question(), "");
    assert!(!state.is_asking());
}

#[tokio::test]
async fn server_reordered_history_is_taken_verbatim() {
    let server = MockServer::start().await;
    mount_summary(&server, "sess-1").await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_history": [
                {"question": "Q2", "answer": "A2"},
                {"question": "Q1", "answer": "A1"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut state = SessionState::default();
    state.set_url("https://example.com/a");
    state.submit_summarize(&client).await;

    for question in ["Q1", "Q2"] {
        state.set_question(question);
        state.submit_question(&client).await;
    }
    let questions: Vec<&str> = state.history().iter().map(|e| e.question.as_str()).collect();
    assert_eq!(questions, vec!["Q2", "Q1"]);
}

#[tokio::test]
async fn question_without_session_or_text_makes_no_request() {
    let server = MockServer::start().await;
    mount_summary(&server, "sess-1").await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut state = SessionState::default();
    state.set_question("Anything?");
    assert_eq!(
        state.submit_question(&client).await,
        Outcome::Rejected(Rejected::NoSession)
    );

    state.set_url("https://example.com/a");
    state.submit_summarize(&client).await;
    state.set_question("   ");
    assert_eq!(
        state.submit_question(&client).await,
        Outcome::Rejected(Rejected::EmptyQuestion)
    );
    assert!(!state.is_asking());
}

#[tokio::test]
async fn failed_question_keeps_summary_and_history() {
    let server = MockServer::start().await;
    mount_summary(&server, "sess-1").await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut state = SessionState::default();
    state.set_url("https://example.com/a");
    state.submit_summarize(&client).await;

    state.set_question("Why?");
    assert_eq!(state.submit_question(&client).await, Outcome::Failed);
    assert!(state.result().is_some());
    assert!(state.history().is_empty());
    assert_eq!(state.question(), "Why?");
    assert!(state.last_error().unwrap().contains("503"));
    assert!(!state.is_asking());
}

#[tokio::test]
async fn one_shot_ask_and_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Article Summarizer API is running"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({"session_id": "sess-7", "question": "Who?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_history": [{"question": "Who?", "answer": "Nobody"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Trailing slash on the configured address is tolerated.
    let client = ServiceClient::new(&format!("{}/", server.uri())).unwrap();
    let status = client.health().await.unwrap();
    assert_eq!(status.message, "Article Summarizer API is running");

    let response = client
        .ask(&AskRequest {
            session_id: "sess-7".to_string(),
            question: "Who?".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.conversation_history[0].answer, "Nobody");
}

#[tokio::test]
async fn retried_question_recovers_from_failure() {
    let server = MockServer::start().await;
    mount_summary(&server, "sess-1").await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_history": [{"question": "Why?", "answer": "Because"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut state = SessionState::default();
    state.set_url("https://example.com/a");
    state.submit_summarize(&client).await;

    state.set_question("Why?");
    assert_eq!(state.submit_question(&client).await, Outcome::Failed);
    assert!(state.last_error().is_some());

    assert_eq!(state.submit_question(&client).await, Outcome::Applied);
    assert_eq!(state.history().len(), 1);
    assert!(state.last_error().is_none());
    assert!(state.result().is_some());
}

#[tokio::test]
async fn resumed_session_sends_trimmed_question_and_skips_blank_ones() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({"session_id": "sess-7", "question": "Who?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_history": [{"question": "Who?", "answer": "Nobody"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut state = SessionState::resume("sess-7");

    state.set_question("   ");
    assert_eq!(
        state.submit_question(&client).await,
        Outcome::Rejected(Rejected::EmptyQuestion)
    );

    state.set_question(" Who? ");
    assert_eq!(state.submit_question(&client).await, Outcome::Applied);
    assert_eq!(state.history()[0].answer, "Nobody");
}
