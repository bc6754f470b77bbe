// tests/quiz_api_tests.rs

use std::sync::Arc;

use quizgenai::{
    config::Config,
    routes,
    services::quizgen::QuizGenerator,
    state::AppState,
    store::{NewQuestion, NewQuiz, QuizStore, memory::MemoryStore},
};

struct TestApp {
    address: String,
    store: Arc<MemoryStore>,
}

async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());

    let config = Config {
        database_url: "postgres://unused-in-tests".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        port: 0,
        rust_log: "error".to_string(),
        openai_api_key: None,
        openai_base_url: "https://api.openai.com/v1".to_string(),
        openai_model: "gpt-3.5-turbo".to_string(),
    };

    let generator = QuizGenerator::from_config(&config);

    let state = AppState {
        store: store.clone(),
        config,
        generator,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, store }
}

fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Signs a user up and logs them in. Returns (user id, bearer token).
async fn authed_user(client: &reqwest::Client, address: &str) -> (i64, String) {
    let email = unique_email();
    let payload = serde_json::json!({ "email": email, "password": "password123" });

    let signup: serde_json::Value = client
        .post(format!("{address}/auth/signup"))
        .json(&payload)
        .send()
        .await
        .expect("Signup failed")
        .json()
        .await
        .expect("Failed to parse signup json");

    let user_id = signup["user"]["id"].as_i64().expect("User id missing");

    let login: serde_json::Value = client
        .post(format!("{address}/auth/login"))
        .json(&payload)
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    let token = login["token"].as_str().expect("Token missing").to_string();

    (user_id, token)
}

async fn seed_topic_quiz(store: &MemoryStore, topic_name: &str, published: bool) -> (i64, i64) {
    let topic = store.create_topic(topic_name, None).await.unwrap();
    let quiz = store
        .create_quiz(NewQuiz {
            topic_id: topic.id,
            title: format!("{} Quiz", topic_name),
            description: None,
            difficulty: "MEDIUM".to_string(),
            is_published: published,
        })
        .await
        .unwrap();

    (topic.id, quiz.id)
}

async fn seed_question(
    store: &MemoryStore,
    quiz_id: i64,
    text: &str,
    options: serde_json::Value,
    correct: &str,
    order_index: i64,
) -> i64 {
    store
        .create_question(NewQuestion {
            quiz_id,
            text: text.to_string(),
            options,
            correct_answer: correct.to_string(),
            explanation: None,
            points: 10,
            order_index,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn quiz_routes_require_a_token() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: no Authorization header at all
    let bare = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .json(&serde_json::json!({ "quizId": 1 }))
        .send()
        .await
        .expect("Failed to execute request");

    // A malformed token is rejected the same way
    let garbage = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", "Bearer not-a-real-token")
        .json(&serde_json::json!({ "quizId": 1 }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(bare.status().as_u16(), 401);
    assert_eq!(garbage.status().as_u16(), 401);
}

#[tokio::test]
async fn fetch_by_quiz_id_returns_questions_in_display_order() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    let (_, quiz_id) = seed_topic_quiz(&app.store, "History", true).await;
    // Created out of order on purpose; orderIndex decides the display order.
    let second = seed_question(
        &app.store,
        quiz_id,
        "Second question?",
        serde_json::json!(["a", "b", "c", "d"]),
        "b",
        1,
    )
    .await;
    let first = seed_question(
        &app.store,
        quiz_id,
        "First question?",
        serde_json::json!(["w", "x", "y", "z"]),
        "w",
        0,
    )
    .await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "quizId": quiz_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["topic"], "History");

    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["questionId"].as_i64(), Some(first));
    assert_eq!(questions[1]["questionId"].as_i64(), Some(second));

    // Exact view shape for one question
    assert_eq!(questions[0]["type"], "multiple");
    assert_eq!(questions[0]["category"], "History");
    assert_eq!(questions[0]["question"], "First question?");
    assert_eq!(questions[0]["correct_answer"], "w");
    assert_eq!(
        questions[0]["options"],
        serde_json::json!(["w", "x", "y", "z"])
    );
}

#[tokio::test]
async fn fetch_by_topic_id_serves_a_published_quiz() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    let (topic_id, quiz_id) = seed_topic_quiz(&app.store, "Geography", true).await;
    seed_question(
        &app.store,
        quiz_id,
        "Capital of France?",
        serde_json::json!(["Paris", "London", "Berlin", "Madrid"]),
        "Paris",
        0,
    )
    .await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "topicId": topic_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["topic"], "Geography");
    assert_eq!(body["questions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn fetch_never_serves_unpublished_quizzes() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    let (topic_id, quiz_id) = seed_topic_quiz(&app.store, "Drafts", false).await;

    // Act: direct fetch and topic fetch both miss
    let by_id = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "quizId": quiz_id }))
        .send()
        .await
        .expect("Failed to execute request");

    let by_topic = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "topicId": topic_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(by_id.status().as_u16(), 404);
    assert_eq!(by_topic.status().as_u16(), 404);
    let body: serde_json::Value = by_topic.json().await.unwrap();
    assert_eq!(body["error"], "No quizzes found for this topic");
}

#[tokio::test]
async fn fetch_unknown_topic_is_not_found() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "topicId": 999 }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Topic not found");
}

#[tokio::test]
async fn fetch_requires_an_identifier() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn fetch_decodes_legacy_serialized_options() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    let (_, quiz_id) = seed_topic_quiz(&app.store, "Legacy", true).await;
    seed_question(
        &app.store,
        quiz_id,
        "Stored the old way?",
        serde_json::json!("[\"yes\",\"no\"]"),
        "yes",
        0,
    )
    .await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "quizId": quiz_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["questions"][0]["options"],
        serde_json::json!(["yes", "no"])
    );
}

#[tokio::test]
async fn fetch_serves_empty_options_for_corrupt_rows() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    let (_, quiz_id) = seed_topic_quiz(&app.store, "Corrupt", true).await;
    seed_question(
        &app.store,
        quiz_id,
        "Options lost in migration?",
        serde_json::json!({ "oops": true }),
        "never",
        0,
    )
    .await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/quizes", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "quizId": quiz_id }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert: the question still serves, with an empty option list
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["questions"][0]["options"], serde_json::json!([]));
}

#[tokio::test]
async fn save_quiz_result_records_attempt_and_grades_answers() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = authed_user(&client, &app.address).await;

    let (_, quiz_id) = seed_topic_quiz(&app.store, "Grading", true).await;
    let q1 = seed_question(
        &app.store,
        quiz_id,
        "Pick c",
        serde_json::json!(["a", "b", "c", "d"]),
        "c",
        0,
    )
    .await;
    let q2 = seed_question(
        &app.store,
        quiz_id,
        "Pick b",
        serde_json::json!(["a", "b", "c", "d"]),
        "b",
        1,
    )
    .await;

    // Act: q1 answered correctly (index 2 -> "c"), q2 wrong (index 0 -> "a")
    let response = client
        .post(format!("{}/quizgenai/save-quiz-result", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "userId": user_id,
            "quizId": quiz_id,
            "score": 10,
            "totalPoints": 20,
            "selectedAnswers": { (q1.to_string()): 2, (q2.to_string()): 0 }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["attempt"]["userId"].as_i64(), Some(user_id));
    assert_eq!(body["attempt"]["score"].as_i64(), Some(10));
    assert_eq!(body["attempt"]["totalPoints"].as_i64(), Some(20));
    assert_eq!(body["attempt"]["isCompleted"], true);
    assert!(!body["attempt"]["completedAt"].is_null());

    let answers = body["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0]["questionId"].as_i64(), Some(q1));
    assert_eq!(answers[0]["userAnswer"], "c");
    assert_eq!(answers[0]["isCorrect"], true);
    assert_eq!(answers[1]["questionId"].as_i64(), Some(q2));
    assert_eq!(answers[1]["userAnswer"], "a");
    assert_eq!(answers[1]["isCorrect"], false);

    // The attempt is durably stored
    let attempts = app.store.attempts_for_user(user_id).await.unwrap();
    assert_eq!(attempts.len(), 1);
}

#[tokio::test]
async fn save_quiz_result_stores_unknown_for_out_of_range_index() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = authed_user(&client, &app.address).await;

    let (_, quiz_id) = seed_topic_quiz(&app.store, "OutOfRange", true).await;
    let q1 = seed_question(
        &app.store,
        quiz_id,
        "Pick c",
        serde_json::json!(["a", "b", "c", "d"]),
        "c",
        0,
    )
    .await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/save-quiz-result", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "userId": user_id,
            "quizId": quiz_id,
            "score": 0,
            "totalPoints": 10,
            "selectedAnswers": { (q1.to_string()): 99 }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["answers"][0]["userAnswer"], "Unknown");
    assert_eq!(body["answers"][0]["isCorrect"], false);
}

#[tokio::test]
async fn save_quiz_result_skips_unresolvable_questions() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = authed_user(&client, &app.address).await;

    let (_, quiz_id) = seed_topic_quiz(&app.store, "Skips", true).await;
    let q1 = seed_question(
        &app.store,
        quiz_id,
        "Pick a",
        serde_json::json!(["a", "b"]),
        "a",
        0,
    )
    .await;

    // Act: one pair references a question that does not exist
    let response = client
        .post(format!("{}/quizgenai/save-quiz-result", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "userId": user_id,
            "quizId": quiz_id,
            "score": 10,
            "totalPoints": 10,
            "selectedAnswers": { (q1.to_string()): 0, "424242": 1 }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert: the bad pair is dropped, the rest is recorded
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["answers"].as_array().unwrap().len(), 1);
    assert_eq!(body["answers"][0]["questionId"].as_i64(), Some(q1));
}

#[tokio::test]
async fn save_quiz_result_requires_all_fields() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = authed_user(&client, &app.address).await;

    // Act: no selectedAnswers
    let response = client
        .post(format!("{}/quizgenai/save-quiz-result", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "userId": user_id,
            "quizId": 1,
            "score": 0,
            "totalPoints": 10
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Missing required fields. Please provide userId, quizId, score, totalPoints, and selectedAnswers."
    );
}

#[tokio::test]
async fn save_quiz_result_rejects_non_mapping_answers() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = authed_user(&client, &app.address).await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/save-quiz-result", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "userId": user_id,
            "quizId": 1,
            "score": 0,
            "totalPoints": 10,
            "selectedAnswers": [1, 2, 3]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn save_quiz_result_rejects_unknown_user() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/save-quiz-result", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "userId": 424242,
            "quizId": 1,
            "score": 0,
            "totalPoints": 10,
            "selectedAnswers": {}
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn save_quiz_result_rejects_score_above_total() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = authed_user(&client, &app.address).await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/save-quiz-result", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "userId": user_id,
            "quizId": 1,
            "score": 30,
            "totalPoints": 20,
            "selectedAnswers": {}
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn generate_quiz_requires_a_topic() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/generate", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Topic is required");
}

#[tokio::test]
async fn generate_quiz_without_api_key_is_an_internal_error() {
    // Arrange: spawn_app configures no OPENAI_API_KEY
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = authed_user(&client, &app.address).await;

    // Act
    let response = client
        .post(format!("{}/quizgenai/generate", app.address))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "topic": "Rust" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "OPENAI_API_KEY is not configured");
}
