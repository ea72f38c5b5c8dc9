use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Form, Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, StreamExt};
use serde_json::{Value, json};
use smart_scheduler::api::hooks::{REQUEST_ID_HEADER, RequestContext, ResponseHook};
use smart_scheduler::models::{
    ConstraintToggles, Course, CourseFile, CourseFilter, CourseUpload, Credentials, RegisterRequest,
    ScheduleRequest, SubjectPayload,
};
use smart_scheduler::session::{ChannelNavigator, MemoryTokenStore, Route, SessionStore, TokenCell};
use smart_scheduler::{AppError, ClientConfig, HttpApiClient, SchedulerApi};
use tokio::net::TcpListener;

const TOKEN: &str = "tok-alice";

/// Everything the stub server saw, keyed by route.
#[derive(Clone, Default)]
struct Seen {
    log: Arc<Mutex<Vec<(&'static str, Value)>>>,
}

impl Seen {
    fn push(&self, route: &'static str, value: Value) {
        self.log.lock().expect("log lock").push((route, value));
    }

    fn get(&self, route: &str) -> Vec<Value> {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .filter(|(r, _)| *r == route)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

async fn login(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    let ok = form.get("username").map(String::as_str) == Some("alice")
        && form.get("password").map(String::as_str) == Some("secret");
    if ok {
        (
            StatusCode::OK,
            Json(json!({ "access_token": TOKEN, "token_type": "bearer" })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect username or password" })),
        )
    }
}

async fn me(headers: HeaderMap) -> impl IntoResponse {
    let expected = format!("Bearer {}", TOKEN);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if authorized {
        (
            StatusCode::OK,
            Json(json!({
                "username": "alice",
                "email": "alice@example.com",
                "id": "6f1c2b9e-2f0e-4c55-9a53-1f0d2b7c8e41",
                "is_admin": true
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Not authenticated" })),
        )
    }
}

async fn courses(
    State(seen): State<Seen>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.push("courses", json!(query));
    Json(json!({
        "total": 1,
        "items": [{
            "code": "IT3011",
            "name": "Data Structures",
            "credits": 3,
            "semester": "2023-2"
        }]
    }))
}

async fn register(Json(body): Json<Value>) -> impl IntoResponse {
    if body["username"] == "taken" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "detail": [{ "loc": ["body", "username"], "msg": "already registered" }]
            })),
        )
    } else {
        (StatusCode::CREATED, Json(json!({ "username": body["username"] })))
    }
}

async fn schedule(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.push("schedule", body);
    Json(json!({
        "schedule": [
            {
                "subject": "Data Structures",
                "time": "T2_Sáng",
                "instructor": "Tran Thi B",
                "priority": 10
            }
        ],
        "cost": 4.0,
        "db_id": "665f0c",
        "removed_conflicts": []
    }))
}

async fn chat(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    seen.push("chat", json!({ "request_id": request_id, "body": body }));
    Json(json!({ "reply": format!("echo: {}", body["message"].as_str().unwrap_or_default()) }))
}

async fn upload(State(seen): State<Seen>, mut multipart: Multipart) -> Json<Value> {
    let mut fields = serde_json::Map::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let text = String::from_utf8(field.bytes().await.expect("field bytes").to_vec())
            .expect("utf8 field");
        fields.insert(name, json!({ "file_name": file_name, "text": text }));
    }
    let semester = fields["semester"]["text"].clone();
    seen.push("upload", Value::Object(fields));
    Json(json!({ "inserted": 1, "semester": semester, "sample": [] }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "reply": "too late" }))
}

/// Sends a 200 with the first bytes of the body, then never finishes it.
async fn stalled_body() -> Response {
    let first = Bytes::from_static(b"{\"reply\": \"par");
    let head = stream::iter([Ok::<_, std::io::Error>(first)]);
    let body = Body::from_stream(head.chain(stream::pending()));
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn spawn_stub(seen: Seen) -> String {
    let router = Router::new()
        .route("/api/login", post(login))
        .route("/api/users/me", get(me))
        .route("/api/courses", get(courses))
        .route("/api/register", post(register))
        .route("/api/schedule", post(schedule))
        .route("/api/chat", post(chat))
        .route("/api/admin/upload-courses", post(upload))
        .with_state(seen);
    serve(router).await
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind stub");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server stopped");
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, cell: &TokenCell) -> HttpApiClient {
    let config = ClientConfig::default().with_base_url(base_url);
    HttpApiClient::new(&config, Arc::new(cell.clone())).expect("Failed to build client")
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_posts_a_form_and_maps_rejection_detail() {
    let base = spawn_stub(Seen::default()).await;
    let api = client(&base, &TokenCell::default());

    let token = api.login(&credentials("alice", "secret")).await.expect("login");
    assert_eq!(token, TOKEN);

    let err = api.login(&credentials("alice", "wrong")).await.expect_err("rejected");
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message("Login failed"), "Incorrect username or password");
}

#[tokio::test]
async fn profile_call_carries_the_bearer_token() {
    let base = spawn_stub(Seen::default()).await;
    let cell = TokenCell::default();
    let api = client(&base, &cell);

    assert!(matches!(api.fetch_profile().await, Err(AppError::Unauthorized(_))));

    let session_api = Arc::new(client(&base, &cell));
    let (navigator, mut routes) = ChannelNavigator::new();
    let session = SessionStore::new(
        session_api,
        Arc::new(MemoryTokenStore::default()),
        cell.clone(),
        Arc::new(navigator),
    );
    let route = session.login("alice", "secret").await.expect("session login");

    assert_eq!(cell.get().as_deref(), Some(TOKEN));
    assert_eq!(route, Route::Admin);
    assert_eq!(routes.try_recv().ok(), Some(Route::Admin));
    let profile = api.fetch_profile().await.expect("profile");
    assert!(profile.is_admin);
    assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
    assert_eq!(session.authorize(Route::Admin), Route::Admin);
}

#[tokio::test]
async fn courses_are_filtered_by_query_parameters() {
    let seen = Seen::default();
    let base = spawn_stub(seen.clone()).await;
    let api = client(&base, &TokenCell::default());

    let all = api
        .list_courses(&CourseFilter::new("2023-2", None))
        .await
        .expect("courses");
    api.list_courses(&CourseFilter::new("2023-2", Some("KTPM".to_string())))
        .await
        .expect("courses by major");

    assert_eq!(all.len(), 1);
    assert_eq!(all[0].code, "IT3011");
    let queries = seen.get("courses");
    assert_eq!(queries[0], json!({ "semester": "2023-2" }));
    assert_eq!(queries[1], json!({ "semester": "2023-2", "major": "KTPM" }));
}

#[tokio::test]
async fn register_expects_created_and_joins_field_errors() {
    let base = spawn_stub(Seen::default()).await;
    let api = client(&base, &TokenCell::default());

    let fresh = RegisterRequest {
        username: "bob".to_string(),
        email: None,
        password: "hunter22".to_string(),
    };
    api.register(&fresh).await.expect("registered");

    let taken = RegisterRequest {
        username: "taken".to_string(),
        ..fresh
    };
    let err = api.register(&taken).await.expect_err("duplicate");
    assert!(matches!(err, AppError::Server { status, .. } if status.as_u16() == 400));
    assert_eq!(err.user_message("Registration failed"), "body.username: already registered");
}

#[tokio::test]
async fn schedule_request_round_trip() {
    let seen = Seen::default();
    let base = spawn_stub(seen.clone()).await;
    let api = client(&base, &TokenCell::default());

    let request = ScheduleRequest {
        subjects: vec![SubjectPayload {
            name: "Data Structures".to_string(),
            code: "IT3011".to_string(),
            credits: 3,
            instructor: Some("Tran Thi B".to_string()),
            subject_type: None,
            start_time: Some("07:00".to_string()),
            end_time: Some("09:30".to_string()),
            start_date: "2024-09-02".to_string(),
            end_date: "2024-12-20".to_string(),
            is_retake: false,
            priority: 10,
        }],
        available_time_slots: vec!["T2_Sáng".to_string()],
        constraints: HashMap::new(),
        additional_constraints: ConstraintToggles {
            balance_days: true,
            ..Default::default()
        },
    };

    let result = api.generate_schedule(&request).await.expect("schedule");

    assert_eq!(result.schedule[0].time, "T2_Sáng");
    assert_eq!(result.db_id.as_deref(), Some("665f0c"));
    let body = &seen.get("schedule")[0];
    assert_eq!(body["available_time_slots"], json!(["T2_Sáng"]));
    assert_eq!(body["constraints"], json!({}));
    assert_eq!(body["additionalConstraints"]["balanceDays"], json!(true));
    assert_eq!(body["subjects"][0]["priority"], json!(10));
}

#[tokio::test]
async fn chat_sends_a_request_id() {
    let seen = Seen::default();
    let base = spawn_stub(seen.clone()).await;
    let api = client(&base, &TokenCell::default());

    let reply = api.chat("Which slots are free?").await.expect("reply");

    assert_eq!(reply, "echo: Which slots are free?");
    let recorded = &seen.get("chat")[0];
    let request_id = recorded["request_id"].as_str().expect("request id");
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
    assert_eq!(recorded["body"], json!({ "message": "Which slots are free?" }));
}

#[tokio::test]
async fn upload_sends_multipart_fields() {
    let seen = Seen::default();
    let base = spawn_stub(seen.clone()).await;
    let api = client(&base, &TokenCell::default());

    let upload = CourseUpload {
        semester: "2023-2".to_string(),
        department: Some("CNTT".to_string()),
        major: None,
        file: CourseFile {
            file_name: "courses.csv".to_string(),
            bytes: b"code,name,credits\nIT3011,Data Structures,3\n".to_vec(),
        },
    };
    let summary = api.upload_courses(&upload).await.expect("upload");

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.semester, "2023-2");
    let fields = &seen.get("upload")[0];
    assert_eq!(fields["department"]["text"], json!("CNTT"));
    assert!(fields.get("major").is_none());
    assert_eq!(fields["file"]["file_name"], json!("courses.csv"));
    assert!(fields["file"]["text"].as_str().expect("file text").contains("IT3011"));
}

#[derive(Default)]
struct CallRecorder {
    statuses: Mutex<Vec<u16>>,
    errors: Mutex<Vec<String>>,
}

impl ResponseHook for CallRecorder {
    fn on_response(&self, _ctx: &RequestContext, status: StatusCode) {
        self.statuses.lock().expect("statuses lock").push(status.as_u16());
    }

    fn on_error(&self, ctx: &RequestContext, err: &AppError) {
        self.errors
            .lock()
            .expect("errors lock")
            .push(format!("{} {}", ctx.path, matches!(err, AppError::Timeout)));
    }
}

fn short_timeout_client(base: &str, recorder: Arc<CallRecorder>) -> HttpApiClient {
    let config = ClientConfig::default()
        .with_base_url(base)
        .with_timeout(Duration::from_millis(200));
    HttpApiClient::bare(&config)
        .expect("Failed to build client")
        .with_response_hook(recorder)
}

#[tokio::test]
async fn slow_responses_time_out() {
    let base = serve(Router::new().route("/api/chat", post(slow))).await;
    let recorder = Arc::new(CallRecorder::default());
    let api = short_timeout_client(&base, recorder.clone());

    let err = api.chat("hello").await.expect_err("timed out");

    assert!(matches!(err, AppError::Timeout));
    assert!(recorder.statuses.lock().expect("statuses lock").is_empty());
    assert_eq!(
        recorder.errors.lock().expect("errors lock").as_slice(),
        ["/api/chat true".to_string()]
    );
}

#[tokio::test]
async fn body_timeout_reaches_response_hooks() {
    let base = serve(Router::new().route("/api/chat", post(stalled_body))).await;
    let recorder = Arc::new(CallRecorder::default());
    let api = short_timeout_client(&base, recorder.clone());

    let err = api.chat("hello").await.expect_err("body never completes");

    assert!(matches!(err, AppError::Timeout));
    assert_eq!(recorder.statuses.lock().expect("statuses lock").as_slice(), [200]);
    assert_eq!(
        recorder.errors.lock().expect("errors lock").as_slice(),
        ["/api/chat true".to_string()]
    );
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = client(&format!("http://{}", addr), &TokenCell::default());

    let err = api.fetch_profile().await.expect_err("no server");

    assert!(matches!(err, AppError::Network(_)));
    assert_eq!(err.user_message("Could not reach the server"), "Could not reach the server");
}

#[test]
fn courses_decode_with_defaults() {
    let course: Course = serde_json::from_value(json!({ "code": "X1", "name": "Only name" }))
        .expect("course");
    assert_eq!(course.credits, 0);
    assert!(course.metadata.is_empty());
}
