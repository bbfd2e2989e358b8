use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Habit {
    id: u64,
    name: String,
    completed: bool,
    streak: u32,
}

#[derive(Debug, Deserialize)]
struct Metrics {
    consistency: u32,
    streak: u32,
    discipline: f64,
    stress: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habitra_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/session")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_habitra"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .env_remove("OPENAI_API_KEY")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Starts every test from a cleared store.
async fn fresh(client: &Client, base_url: &str) {
    let response = client
        .post(format!("{base_url}/api/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

async fn onboard(client: &Client, base_url: &str, sensitivity: &str) {
    let response = client
        .post(format!("{base_url}/api/login"))
        .json(&json!({ "email": "ana@example.com", "password": "secret" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .put(format!("{base_url}/api/profile"))
        .json(&json!({
            "fullName": "Ana",
            "email": "ana@example.com",
            "activeTime": "morning",
            "dailyAvailability": "3-4",
            "habitIntensity": "moderate",
            "stressSensitivity": sensitivity,
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

async fn add_habit(client: &Client, base_url: &str, name: &str) -> Habit {
    let response = client
        .post(format!("{base_url}/api/habits"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn metrics(client: &Client, base_url: &str) -> Metrics {
    client
        .get(format!("{base_url}/api/metrics"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_login_and_profile_setup() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    fresh(&client, base).await;

    let session: Value = client
        .get(format!("{base}/api/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["loggedIn"], false);

    let missing = client.get(format!("{base}/api/profile")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let blocked = client.get(format!("{base}/api/metrics")).send().await.unwrap();
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    onboard(&client, base, "high").await;

    let session: Value = client
        .get(format!("{base}/api/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["loggedIn"], true);
    assert_eq!(session["userName"], "ana");
    assert_eq!(session["profileCompleted"], true);

    let profile: Value = client
        .get(format!("{base}/api/profile"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["fullName"], "Ana");
    assert_eq!(profile["dailyAvailability"], "3-4");

    let invalid = client
        .put(format!("{base}/api/profile"))
        .json(&json!({ "fullName": "", "activeTime": "morning" }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_habits_drive_metrics() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    fresh(&client, base).await;
    onboard(&client, base, "high").await;

    let empty = metrics(&client, base).await;
    assert_eq!(empty.consistency, 0);
    assert_eq!(empty.streak, 0);
    assert_eq!(empty.discipline, 0.0);
    assert_eq!(empty.stress, "Low");

    let run = add_habit(&client, base, "  Run ").await;
    assert_eq!(run.name, "Run");
    assert_eq!(run.streak, 0);
    assert!(!run.completed);
    let read = add_habit(&client, base, "Read").await;
    assert_ne!(run.id, read.id);

    let toggled: Habit = client
        .post(format!("{base}/api/habits/{}/toggle", run.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.streak, 1);

    let snapshot = metrics(&client, base).await;
    assert_eq!(snapshot.consistency, 50);
    assert_eq!(snapshot.streak, 1);
    assert_eq!(snapshot.discipline, 3.0);
    assert_eq!(snapshot.stress, "High");

    let habits: Vec<Habit> = client
        .get(format!("{base}/api/habits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(habits.len(), 2);
    assert_eq!(habits[1].streak, 0);

    let deleted = client
        .delete(format!("{base}/api/habits/{}", read.id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = client
        .post(format!("{base}/api/habits/{}/toggle", read.id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let blank = client
        .post(format!("{base}/api/habits"))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let snapshot = metrics(&client, base).await;
    assert_eq!(snapshot.consistency, 100);
    assert_eq!(snapshot.stress, "Low");
}

#[tokio::test]
async fn http_chat_uses_rule_engine() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    fresh(&client, base).await;
    onboard(&client, base, "medium").await;

    let transcript: Vec<Value> = client
        .get(format!("{base}/api/chat"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0]["type"], "ai");
    assert!(transcript[0]["content"].as_str().unwrap().starts_with("Hi Ana!"));

    let reply: Value = client
        .post(format!("{base}/api/chat"))
        .json(&json!({ "message": "what about stress" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["engine"], "rules");
    assert!(reply.get("fallback").is_none());
    assert!(reply["reply"]["content"]
        .as_str()
        .unwrap()
        .contains("haven't added any habits"));

    add_habit(&client, base, "Run").await;
    let reply: Value = client
        .post(format!("{base}/api/chat"))
        .json(&json!({ "message": "Any burnout risk?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let content = reply["reply"]["content"].as_str().unwrap();
    assert!(content.contains("medium stress sensitivity"), "{content}");
    assert!(content.contains("(Run)"));

    let forced: Value = client
        .post(format!("{base}/api/chat"))
        .json(&json!({ "message": "hi", "engine": "assistant" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(forced["engine"], "rules");
    assert_eq!(forced["fallback"], "not-configured");
    assert!(forced["reply"]["content"].as_str().unwrap().contains("Ana"));

    let blank = client
        .post(format!("{base}/api/chat"))
        .json(&json!({ "message": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let transcript: Vec<Value> = client
        .get(format!("{base}/api/chat"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(transcript.len(), 7);
}

#[tokio::test]
async fn http_dashboard_page_renders() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = &server.base_url;
    fresh(&client, base).await;

    let signed_out = client
        .get(format!("{base}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(signed_out.contains("<span id=\"name\">there</span>"));
    assert!(signed_out.contains("<form id=\"login-form\">"));
    assert!(signed_out.contains("<form id=\"setup-form\">"));

    onboard(&client, base, "low").await;

    let page = client
        .get(format!("{base}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("WELCOME BACK, <span id=\"name\">Ana</span>"));

    let insights: Value = client
        .get(format!("{base}/api/insights"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(insights["cards"].as_array().unwrap().len(), 3);
}
