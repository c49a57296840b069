use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Entry {
    id: String,
    created_at: String,
    choice: i8,
    caption: String,
}

#[derive(Debug, Deserialize)]
struct TrendPoint {
    date: String,
    value: i64,
}

#[derive(Debug, Deserialize)]
struct Trend {
    points: Vec<TrendPoint>,
    y_domain: (i64, i64),
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

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("better_now_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/entries/today")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_better_now"))
        .env("HOST", "127.0.0.1")
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", unique_data_dir())
        .env("APP_ENABLE_SEED", "1")
        .env("RUST_LOG", "info")
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

/// Shared server with an empty store.
async fn fresh_server(client: &Client) -> Arc<TestServer> {
    let server = shared_server().await;
    let response = client
        .post(format!("{}/api/clear", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    server
}

async fn save(client: &Client, server: &TestServer, choice: i8, caption: &str) -> Entry {
    let response = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "choice": choice, "caption": caption }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn list(client: &Client, server: &TestServer) -> Vec<Entry> {
    client
        .get(format!("{}/api/entries", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn today(client: &Client, server: &TestServer) -> Option<Entry> {
    client
        .get(format!("{}/api/entries/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_save_is_visible_as_today() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    assert!(today(&client, &server).await.is_none());

    let saved = save(&client, &server, 1, "  good focus  ").await;
    assert_eq!(saved.choice, 1);
    assert_eq!(saved.caption, "good focus");
    assert_eq!(saved.id.len(), 10);
    assert!(!saved.created_at.is_empty());

    assert_eq!(today(&client, &server).await, Some(saved));
}

#[tokio::test]
async fn http_same_day_save_overwrites() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    save(&client, &server, 1, "first").await;
    save(&client, &server, -1, "").await;

    let entries = list(&client, &server).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].choice, -1);
    assert_eq!(entries[0].caption, "");
}

#[tokio::test]
async fn http_invalid_choice_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    let response = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "choice": 3 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(list(&client, &server).await.is_empty());
}

#[tokio::test]
async fn http_delete_entry() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    let saved = save(&client, &server, 0, "meh").await;
    let url = format!("{}/api/entries/{}", server.base_url, saved.id);

    let fetched: Entry = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, saved);

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(today(&client, &server).await.is_none());

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let malformed = format!("{}/api/entries/2026-13-01", server.base_url);
    let response = client.get(&malformed).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.delete(&malformed).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_unpadded_key_resolves_to_stored_day() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    let saved = save(&client, &server, 1, "padded").await;
    let (year, rest) = saved.id.split_once('-').unwrap();
    let (month, day) = rest.split_once('-').unwrap();
    let unpadded = format!(
        "{year}-{}-{}",
        month.trim_start_matches('0'),
        day.trim_start_matches('0')
    );
    let url = format!("{}/api/entries/{unpadded}", server.base_url);

    let fetched: Entry = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, saved);

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(list(&client, &server).await.is_empty());
}

#[tokio::test]
async fn http_form_delete_removes_row() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    let saved = save(&client, &server, 0, "gone soon").await;
    let response = client
        .post(format!("{}/entries/{}/delete", server.base_url, saved.id))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let html = response.text().await.unwrap();
    assert!(!html.contains("gone soon"));
    assert!(list(&client, &server).await.is_empty());
}

#[tokio::test]
async fn http_trend_covers_seven_days() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    let saved = save(&client, &server, 1, "").await;
    let trend: Trend = client
        .get(format!("{}/api/trend", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let values: Vec<i64> = trend.points.iter().map(|p| p.value).collect();
    assert_eq!(values, [0, 0, 0, 0, 0, 0, 1]);
    assert_eq!(trend.points.last().map(|p| p.date.as_str()), Some(saved.id.as_str()));
    assert_eq!(trend.y_domain, (-2, 3));
}

#[tokio::test]
async fn http_seed_then_clear() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    let response = client
        .post(format!("{}/api/seed", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let entries = list(&client, &server).await;
    assert_eq!(entries.len(), 10);
    assert!(entries.iter().all(|e| e.choice == 1));
    assert!(entries.windows(2).all(|w| w[0].id > w[1].id));

    let response = client
        .post(format!("{}/api/clear", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(list(&client, &server).await.is_empty());
}

#[tokio::test]
async fn http_form_save_shows_toast_and_row() {
    let _guard = TEST_LOCK.lock().await;
    let client = Client::new();
    let server = fresh_server(&client).await;

    let response = client
        .post(format!("{}/entries", server.base_url))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("choice=down&caption=rainy+%3Cday%3E")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let html = response.text().await.unwrap();
    assert!(html.contains("Saved."));
    assert!(html.contains("rainy &lt;day&gt;"));
    assert!(html.contains(r#"class="symbol down""#));

    let entries = list(&client, &server).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].choice, -1);
}
