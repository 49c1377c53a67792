use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Integration tests need a reachable Postgres. When DATABASE_URL is not
/// set the tests skip rather than fail, so unit-only runs stay green.
pub fn db_available() -> bool {
    std::env::var("DATABASE_URL").is_ok() || std::env::var("TEST_DATABASE_URL").is_ok()
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/docket-api");
        cmd.env("DOCKET_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // TEST_DATABASE_URL, when set, points the server at a scratch database
        if let Ok(url) = std::env::var("TEST_DATABASE_URL") {
            cmd.env("DATABASE_URL", url);
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Register a fresh account and log in, returning the bearer token. Each
/// call uses a unique email so tests never collide on state.
pub async fn register_and_login(server: &TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let email = format!("tester-{}@firm.example", uuid::Uuid::new_v4());
    let password = "a-long-enough-password";

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({ "email": email, "name": "Integration Tester", "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body: Value = res.json().await?;
    let token = body["data"]["access_token"]
        .as_str()
        .context("missing access_token")?
        .to_string();
    Ok(token)
}

/// Unwrap the `{"success": true, "data": ...}` envelope.
pub fn data(body: &Value) -> &Value {
    &body["data"]
}
