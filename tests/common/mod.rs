//! Shared testing utilities for collabflow CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(dead_code)]
pub const TOKEN: &str = "test-token";

/// Isolated working directory plus a mock marketplace backend.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
    server: mockito::ServerGuard,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new environment with a `collabflow.toml` pointing at the mock server.
    pub fn new() -> Self {
        Self::with_role("influencer")
    }

    pub fn with_role(role: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        let server = mockito::Server::new();

        let ctx = Self { root, work_dir, server };
        ctx.write_config(&format!(
            "[api]\napi_url = \"{}/api/\"\nmax_retries = 1\nretry_delay_ms = 1\n\n[session]\nrole = \"{}\"\n",
            ctx.server.url(),
            role
        ));
        ctx
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.work_dir.join("collabflow.toml")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write collabflow.toml");
    }

    pub fn server(&mut self) -> &mut mockito::ServerGuard {
        &mut self.server
    }

    /// Build a command for invoking the compiled `collabflow` binary in the work directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("collabflow").expect("Failed to locate collabflow binary");
        cmd.current_dir(&self.work_dir)
            .env("COLLABFLOW_API_TOKEN", TOKEN)
            .env_remove("COLLABFLOW_CONFIG")
            .env("RUST_LOG", "off");
        cmd
    }

    /// Serve `body` for `GET /api/collaborations/<id>`.
    pub fn serve_request(&mut self, id: &str, body: String) -> mockito::Mock {
        self.server
            .mock("GET", format!("/api/collaborations/{}", id).as_str())
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create()
    }

    pub fn serve_terms(&mut self) -> mockito::Mock {
        self.server
            .mock("GET", "/api/contracts/terms")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"version": "2026-03", "terms": [
                    {"title": "Disclosure", "body": "Label sponsored posts."},
                    {"title": "Exclusivity", "body": "No competing serums for 30 days."}
                ]}"#,
            )
            .create()
    }

    /// Keep the temp root alive for the lifetime of the context.
    pub fn root(&self) -> &Path {
        self.root.path()
    }
}

/// Backend JSON for a collaboration request.
#[allow(dead_code)]
pub fn request_json(id: &str, status: &str, commission: f64) -> String {
    serde_json::json!({
        "id": id,
        "merchant": {"id": "m-1", "name": "Glow Cosmetics"},
        "influencer": {"id": "i-1", "name": "Sam Rivera"},
        "products": [{"id": "p-1", "name": "Vitamin C Serum", "price": 29.9}],
        "proposed_commission": commission,
        "message": "Would love to work together",
        "status": status,
        "created_at": "2026-03-01T10:00:00Z"
    })
    .to_string()
}
