//! Helpers shared by the integration tests that spawn `openapi-mcp-server`.

use anyhow::Context as _;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

/// Child process that is killed when the guard goes out of scope.
pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// Pick an unused TCP port on localhost.
///
/// The port is not reserved; another process may still grab it first.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// Poll an HTTP URL until it answers with a 2xx status.
///
/// # Errors
///
/// Returns an error if the timeout elapses first.
pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > timeout_dur {
            anyhow::bail!("timed out waiting for {url}");
        }

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
}

/// Wait for a child to exit on its own.
///
/// # Errors
///
/// Returns an error if the child is still running after `timeout_dur`.
pub async fn wait_exit(child: &mut Child, timeout_dur: Duration) -> anyhow::Result<ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("poll child")? {
            return Ok(status);
        }
        if start.elapsed() > timeout_dur {
            anyhow::bail!("child still running after {timeout_dur:?}");
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Write `contents` to `dir/name` and return the full path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
