//! Backend reached through the daemon's Unix socket.

use crate::backend::Backend;
use crate::daemon::{DaemonConfig, is_daemon_running, start_daemon};
use crate::protocol::{Request, Response};
use crate::types::{Priority, Todo};
use eyre::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Connection attempts while waiting for an auto-started daemon.
const START_ATTEMPTS: u32 = 20;

/// Delay between those attempts.
const START_POLL: Duration = Duration::from_millis(50);

/// `Backend` over the daemon socket.
///
/// Every call opens its own connection, so several calls can be in flight
/// at once without sharing a stream.
#[derive(Debug, Clone)]
pub struct SocketBackend {
    socket_path: PathBuf,
}

impl SocketBackend {
    /// Talk to the socket at `socket_path` without checking that it exists.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Connect to the daemon for `root`, optionally auto-starting it if not running.
    pub async fn connect(root: &Path, auto_start: bool, export_dir: Option<&Path>) -> Result<Self> {
        let config = DaemonConfig::new(root);
        let socket_path = config.socket_path();

        if UnixStream::connect(&socket_path).await.is_ok() {
            return Ok(Self::new(socket_path));
        }
        if !auto_start {
            bail!("Failed to connect to daemon at {}. Is it running?", socket_path.display());
        }

        if !is_daemon_running(root) {
            start_daemon(root, export_dir).context("Failed to auto-start daemon")?;
        }

        // Wait for daemon to be ready
        for _ in 0..START_ATTEMPTS {
            tokio::time::sleep(START_POLL).await;
            if UnixStream::connect(&socket_path).await.is_ok() {
                return Ok(Self::new(socket_path));
            }
        }
        bail!("Daemon failed to start in time")
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send a request on a fresh connection and receive a response.
    async fn request(&self, request: Request) -> Result<Response> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .with_context(|| format!("Failed to connect to {}", self.socket_path.display()))?;
        let (reader, mut writer) = stream.into_split();

        let mut request_json = serde_json::to_string(&request)?;
        request_json.push('\n');
        writer.write_all(request_json.as_bytes()).await?;
        writer.flush().await?;

        let mut response_line = String::new();
        let read = BufReader::new(reader).read_line(&mut response_line).await?;
        if read == 0 {
            bail!("Daemon closed the connection without responding");
        }

        let response: Response = serde_json::from_str(&response_line).context("Failed to parse response")?;
        Ok(response)
    }

    async fn todos(&self, request: Request) -> Result<Option<Vec<Todo>>> {
        match self.request(request).await? {
            Response::Todos { todos } => Ok(todos),
            Response::Error { message } => bail!("{}", message),
            other => bail!("Unexpected response: {:?}", other),
        }
    }

    /// Shutdown the daemon.
    pub async fn shutdown(&self) -> Result<()> {
        match self.request(Request::Shutdown).await? {
            Response::Ok => Ok(()),
            Response::Error { message } => bail!("{}", message),
            other => bail!("Unexpected response: {:?}", other),
        }
    }

    /// Ping the daemon.
    pub async fn ping(&self) -> Result<()> {
        match self.request(Request::Ping).await? {
            Response::Pong => Ok(()),
            Response::Error { message } => bail!("{}", message),
            other => bail!("Unexpected response: {:?}", other),
        }
    }
}

impl Backend for SocketBackend {
    async fn get_todos(&self) -> Result<Option<Vec<Todo>>> {
        self.todos(Request::GetTodos).await
    }

    async fn add_todo(&self, text: &str, priority: Priority) -> Result<Todo> {
        let response = self
            .request(Request::AddTodo {
                text: text.to_string(),
                priority,
            })
            .await?;

        match response {
            Response::Todo { todo } => Ok(todo),
            Response::Error { message } => bail!("{}", message),
            other => bail!("Unexpected response: {:?}", other),
        }
    }

    async fn toggle_todo(&self, id: i64) -> Result<Option<Vec<Todo>>> {
        self.todos(Request::ToggleTodo { id }).await
    }

    async fn delete_todo(&self, id: i64) -> Result<Option<Vec<Todo>>> {
        self.todos(Request::DeleteTodo { id }).await
    }

    async fn clear_completed(&self) -> Result<Option<Vec<Todo>>> {
        self.todos(Request::ClearCompleted).await
    }

    async fn export_todos(&self) -> Result<String> {
        match self.request(Request::ExportTodos).await? {
            Response::Exported { path } => Ok(path),
            Response::Error { message } => bail!("{}", message),
            other => bail!("Unexpected response: {:?}", other),
        }
    }
}
