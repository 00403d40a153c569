//! Background daemon serving the reference backend.
//!
//! The daemon provides:
//! - A Unix socket speaking the line-delimited protocol
//! - A single main loop, so the backend handles one request at a time
//! - PID and socket files for discovery by clients

use crate::backend::Backend;
use crate::memory::MemoryBackend;
use crate::protocol::{Request, Response};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};

/// State directory within the store root.
const STATE_DIR: &str = ".tally";

/// Socket file name within the state directory.
const SOCKET_FILE: &str = "daemon.sock";

/// PID file name within the state directory.
const PID_FILE: &str = "daemon.pid";

/// Capacity of the request channel between connections and the main loop.
const REQUEST_QUEUE: usize = 100;

type Envelope = (Request, oneshot::Sender<Response>);

/// Configuration for the daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Root directory containing .tally
    pub root: PathBuf,

    /// Directory exports are written to; exports are cancelled without one
    pub export_dir: Option<PathBuf>,
}

impl DaemonConfig {
    /// Create config with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            export_dir: None,
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Get the state directory path.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Get the socket path.
    pub fn socket_path(&self) -> PathBuf {
        self.state_dir().join(SOCKET_FILE)
    }

    /// Get the PID file path.
    pub fn pid_path(&self) -> PathBuf {
        self.state_dir().join(PID_FILE)
    }
}

/// The todo backend daemon.
pub struct Daemon {
    config: DaemonConfig,
    backend: MemoryBackend,
}

impl Daemon {
    /// Create a new daemon instance.
    pub fn new(config: DaemonConfig) -> Self {
        let backend = match &config.export_dir {
            Some(dir) => MemoryBackend::with_export_dir(dir),
            None => MemoryBackend::new(),
        };
        Self { config, backend }
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Bind the socket and write the PID file.
    pub fn bind(&self) -> Result<UnixListener> {
        fs::create_dir_all(self.config.state_dir()).context("Failed to create state directory")?;

        // Clean up any stale socket
        let socket_path = self.config.socket_path();
        if socket_path.exists() {
            fs::remove_file(&socket_path).ok();
        }

        fs::write(self.config.pid_path(), std::process::id().to_string()).context("Failed to write PID file")?;

        let listener = UnixListener::bind(&socket_path).context("Failed to bind to Unix socket")?;
        log::info!("Daemon listening on {:?}", socket_path);
        Ok(listener)
    }

    /// Bind and serve until a shutdown request arrives.
    pub async fn run(&mut self) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener).await
    }

    /// Serve requests on an already bound listener until shutdown.
    pub async fn serve(&mut self, listener: UnixListener) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<Envelope>(REQUEST_QUEUE);

        let acceptor = tokio::spawn(Self::accept_connections(listener, tx));

        while let Some((request, response_tx)) = rx.recv().await {
            let is_shutdown = matches!(request, Request::Shutdown);
            let response = self.handle_request(request).await;
            let _ = response_tx.send(response);

            if is_shutdown {
                log::info!("Daemon shutting down");
                break;
            }
        }

        acceptor.abort();
        fs::remove_file(self.config.socket_path()).ok();
        fs::remove_file(self.config.pid_path()).ok();

        Ok(())
    }

    /// Accept connections in a background task.
    async fn accept_connections(listener: UnixListener, tx: mpsc::Sender<Envelope>) {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let tx_clone = tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_connection(stream, tx_clone).await {
                            log::warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    log::error!("Accept error: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Handle a single client connection.
    async fn handle_connection(stream: UnixStream, tx: mpsc::Sender<Envelope>) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await.context("Failed to read line")? {
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => {
                    let (resp_tx, resp_rx) = oneshot::channel();
                    tx.send((request, resp_tx))
                        .await
                        .context("Failed to send request to daemon")?;
                    resp_rx.await.context("Daemon dropped request")?
                }
                Err(e) => Response::error(format!("invalid request: {}", e)),
            };

            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Handle a single request.
    async fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::GetTodos => todos_response(self.backend.get_todos().await),

            Request::AddTodo { text, priority } => match self.backend.add_todo(&text, priority).await {
                Ok(todo) => Response::Todo { todo },
                Err(e) => Response::error(format!("{:#}", e)),
            },

            Request::ToggleTodo { id } => todos_response(self.backend.toggle_todo(id).await),

            Request::DeleteTodo { id } => todos_response(self.backend.delete_todo(id).await),

            Request::ClearCompleted => todos_response(self.backend.clear_completed().await),

            Request::ExportTodos => match self.backend.export_todos().await {
                Ok(path) => Response::Exported { path },
                Err(e) => Response::error(format!("{:#}", e)),
            },

            Request::Ping => Response::Pong,

            Request::Shutdown => Response::Ok,
        }
    }
}

fn todos_response(result: Result<Option<Vec<crate::types::Todo>>>) -> Response {
    match result {
        Ok(todos) => Response::Todos { todos },
        Err(e) => Response::error(format!("{:#}", e)),
    }
}

/// Check if a daemon is running for the given store path.
pub fn is_daemon_running(root: &Path) -> bool {
    let config = DaemonConfig::new(root);
    let socket_path = config.socket_path();
    let pid_path = config.pid_path();

    // Check if socket exists
    if !socket_path.exists() {
        return false;
    }

    // Check if PID file exists and process is alive
    if let Ok(pid_str) = fs::read_to_string(&pid_path)
        && let Ok(pid) = pid_str.trim().parse::<i32>()
    {
        // Signal 0 checks existence without delivering anything
        unsafe {
            if libc::kill(pid, 0) == 0 {
                return true;
            }
        }
    }

    // Stale socket, clean up
    fs::remove_file(&socket_path).ok();
    fs::remove_file(&pid_path).ok();
    false
}

/// Start the daemon as a background process.
pub fn start_daemon(root: &Path, export_dir: Option<&Path>) -> Result<()> {
    use std::process::Command;

    let exe = std::env::current_exe().context("Failed to get current executable")?;

    let mut command = Command::new(exe);
    command.args(["--dir", root.to_str().unwrap_or("."), "daemon"]);
    if let Some(dir) = export_dir {
        command.arg("--export-dir").arg(dir);
    }

    command
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .context("Failed to spawn daemon process")?;

    Ok(())
}
