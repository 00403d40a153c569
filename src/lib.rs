//! Tally: client-side todo state kept in sync with a backend.
//!
//! The backend owns every todo and assigns ids. The client keeps a
//! session-scoped copy that only ever changes by applying what the backend
//! returned, and derives everything it renders from that copy.
//!
//! # Example
//!
//! ```no_run
//! use tally::{Dispatcher, MemoryBackend, Session};
//! use tokio::task::LocalSet;
//!
//! # async fn demo() {
//! LocalSet::new()
//!     .run_until(async {
//!         let mut dispatcher = Dispatcher::new(MemoryBackend::new());
//!         let mut session = Session::default();
//!
//!         let load = session.load();
//!         dispatcher.run(&mut session, load).await;
//!
//!         session.set_input("buy milk");
//!         let add = session.submit().unwrap();
//!         dispatcher.run(&mut session, add).await;
//!
//!         let id = session.store().items()[0].id;
//!         let toggle = session.toggle(id).unwrap();
//!         dispatcher.run(&mut session, toggle).await;
//!
//!         let clear = session.clear_completed().unwrap();
//!         dispatcher.run(&mut session, clear).await;
//!         assert!(session.store().is_empty());
//!     })
//!     .await;
//! # }
//! ```

mod types;

pub mod backend;
pub mod client;
pub mod command;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod memory;
pub mod protocol;
pub mod session;
pub mod status;
pub mod store;
pub mod view;

// Re-export public API
pub use backend::Backend;
pub use client::SocketBackend;
pub use command::{Command, Completion, ExportOutcome, ListOutcome};
pub use config::Config;
pub use daemon::{Daemon, DaemonConfig, is_daemon_running, start_daemon};
pub use dispatch::Dispatcher;
pub use memory::MemoryBackend;
pub use protocol::{Request, Response};
pub use session::{Session, Settings, UiState};
pub use status::TransientStatus;
pub use store::TodoStore;
pub use types::{Filter, Priority, Rejection, Todo};
pub use view::{Counts, EmptyState, View};
