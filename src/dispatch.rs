//! Single-threaded command dispatch.
//!
//! Commands are spawned onto the current `LocalSet` and run concurrently;
//! each one sends its `Completion` back through a channel when its backend
//! call returns. Completions are applied in arrival order, so the last
//! response to arrive wins regardless of the order commands were issued in.
//! There is no cancellation and no client-side timeout. A command task that
//! panics is counted as settled without a completion.

use crate::backend::Backend;
use crate::command::{Command, Completion, execute};
use crate::session::Session;
use log::{debug, warn};
use std::rc::Rc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Issues commands against a backend and collects their completions.
///
/// Must be driven from inside a `tokio::task::LocalSet`.
pub struct Dispatcher<B> {
    backend: Rc<B>,
    tx: mpsc::UnboundedSender<Option<Completion>>,
    rx: mpsc::UnboundedReceiver<Option<Completion>>,
    in_flight: usize,
}

impl<B: Backend + 'static> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self::from_rc(Rc::new(backend))
    }

    /// Share a backend the caller keeps a handle to.
    pub fn from_rc(backend: Rc<B>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Commands issued but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Issue a command without waiting for it.
    pub fn dispatch(&mut self, command: Command) {
        debug!("Dispatching {} ({} already in flight)", command.name(), self.in_flight);
        let backend = Rc::clone(&self.backend);
        let report = Report { tx: Some(self.tx.clone()) };
        self.in_flight += 1;
        tokio::task::spawn_local(async move {
            let completion = execute(&*backend, command).await;
            report.finish(completion);
        });
    }

    /// Wait for the next completion. Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        while self.in_flight > 0 {
            let message = self.rx.recv().await?;
            self.in_flight -= 1;
            match message {
                Some(completion) => return Some(completion),
                None => warn!("Command task ended without a completion"),
            }
        }
        None
    }

    /// Wait for the next completion and apply it. Returns false when nothing is in flight.
    pub async fn apply_next(&mut self, session: &mut Session) -> bool {
        match self.next_completion().await {
            Some(completion) => {
                session.apply(completion, Instant::now());
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is in flight.
    pub async fn settle(&mut self, session: &mut Session) {
        while self.apply_next(session).await {}
    }

    /// Issue a command and apply completions until nothing is in flight.
    pub async fn run(&mut self, session: &mut Session, command: Command) {
        self.dispatch(command);
        self.settle(session).await;
    }
}

/// Sends a task's completion, or `None` if the task is dropped first.
struct Report {
    tx: Option<mpsc::UnboundedSender<Option<Completion>>>,
}

impl Report {
    fn finish(mut self, completion: Completion) {
        if let Some(tx) = self.tx.take() {
            // The receiver lives as long as the dispatcher
            let _ = tx.send(Some(completion));
        }
    }
}

impl Drop for Report {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::types::{Priority, Todo};
    use eyre::Result;
    use tokio::task::LocalSet;

    struct CrashingBackend;

    impl Backend for CrashingBackend {
        async fn get_todos(&self) -> Result<Option<Vec<Todo>>> {
            panic!("backend crashed")
        }

        async fn add_todo(&self, _text: &str, _priority: Priority) -> Result<Todo> {
            panic!("backend crashed")
        }

        async fn toggle_todo(&self, _id: i64) -> Result<Option<Vec<Todo>>> {
            panic!("backend crashed")
        }

        async fn delete_todo(&self, _id: i64) -> Result<Option<Vec<Todo>>> {
            panic!("backend crashed")
        }

        async fn clear_completed(&self) -> Result<Option<Vec<Todo>>> {
            panic!("backend crashed")
        }

        async fn export_todos(&self) -> Result<String> {
            panic!("backend crashed")
        }
    }

    #[tokio::test]
    async fn test_next_completion_without_commands() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let mut dispatcher = Dispatcher::new(MemoryBackend::new());
                assert!(dispatcher.next_completion().await.is_none());
                assert_eq!(dispatcher.in_flight(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_run_load_then_add() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let mut dispatcher = Dispatcher::new(MemoryBackend::new());
                let mut session = Session::default();

                let load = session.load();
                dispatcher.run(&mut session, load).await;
                assert!(session.store().is_empty());

                session.set_input("buy milk");
                let command = session.submit().unwrap();
                dispatcher.run(&mut session, command).await;

                assert_eq!(session.store().len(), 1);
                assert_eq!(dispatcher.in_flight(), 0);
                assert_eq!(dispatcher.backend().get_todos().await.unwrap().unwrap().len(), 1);
            })
            .await;
    }

    #[tokio::test]
    async fn test_several_commands_in_flight() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let mut dispatcher = Dispatcher::new(MemoryBackend::new());
                let mut session = Session::default();

                for text in ["a", "b", "c"] {
                    session.set_input(text);
                    dispatcher.dispatch(session.submit().unwrap());
                }
                assert_eq!(dispatcher.in_flight(), 3);

                dispatcher.settle(&mut session).await;
                assert_eq!(session.store().len(), 3);
            })
            .await;
    }

    #[tokio::test]
    async fn test_panicking_command_still_settles() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let mut dispatcher = Dispatcher::new(CrashingBackend);
                let mut session = Session::default();

                let load = session.load();
                dispatcher.run(&mut session, load).await;

                assert_eq!(dispatcher.in_flight(), 0);
                assert!(session.store().is_empty());
                assert!(dispatcher.next_completion().await.is_none());
            })
            .await;
    }
}
