//! Shared test infrastructure for Tally integration tests.
//!
//! Provides a scriptable FakeBackend and helpers for driving a session.

#![allow(dead_code)]

use eyre::{Result, eyre};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::Rc;
use tally::{Backend, Command, Dispatcher, MemoryBackend, Priority, Session, Todo};
use tokio::sync::oneshot;
use tokio::task::LocalSet;

/// Backend calls by name, as recorded by FakeBackend.
pub const GET: &str = "get_todos";
pub const ADD: &str = "add_todo";
pub const TOGGLE: &str = "toggle_todo";
pub const DELETE: &str = "delete_todo";
pub const CLEAR: &str = "clear_completed";
pub const EXPORT: &str = "export_todos";

/// MemoryBackend wrapper with failure injection, null answers, call
/// recording and gates that hold a response until released.
///
/// A held call does its work immediately and only delays handing back the
/// answer, like a backend that serializes requests but whose responses
/// travel at different speeds.
#[derive(Default)]
pub struct FakeBackend {
    inner: MemoryBackend,
    calls: RefCell<Vec<&'static str>>,
    failing: RefCell<HashSet<&'static str>>,
    null: RefCell<HashSet<&'static str>>,
    holds: RefCell<HashMap<&'static str, oneshot::Receiver<()>>>,
    export: RefCell<Option<std::result::Result<String, String>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend directly, bypassing the client.
    pub async fn seed(&self, text: &str, done: bool) -> Todo {
        let todo = self.inner.add_todo(text, Priority::Medium).await.expect("seed add failed");
        if done {
            self.inner.toggle_todo(todo.id).await.expect("seed toggle failed");
        }
        Todo { done, ..todo }
    }

    /// Make every later call to `op` fail.
    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    /// Make every later call to `op` answer null.
    pub fn answer_null(&self, op: &'static str) {
        self.null.borrow_mut().insert(op);
    }

    /// Stop injecting failures and nulls.
    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
        self.null.borrow_mut().clear();
    }

    /// Hold the next answer to `op` until the returned sender fires.
    pub fn hold(&self, op: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.borrow_mut().insert(op, rx);
        tx
    }

    /// Script the export answer.
    pub fn set_export(&self, result: std::result::Result<&str, &str>) {
        *self.export.borrow_mut() = Some(result.map(String::from).map_err(String::from));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == op).count()
    }

    /// What the backend currently holds, newest first.
    pub async fn stored(&self) -> Vec<Todo> {
        self.inner.get_todos().await.expect("stored failed").unwrap_or_default()
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        self.calls.borrow_mut().push(op);
        if self.failing.borrow().contains(op) {
            return Err(eyre!("{} unavailable", op));
        }
        Ok(())
    }

    async fn leave(&self, op: &'static str) {
        let hold = self.holds.borrow_mut().remove(op);
        if let Some(rx) = hold {
            let _ = rx.await;
        }
    }

    async fn list(&self, op: &'static str, result: Result<Option<Vec<Todo>>>) -> Result<Option<Vec<Todo>>> {
        let answer = if self.null.borrow().contains(op) { Ok(None) } else { result };
        self.leave(op).await;
        answer
    }
}

impl Backend for FakeBackend {
    async fn get_todos(&self) -> Result<Option<Vec<Todo>>> {
        self.enter(GET)?;
        let result = self.inner.get_todos().await;
        self.list(GET, result).await
    }

    async fn add_todo(&self, text: &str, priority: Priority) -> Result<Todo> {
        self.enter(ADD)?;
        let result = self.inner.add_todo(text, priority).await;
        self.leave(ADD).await;
        result
    }

    async fn toggle_todo(&self, id: i64) -> Result<Option<Vec<Todo>>> {
        self.enter(TOGGLE)?;
        let result = self.inner.toggle_todo(id).await;
        self.list(TOGGLE, result).await
    }

    async fn delete_todo(&self, id: i64) -> Result<Option<Vec<Todo>>> {
        self.enter(DELETE)?;
        let result = self.inner.delete_todo(id).await;
        self.list(DELETE, result).await
    }

    async fn clear_completed(&self) -> Result<Option<Vec<Todo>>> {
        self.enter(CLEAR)?;
        let result = self.inner.clear_completed().await;
        self.list(CLEAR, result).await
    }

    async fn export_todos(&self) -> Result<String> {
        self.enter(EXPORT)?;
        let scripted = self.export.borrow().clone();
        let result = match scripted {
            Some(Ok(path)) => Ok(path),
            Some(Err(message)) => Err(eyre!(message)),
            None => self.inner.export_todos().await,
        };
        self.leave(EXPORT).await;
        result
    }
}

/// A fake backend, a dispatcher sharing it, and a loaded session.
pub struct TestEnv {
    pub backend: Rc<FakeBackend>,
    pub dispatcher: Dispatcher<FakeBackend>,
    pub session: Session,
}

impl TestEnv {
    /// Create an environment over an empty backend. Call `load` before use.
    pub fn new() -> Self {
        Self::with_backend(FakeBackend::new())
    }

    pub fn with_backend(backend: FakeBackend) -> Self {
        let backend = Rc::new(backend);
        let dispatcher = Dispatcher::from_rc(Rc::clone(&backend));
        Self {
            backend,
            dispatcher,
            session: Session::default(),
        }
    }

    /// Run the initial full-list fetch.
    pub async fn load(&mut self) {
        let load = self.session.load();
        self.run(load).await;
    }

    /// Dispatch a command and apply completions until idle.
    pub async fn run(&mut self, command: Command) {
        self.dispatcher.run(&mut self.session, command).await;
    }

    /// Type `text` and submit it, returning whether a command was issued.
    pub async fn add(&mut self, text: &str) -> bool {
        self.session.set_input(text);
        match self.session.submit() {
            Ok(command) => {
                self.run(command).await;
                true
            }
            Err(_) => false,
        }
    }

    pub async fn toggle(&mut self, id: i64) {
        let command = self.session.toggle(id).expect("toggle rejected");
        self.run(command).await;
    }

    pub async fn delete(&mut self, id: i64) {
        let command = self.session.delete(id).expect("delete rejected");
        self.run(command).await;
    }

    pub async fn clear_completed(&mut self) {
        let command = self.session.clear_completed().expect("clear rejected");
        self.run(command).await;
    }

    pub fn ids(&self) -> Vec<i64> {
        self.session.store().items().iter().map(|t| t.id).collect()
    }

    pub fn total(&self) -> usize {
        self.session.store().len()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `f` inside a LocalSet, as the dispatcher requires.
pub async fn local<F: Future>(f: F) -> F::Output {
    LocalSet::new().run_until(f).await
}
