//! Shared fakes for controller integration tests: a scripted registry
//! backend that records every raw invocation, and a workload observer that
//! serves pre-programmed event streams.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use slurmsync_observe::{
    Condition, EventKind, ObserveError, Workload, WorkloadEvent, WorkloadObserver, WorkloadPhase,
};
use slurmsync_registry::{Node, NodeControl, NodeState, RegistryError};

/// One raw registry invocation, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Show(String),
    Create(String),
    Delete(String),
}

#[derive(Default)]
struct ControlInner {
    nodes: Mutex<HashMap<String, Node>>,
    calls: Mutex<Vec<Call>>,
    fail_creates: Mutex<HashSet<String>>,
    fail_deletes: Mutex<HashSet<String>>,
    fail_list: Mutex<bool>,
}

/// Scripted in-memory registry backend.
///
/// Mutations update the in-memory node set the way scontrol would; failure
/// injection still records the invocation, modelling a command that ran and
/// exited non-zero.
#[derive(Clone, Default)]
pub struct ScriptedControl {
    inner: Arc<ControlInner>,
}

impl ScriptedControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(self, name: &str, state: NodeState) -> Self {
        self.inner.nodes.lock().unwrap().insert(
            name.to_string(),
            Node {
                name: name.to_string(),
                state,
                properties: HashMap::new(),
            },
        );
        self
    }

    pub fn fail_create(&self, name: &str) {
        self.inner
            .fail_creates
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    pub fn fail_delete(&self, name: &str) {
        self.inner
            .fail_deletes
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    pub fn fail_list(&self) {
        *self.inner.fail_list.lock().unwrap() = true;
    }

    pub fn node(&self, name: &str) -> Option<Node> {
        self.inner.nodes.lock().unwrap().get(name).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Names passed to raw create, in invocation order.
    pub fn creates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Names passed to raw delete, in invocation order.
    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.inner.calls.lock().unwrap().push(call);
    }

    fn command_failed(op: &str, name: &str) -> RegistryError {
        RegistryError::CommandFailed {
            command: format!("scontrol {op} nodename={name}"),
            status: "exit status: 1".to_string(),
            stderr: format!("scripted {op} failure"),
        }
    }
}

impl NodeControl for ScriptedControl {
    async fn list_nodes(&self) -> Result<HashMap<String, Node>, RegistryError> {
        self.record(Call::List);
        if *self.inner.fail_list.lock().unwrap() {
            return Err(RegistryError::CommandFailed {
                command: "scontrol show nodes -o".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "scripted list failure".to_string(),
            });
        }
        Ok(self.inner.nodes.lock().unwrap().clone())
    }

    async fn show_node(&self, name: &str) -> Result<Option<Node>, RegistryError> {
        self.record(Call::Show(name.to_string()));
        Ok(self.inner.nodes.lock().unwrap().get(name).cloned())
    }

    async fn create_node(&self, name: &str) -> Result<(), RegistryError> {
        self.record(Call::Create(name.to_string()));
        if self.inner.fail_creates.lock().unwrap().contains(name) {
            return Err(Self::command_failed("create", name));
        }
        self.inner.nodes.lock().unwrap().insert(
            name.to_string(),
            Node {
                name: name.to_string(),
                state: NodeState::Cloud,
                properties: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_node(&self, name: &str) -> Result<(), RegistryError> {
        self.record(Call::Delete(name.to_string()));
        if self.inner.fail_deletes.lock().unwrap().contains(name) {
            return Err(Self::command_failed("delete", name));
        }
        self.inner.nodes.lock().unwrap().remove(name);
        Ok(())
    }
}

enum ScriptedStream {
    /// Yields the events, then terminates the stream.
    Closing(Vec<WorkloadEvent>),
    /// Yields the events, then stays open forever.
    Open(Vec<WorkloadEvent>),
}

#[derive(Default)]
struct ObserverInner {
    workloads: Mutex<Vec<Workload>>,
    streams: Mutex<VecDeque<ScriptedStream>>,
    watch_calls: AtomicUsize,
}

/// Observer serving scripted snapshots and event streams.
///
/// Once the scripted streams are exhausted, further watch calls return an
/// empty stream that never terminates.
#[derive(Clone, Default)]
pub struct FakeObserver {
    inner: Arc<ObserverInner>,
}

impl FakeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_workloads(&self, workloads: Vec<Workload>) {
        *self.inner.workloads.lock().unwrap() = workloads;
    }

    /// Queue a stream that terminates after its events.
    pub fn push_stream(&self, events: Vec<WorkloadEvent>) {
        self.inner
            .streams
            .lock()
            .unwrap()
            .push_back(ScriptedStream::Closing(events));
    }

    /// Queue a stream that stays open after its events.
    pub fn push_open_stream(&self, events: Vec<WorkloadEvent>) {
        self.inner
            .streams
            .lock()
            .unwrap()
            .push_back(ScriptedStream::Open(events));
    }

    pub fn watch_calls(&self) -> usize {
        self.inner.watch_calls.load(Ordering::SeqCst)
    }
}

impl WorkloadObserver for FakeObserver {
    async fn list(&self) -> Result<Vec<Workload>, ObserveError> {
        Ok(self.inner.workloads.lock().unwrap().clone())
    }

    async fn watch(&self) -> Result<BoxStream<'static, WorkloadEvent>, ObserveError> {
        self.inner.watch_calls.fetch_add(1, Ordering::SeqCst);

        match self.inner.streams.lock().unwrap().pop_front() {
            Some(ScriptedStream::Closing(events)) => Ok(stream::iter(events).boxed()),
            Some(ScriptedStream::Open(events)) => {
                Ok(stream::iter(events).chain(stream::pending()).boxed())
            }
            None => Ok(stream::pending().boxed()),
        }
    }
}

/// A Running workload with a Ready-true condition.
pub fn ready_workload(name: &str) -> Workload {
    Workload {
        name: name.to_string(),
        phase: WorkloadPhase::Running,
        conditions: vec![Condition {
            name: "Ready".to_string(),
            status: true,
            message: None,
        }],
    }
}

/// A Running workload whose Ready condition is false.
pub fn not_ready_workload(name: &str) -> Workload {
    Workload {
        name: name.to_string(),
        phase: WorkloadPhase::Running,
        conditions: vec![Condition {
            name: "Ready".to_string(),
            status: false,
            message: Some("containers with unready status".to_string()),
        }],
    }
}

pub fn event(kind: EventKind, workload: Workload) -> WorkloadEvent {
    WorkloadEvent { kind, workload }
}

/// Poll a condition until it holds, panicking after one second.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within one second");
}
