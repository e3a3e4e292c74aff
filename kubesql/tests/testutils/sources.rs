//! Scripted resource sources

use super::bags::{namespace_bag, node_bag, pod_bag};
use kubesql::{
    AttributeBag, ClusterSnapshot, EnumerationError, ListKind, ResourceSource, SnapshotSource,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Snapshot-backed source whose listings can be made to fail on demand
#[derive(Default)]
pub struct ScriptedSource {
    pub snapshot: SnapshotSource,
    failing: Mutex<HashSet<ListKind>>,
}

impl ScriptedSource {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self {
            snapshot: SnapshotSource::new(snapshot),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail(&self, kind: ListKind) {
        self.failing.lock().insert(kind);
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    fn check(&self, kind: ListKind, namespace: Option<&str>) -> Result<(), EnumerationError> {
        if !self.failing.lock().contains(&kind) {
            return Ok(());
        }
        Err(match namespace {
            Some(ns) => EnumerationError::in_namespace(kind, ns, "connection refused"),
            None => EnumerationError::new(kind, "connection refused"),
        })
    }
}

impl ResourceSource for ScriptedSource {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        self.check(ListKind::Nodes, None)?;
        self.snapshot.list_nodes()
    }

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        self.check(ListKind::Namespaces, None)?;
        self.snapshot.list_namespaces()
    }

    fn list_pods(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        self.check(ListKind::Pods, Some(namespace))?;
        self.snapshot.list_pods(namespace)
    }

    fn list_services(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        self.check(ListKind::Services, Some(namespace))?;
        self.snapshot.list_services(namespace)
    }

    fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError> {
        self.check(ListKind::ReplicationControllers, Some(namespace))?;
        self.snapshot.list_replication_controllers(namespace)
    }
}

/// Every refresh sees a new generation number
///
/// Each pass bumps the generation when it lists nodes. All nodes get the
/// generation as their ip, and all pods carry it as a `generation`
/// annotation, so a query can tell whether it saw one complete pass.
pub struct GenerationSource {
    generation: AtomicU64,
    nodes: usize,
    pods: usize,
    /// Pause between listings, widening the window for torn reads
    pause: Duration,
}

impl GenerationSource {
    pub fn new(nodes: usize, pods: usize) -> Self {
        Self {
            generation: AtomicU64::new(0),
            nodes,
            pods,
            pause: Duration::ZERO,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn tag(&self) -> String {
        format!("gen-{}", self.generation())
    }
}

impl ResourceSource for GenerationSource {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let tag = self.tag();
        Ok((0..self.nodes)
            .map(|i| node_bag(&format!("n{}", i), &format!("node-{}", i), &tag))
            .collect())
    }

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(vec![namespace_bag("default")])
    }

    fn list_pods(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        thread::sleep(self.pause);
        let tag = self.tag();
        Ok((0..self.pods)
            .map(|i| {
                let mut bag = pod_bag(
                    &format!("p{}", i),
                    &format!("pod-{}", i),
                    namespace,
                    &[("app", "nginx")],
                );
                bag["metadata"]["annotations"] = json!({"generation": tag});
                bag
            })
            .collect())
    }

    fn list_services(&self, _namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        thread::sleep(self.pause);
        Ok(Vec::new())
    }

    fn list_replication_controllers(
        &self,
        _namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }
}

/// Answers the first node listing immediately and every later one after `delay`
pub struct SlowSource {
    calls: AtomicU64,
    delay: Duration,
}

impl SlowSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicU64::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResourceSource for SlowSource {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
            thread::sleep(self.delay);
        }
        Ok(vec![node_bag("n1", "node-a", "10.0.0.1")])
    }

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }

    fn list_pods(&self, _namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }

    fn list_services(&self, _namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }

    fn list_replication_controllers(
        &self,
        _namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }
}

/// Serves the first node listing, then panics, taking the worker thread down
pub struct PanickingSource {
    calls: AtomicU64,
}

impl PanickingSource {
    pub fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
        }
    }
}

impl ResourceSource for PanickingSource {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
            panic!("source failed");
        }
        Ok(vec![node_bag("n1", "node-a", "10.0.0.1")])
    }

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }

    fn list_pods(&self, _namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }

    fn list_services(&self, _namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }

    fn list_replication_controllers(
        &self,
        _namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Vec::new())
    }
}
