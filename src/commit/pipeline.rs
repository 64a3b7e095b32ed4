//! Batched, asynchronous commits of edited components
//!
//! Edits schedule their instance into a queue on the owner thread. A flush
//! encodes each queued instance (still on the owner thread), then hands the
//! encoded text to the sink on the async runtime. Completions come back over
//! a channel and are applied by `poll` or `settle`, again on the owner
//! thread, so the reactive graph is never touched from elsewhere.
//!
//! An instance id has at most one push in flight, even when several loaded
//! instances share it. Edits made while a push is in flight queue exactly one
//! follow-up commit, and the dirty flag only clears when the revision that was
//! pushed is still the current one. A failed push leaves the instance queued
//! so the next flush retries it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{CommitError, EngineCommitSink};
use crate::component::{codec, CommitScheduler, ComponentInstance, WeakComponentInstance};
use crate::config::CommitPolicy;
use crate::identity::InstanceId;
use crate::observable::ObservableList;

/// What happened to one push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The sink accepted the document. `cleared` is false when the instance
    /// was edited again while the push was in flight.
    Committed { cleared: bool },
    /// The sink refused or failed. The instance stays dirty.
    Failed(CommitError),
    /// The instance was unloaded before the push completed.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub key: Uuid,
    pub instance_id: InstanceId,
    pub revision: u64,
    pub outcome: CommitOutcome,
}

struct QueuedCommit {
    instance: WeakComponentInstance,
    queued_at: Instant,
}

/// Instances awaiting a push, deduplicated, in first-edit order.
#[derive(Default)]
struct CommitQueue {
    entries: RefCell<IndexMap<Uuid, QueuedCommit>>,
}

impl CommitScheduler for CommitQueue {
    fn schedule(&self, instance: &ComponentInstance) {
        self.entries
            .borrow_mut()
            .entry(instance.key())
            .or_insert_with(|| QueuedCommit {
                instance: instance.downgrade(),
                queued_at: Instant::now(),
            });
    }
}

struct InFlight {
    instance: WeakComponentInstance,
    instance_id: InstanceId,
    revision: u64,
}

struct Completion {
    key: Uuid,
    result: Result<(), CommitError>,
}

pub struct CommitPipeline {
    sink: Arc<dyn EngineCommitSink>,
    runtime: Handle,
    policy: CommitPolicy,
    queue: Rc<CommitQueue>,
    in_flight: HashMap<Uuid, InFlight>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl CommitPipeline {
    pub fn new(sink: Arc<dyn EngineCommitSink>, runtime: Handle, policy: CommitPolicy) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            sink,
            runtime,
            policy,
            queue: Rc::new(CommitQueue::default()),
            in_flight: HashMap::new(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn policy(&self) -> &CommitPolicy {
        &self.policy
    }

    /// Route the instance's future edits into this pipeline.
    pub fn attach(&self, instance: &ComponentInstance) {
        let scheduler: Rc<dyn CommitScheduler> = self.queue.clone();
        instance.attach_scheduler(Rc::downgrade(&scheduler));
    }

    pub fn attach_all(&self, components: &ObservableList<ComponentInstance>) {
        for instance in components.to_vec() {
            self.attach(&instance);
        }
    }

    /// Stop routing edits and drop any queued commit for the instance.
    pub fn detach(&self, instance: &ComponentInstance) {
        instance.detach_scheduler();
        self.queue.entries.borrow_mut().shift_remove(&instance.key());
    }

    /// Queue a dirty instance again, e.g. to retry after a failed push.
    pub fn request_commit(&self, instance: &ComponentInstance) -> bool {
        if !instance.is_dirty() {
            return false;
        }
        self.queue.schedule(instance);
        true
    }

    pub fn queued(&self) -> usize {
        self.queue.entries.borrow().len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queued() == 0 && self.in_flight.is_empty()
    }

    /// Start a push for every queued instance that has none in flight.
    pub fn flush(&mut self) -> usize {
        self.start_ready(None, &HashSet::new())
    }

    /// Like `flush`, but only for instances queued at least one batch window before `now`.
    pub fn flush_due(&mut self, now: Instant) -> usize {
        self.start_ready(Some(now), &HashSet::new())
    }

    fn start_ready(&mut self, now: Option<Instant>, held: &HashSet<Uuid>) -> usize {
        let window = self.policy.batch_window();
        let ready: Vec<QueuedCommit> = {
            let mut entries = self.queue.entries.borrow_mut();
            let due: Vec<Uuid> = entries
                .iter()
                .filter(|(key, queued)| {
                    !self.in_flight.contains_key(*key)
                        && !held.contains(*key)
                        && now.map_or(true, |now| {
                            now.saturating_duration_since(queued.queued_at) >= window
                        })
                })
                .map(|(key, _)| *key)
                .collect();
            due.iter().filter_map(|key| entries.shift_remove(key)).collect()
        };

        let mut started = 0;
        for queued in ready {
            if self.start(queued) {
                started += 1;
            }
        }
        started
    }

    fn start(&mut self, queued: QueuedCommit) -> bool {
        let key = queued.instance.key();
        let Some(instance) = queued.instance.upgrade() else {
            log::debug!("Dropping queued commit for unloaded component {}", key);
            return false;
        };
        if !instance.is_dirty() {
            return false;
        }

        let instance_id = instance.instance_id();
        if !instance_id.is_empty()
            && self
                .in_flight
                .values()
                .any(|in_flight| in_flight.instance_id == instance_id)
        {
            log::debug!("{} already has a push in flight", instance_id);
            self.queue.entries.borrow_mut().entry(key).or_insert(queued);
            return false;
        }

        let revision = instance.revision();
        let document = match codec::encode_to_string(&instance) {
            Ok(document) => document,
            Err(e) => {
                log::warn!(
                    "Failed to encode {} ({}): {}",
                    instance.typename(),
                    instance_id,
                    e
                );
                return false;
            }
        };

        let sink = Arc::clone(&self.sink);
        let completions = self.completions_tx.clone();
        let push_id = instance_id.clone();
        self.runtime.spawn(async move {
            let result = sink.push(&push_id, &document).await;
            // Receiver lives as long as the pipeline
            let _ = completions.send(Completion { key, result });
        });

        log::debug!(
            "Pushing {} ({}) at revision {}",
            instance.typename(),
            instance_id,
            revision
        );
        self.in_flight.insert(
            key,
            InFlight {
                instance: queued.instance,
                instance_id,
                revision,
            },
        );
        true
    }

    /// Apply every completion that has already arrived.
    pub fn poll(&mut self) -> Vec<CommitReport> {
        let mut reports = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            reports.extend(self.complete(completion));
        }
        reports
    }

    /// Flush and wait until nothing is in flight, follow-up commits
    /// included. Ignores the batch window.
    ///
    /// An instance whose push fails here stays queued for the next flush
    /// rather than being retried within this call.
    pub async fn settle(&mut self) -> Vec<CommitReport> {
        let mut reports = self.poll();
        let mut failed = HashSet::new();
        loop {
            self.start_ready(None, &failed);
            if self.in_flight.is_empty() {
                break;
            }
            let Some(completion) = self.completions_rx.recv().await else {
                break;
            };
            if let Some(report) = self.complete(completion) {
                if matches!(report.outcome, CommitOutcome::Failed(_)) {
                    failed.insert(report.key);
                }
                reports.push(report);
            }
        }
        reports
    }

    fn complete(&mut self, completion: Completion) -> Option<CommitReport> {
        let in_flight = self.in_flight.remove(&completion.key)?;

        let outcome = match in_flight.instance.upgrade() {
            None => {
                log::debug!(
                    "Discarding commit result for unloaded component {}",
                    in_flight.instance_id
                );
                CommitOutcome::Discarded
            }
            Some(instance) => match completion.result {
                Ok(()) => {
                    let cleared = instance.mark_committed(in_flight.revision);
                    if cleared {
                        log::info!(
                            "Committed {} ({})",
                            instance.typename(),
                            in_flight.instance_id
                        );
                    } else {
                        log::debug!(
                            "{} changed while its commit was in flight",
                            in_flight.instance_id
                        );
                    }
                    CommitOutcome::Committed { cleared }
                }
                Err(error) => {
                    log::warn!(
                        "Commit of {} ({}) failed: {}",
                        instance.typename(),
                        in_flight.instance_id,
                        error
                    );
                    self.queue
                        .entries
                        .borrow_mut()
                        .entry(completion.key)
                        .or_insert_with(|| QueuedCommit {
                            instance: in_flight.instance.clone(),
                            queued_at: Instant::now(),
                        });
                    CommitOutcome::Failed(error)
                }
            },
        };

        Some(CommitReport {
            key: completion.key,
            instance_id: in_flight.instance_id,
            revision: in_flight.revision,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::MemoryCommitSink;
    use crate::component::decode_str;
    use crate::schema::SchemaRegistry;
    use std::time::Duration;

    const SCHEMA: &str = "engineTypes:\n  - typename: A\n    properties:\n      speed: float\n";

    fn load(registry: &SchemaRegistry) -> ComponentInstance {
        decode_str(
            "typename: A\noverrideProperties:\n  speed: 1.0\n  instanceId: obj1\n",
            registry,
        )
        .unwrap()
    }

    fn set_speed(instance: &ComponentInstance, value: f32) {
        instance
            .property("speed")
            .unwrap()
            .as_float()
            .unwrap()
            .set(value);
    }

    #[tokio::test]
    async fn test_edits_are_deduplicated_in_queue() {
        let registry = SchemaRegistry::load(SCHEMA).unwrap();
        let sink = Arc::new(MemoryCommitSink::new());
        let pipeline = CommitPipeline::new(sink, Handle::current(), CommitPolicy::default());
        let instance = load(&registry);
        pipeline.attach(&instance);

        set_speed(&instance, 2.0);
        set_speed(&instance, 3.0);
        assert_eq!(pipeline.queued(), 1);
    }

    #[tokio::test]
    async fn test_flush_due_respects_batch_window() {
        let registry = SchemaRegistry::load(SCHEMA).unwrap();
        let sink = Arc::new(MemoryCommitSink::new());
        let mut pipeline = CommitPipeline::new(
            sink,
            Handle::current(),
            CommitPolicy {
                batch_window_ms: 1_000,
            },
        );
        let instance = load(&registry);
        pipeline.attach(&instance);
        set_speed(&instance, 2.0);

        assert_eq!(pipeline.flush_due(Instant::now()), 0);
        assert_eq!(pipeline.flush_due(Instant::now() + Duration::from_secs(2)), 1);
        assert_eq!(pipeline.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_clean_instance_is_not_pushed() {
        let registry = SchemaRegistry::load(SCHEMA).unwrap();
        let sink = Arc::new(MemoryCommitSink::new());
        let mut pipeline =
            CommitPipeline::new(sink.clone(), Handle::current(), CommitPolicy::default());
        let instance = load(&registry);
        pipeline.attach(&instance);

        assert!(!pipeline.request_commit(&instance));
        assert_eq!(pipeline.flush(), 0);
        assert!(pipeline.settle().await.is_empty());
        assert_eq!(sink.push_count().await, 0);
    }

    #[tokio::test]
    async fn test_detach_drops_queued_commit() {
        let registry = SchemaRegistry::load(SCHEMA).unwrap();
        let sink = Arc::new(MemoryCommitSink::new());
        let pipeline = CommitPipeline::new(sink, Handle::current(), CommitPolicy::default());
        let instance = load(&registry);
        pipeline.attach(&instance);
        set_speed(&instance, 2.0);

        pipeline.detach(&instance);
        assert!(pipeline.is_idle());
        set_speed(&instance, 3.0);
        assert_eq!(pipeline.queued(), 0);
    }
}
