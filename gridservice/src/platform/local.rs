use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, info, warn};

use crate::errors::PlatformError;
use crate::worker::TaskProcessor;

use super::options::TaskOptions;
use super::traits::{SessionId, SlotId, TaskId, TaskPlatform, TaskSubmission};

#[derive(Debug, Clone)]
enum Slot {
    Empty,
    Ready(Vec<u8>),
    Failed(String),
}

struct Session {
    options: TaskOptions,
    slots: HashMap<SlotId, Slot>,
}

#[derive(Default)]
struct Shared {
    sessions: Mutex<HashMap<SessionId, Session>>,
    completed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn complete(&self, session: &SessionId, slot: &SlotId, outcome: Result<Vec<u8>, String>) {
        let mut sessions = self.lock();
        if let Some(entry) = sessions
            .get_mut(session)
            .and_then(|s| s.slots.get_mut(slot))
        {
            *entry = match outcome {
                Ok(data) => Slot::Ready(data),
                Err(message) => Slot::Failed(message),
            };
        }
        self.completed.notify_all();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}

/// Runs a task until it succeeds or `max_retries` extra attempts are spent.
fn run_with_retries(
    processor: &dyn TaskProcessor,
    task: &TaskId,
    payload: &[u8],
    options: &TaskOptions,
) -> Result<Vec<u8>, String> {
    let attempts = options.max_retries.saturating_add(1);
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| processor.process(payload, options)));
        match outcome {
            Ok(Ok(data)) => {
                debug!(task = %task, attempt, "task completed");
                return Ok(data);
            }
            Ok(Err(failure)) => last_error = failure.to_string(),
            Err(panic) => last_error = panic_message(panic),
        }
        if attempt < attempts {
            warn!(task = %task, attempt, error = %last_error, "task failed, retrying");
        }
    }
    error!(task = %task, attempts, error = %last_error, "task failed");
    Err(last_error)
}

/// In-process task platform: sessions and slots live in memory and tasks run on a
/// rayon thread pool.
pub struct LocalPlatform {
    pool: ThreadPool,
    processor: Arc<dyn TaskProcessor>,
    shared: Arc<Shared>,
}

impl LocalPlatform {
    /// `num_threads == 0` lets rayon pick the thread count.
    pub fn new(processor: Arc<dyn TaskProcessor>, num_threads: usize) -> Result<Self, PlatformError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("grid-worker-{}", i))
            .build()
            .map_err(|e| PlatformError::WorkerPool(e.to_string()))?;
        Ok(Self {
            pool,
            processor,
            shared: Arc::new(Shared::default()),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn new_id(prefix: &str) -> String {
        format!("{}-{:016x}", prefix, rand::random::<u64>())
    }
}

impl TaskPlatform for LocalPlatform {
    fn create_session(&self, options: &TaskOptions) -> Result<SessionId, PlatformError> {
        let id = SessionId::new(Self::new_id("session"));
        self.shared.lock().insert(
            id.clone(),
            Session {
                options: options.clone(),
                slots: HashMap::new(),
            },
        );
        info!(session = %id, partition = %options.partition_id, "created session");
        Ok(id)
    }

    fn create_slots(
        &self,
        session: &SessionId,
        names: &[String],
    ) -> Result<Vec<SlotId>, PlatformError> {
        let mut sessions = self.shared.lock();
        let entry = sessions
            .get_mut(session)
            .ok_or_else(|| PlatformError::UnknownSession(session.to_string()))?;
        let ids: Vec<SlotId> = names
            .iter()
            .map(|name| SlotId::new(Self::new_id(name)))
            .collect();
        for id in &ids {
            entry.slots.insert(id.clone(), Slot::Empty);
        }
        Ok(ids)
    }

    fn upload(
        &self,
        session: &SessionId,
        slot: &SlotId,
        data: Vec<u8>,
    ) -> Result<(), PlatformError> {
        let mut sessions = self.shared.lock();
        let entry = sessions
            .get_mut(session)
            .ok_or_else(|| PlatformError::UnknownSession(session.to_string()))?
            .slots
            .get_mut(slot)
            .ok_or_else(|| PlatformError::UnknownSlot(slot.to_string()))?;
        if !matches!(entry, Slot::Empty) {
            return Err(PlatformError::Rejected(format!("slot {} already holds data", slot)));
        }
        *entry = Slot::Ready(data);
        self.shared.completed.notify_all();
        Ok(())
    }

    fn submit_tasks(
        &self,
        session: &SessionId,
        tasks: Vec<TaskSubmission>,
    ) -> Result<Vec<TaskId>, PlatformError> {
        let mut jobs = Vec::with_capacity(tasks.len());
        {
            let sessions = self.shared.lock();
            let entry = sessions
                .get(session)
                .ok_or_else(|| PlatformError::UnknownSession(session.to_string()))?;
            for task in tasks {
                let payload = match entry.slots.get(&task.payload) {
                    Some(Slot::Ready(data)) => data.clone(),
                    Some(_) => return Err(PlatformError::SlotNotReady(task.payload.to_string())),
                    None => return Err(PlatformError::UnknownSlot(task.payload.to_string())),
                };
                match entry.slots.get(&task.expected_output) {
                    Some(Slot::Empty) => {}
                    Some(_) => {
                        return Err(PlatformError::Rejected(format!(
                            "output slot {} is already completed",
                            task.expected_output
                        )))
                    }
                    None => {
                        return Err(PlatformError::UnknownSlot(task.expected_output.to_string()))
                    }
                }
                let options = task.options.unwrap_or_else(|| entry.options.clone());
                jobs.push((
                    TaskId::new(Self::new_id("task")),
                    payload,
                    task.expected_output,
                    options,
                ));
            }
        }

        let mut ids = Vec::with_capacity(jobs.len());
        for (task_id, payload, output, options) in jobs {
            ids.push(task_id.clone());
            let shared = Arc::clone(&self.shared);
            let processor = Arc::clone(&self.processor);
            let session = session.clone();
            self.pool.spawn(move || {
                let outcome = run_with_retries(processor.as_ref(), &task_id, &payload, &options);
                shared.complete(&session, &output, outcome);
            });
        }
        debug!(session = %session, tasks = ids.len(), "tasks submitted");
        Ok(ids)
    }

    fn wait_for_slots(&self, session: &SessionId, slots: &[SlotId]) -> Result<(), PlatformError> {
        let started = Instant::now();
        let mut sessions = self.shared.lock();
        let timeout = sessions
            .get(session)
            .ok_or_else(|| PlatformError::UnknownSession(session.to_string()))?
            .options
            .max_duration();
        let deadline = started.checked_add(timeout);

        loop {
            let entry = sessions
                .get(session)
                .ok_or_else(|| PlatformError::UnknownSession(session.to_string()))?;
            let mut pending = 0;
            for slot in slots {
                match entry.slots.get(slot) {
                    Some(Slot::Empty) => pending += 1,
                    Some(_) => {}
                    None => return Err(PlatformError::UnknownSlot(slot.to_string())),
                }
            }
            if pending == 0 {
                return Ok(());
            }

            sessions = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(PlatformError::Timeout {
                            waited: now - started,
                            pending,
                        });
                    }
                    self.shared
                        .completed
                        .wait_timeout(sessions, deadline - now)
                        .unwrap_or_else(|e| e.into_inner())
                        .0
                }
                None => self
                    .shared
                    .completed
                    .wait(sessions)
                    .unwrap_or_else(|e| e.into_inner()),
            };
        }
    }

    fn download(&self, session: &SessionId, slot: &SlotId) -> Result<Vec<u8>, PlatformError> {
        let sessions = self.shared.lock();
        let entry = sessions
            .get(session)
            .ok_or_else(|| PlatformError::UnknownSession(session.to_string()))?;
        match entry.slots.get(slot) {
            Some(Slot::Ready(data)) => Ok(data.clone()),
            Some(Slot::Failed(message)) => Err(PlatformError::TaskFailed {
                slot: slot.to_string(),
                message: message.clone(),
            }),
            Some(Slot::Empty) => Err(PlatformError::SlotNotReady(slot.to_string())),
            None => Err(PlatformError::UnknownSlot(slot.to_string())),
        }
    }
}
