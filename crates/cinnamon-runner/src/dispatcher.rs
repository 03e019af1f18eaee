use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cinnamon_scripting_host::ScriptFunction;
use tokio::sync::mpsc;
use tracing::trace;

use crate::invocation::{Callable, DeferredInvocation, TaskId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// The frame loop behind the dispatcher is gone, or no loop was made current
    #[error("no active frame loop to schedule on")]
    NoActiveContext,
    #[error("invalid delay: {0} seconds")]
    InvalidDelay(f32),
}

/// State shared between a frame loop and all of its dispatchers
#[derive(Debug, Default)]
pub(crate) struct Shared {
    /// Loop clock in nanoseconds. Only the loop thread advances it.
    clock_nanos: AtomicU64,
    next_id: AtomicU64,
}

impl Shared {
    pub(crate) fn now(&self) -> Duration {
        Duration::from_nanos(self.clock_nanos.load(Ordering::Acquire))
    }

    /// Move the clock forward by `dt` and return the new reading
    pub(crate) fn advance(&self, dt: Duration) -> Duration {
        let now = self.now().saturating_add(dt);
        self.clock_nanos.store(as_nanos(now), Ordering::Release);
        now
    }

    pub(crate) fn issued(&self) -> u64 {
        self.next_id.load(Ordering::Acquire)
    }

    fn next_id(&self) -> TaskId {
        TaskId(self.next_id.fetch_add(1, Ordering::AcqRel))
    }
}

fn as_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Converts a delay in seconds, rejecting negative, non-finite and
/// out-of-range values
pub(crate) fn delay_from_secs(secs: f32) -> Result<Duration, ScheduleError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ScheduleError::InvalidDelay(secs));
    }
    Duration::try_from_secs_f32(secs).map_err(|_| ScheduleError::InvalidDelay(secs))
}

/// Sending half of a [`FrameLoop`](crate::FrameLoop).
///
/// Cheap to clone and safe to use from any thread. Everything scheduled
/// through it runs on the loop's thread.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<DeferredInvocation>,
    shared: Arc<Shared>,
}

impl Dispatcher {
    pub(crate) fn new(tx: mpsc::UnboundedSender<DeferredInvocation>, shared: Arc<Shared>) -> Self {
        Self { tx, shared }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// Run `f` on the next tick. Same as `schedule_after(f, Duration::ZERO)`.
    pub fn schedule<F>(&self, f: F) -> Result<TaskId, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule_after(f, Duration::ZERO)
    }

    /// Run `f` on the first tick at which `delay` has elapsed on the loop clock
    pub fn schedule_after<F>(&self, f: F, delay: Duration) -> Result<TaskId, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Callable::native(f), delay)
    }

    /// Like [`schedule_after`](Self::schedule_after), with the delay in seconds
    pub fn schedule_after_secs<F>(&self, f: F, secs: f32) -> Result<TaskId, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Callable::native(f), delay_from_secs(secs)?)
    }

    /// Run a fallible closure; an `Err` is logged like a panic would be
    pub fn try_schedule<F>(&self, f: F) -> Result<TaskId, ScheduleError>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.try_schedule_after(f, Duration::ZERO)
    }

    pub fn try_schedule_after<F>(&self, f: F, delay: Duration) -> Result<TaskId, ScheduleError>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.submit(Callable::fallible(f), delay)
    }

    pub fn schedule_script(&self, function: ScriptFunction) -> Result<TaskId, ScheduleError> {
        self.schedule_script_after(function, Duration::ZERO)
    }

    pub fn schedule_script_after(
        &self,
        function: ScriptFunction,
        delay: Duration,
    ) -> Result<TaskId, ScheduleError> {
        self.submit(Callable::Script(function), delay)
    }

    /// Load and run a script file on the next tick. Relative paths resolve
    /// against the runtime's script directory.
    pub fn schedule_script_file(&self, path: impl Into<PathBuf>) -> Result<TaskId, ScheduleError> {
        self.submit(Callable::ScriptFile(path.into()), Duration::ZERO)
    }

    /// Queue any [`Callable`] with a delay
    pub fn submit(&self, callable: Callable, delay: Duration) -> Result<TaskId, ScheduleError> {
        if self.tx.is_closed() {
            return Err(ScheduleError::NoActiveContext);
        }

        let id = self.shared.next_id();
        let eligible_at = self.shared.now().saturating_add(delay);
        trace!(
            target: "cinnamon::dispatch",
            "Scheduling {} {:?} at {:?}",
            id,
            callable,
            eligible_at
        );

        self.tx
            .send(DeferredInvocation::new(id, callable, eligible_at))
            .map_err(|_| ScheduleError::NoActiveContext)?;
        Ok(id)
    }

    /// Whether the loop behind this dispatcher still exists
    pub fn is_active(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Current reading of the loop clock
    pub fn now(&self) -> Duration {
        self.shared.now()
    }

    pub(crate) fn same_loop(&self, other: &Dispatcher) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}
