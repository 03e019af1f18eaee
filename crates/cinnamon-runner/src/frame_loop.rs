use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use cinnamon_core::GuardOutcome;
use cinnamon_scripting_host::ScriptRuntime;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dispatcher::{Dispatcher, Shared};
use crate::invocation::{DeferredInvocation, InvocationState, TaskId};
use crate::main_thread;

/// Result of running one invocation during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReport {
    pub id: TaskId,
    pub outcome: GuardOutcome,
}

/// What a single [`FrameLoop::tick`] did
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// 1-based frame counter
    pub frame: u64,
    /// Loop clock after this tick's advance
    pub now: Duration,
    /// Invocations run this tick, in the order they ran
    pub invoked: Vec<InvocationReport>,
}

impl TickReport {
    pub fn ran(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.invoked.iter().map(|report| report.id)
    }

    pub fn failed_count(&self) -> usize {
        self.invoked
            .iter()
            .filter(|report| !report.outcome.is_completed())
            .count()
    }
}

/// The per-frame drain point for deferred work.
///
/// Not `Send`: the thread that creates a loop is the one that ticks it, so
/// every callable runs on that thread.
pub struct FrameLoop {
    rx: mpsc::UnboundedReceiver<DeferredInvocation>,
    dispatcher: Dispatcher,
    /// Ordered by eligibility, then submission
    pending: BTreeMap<(Duration, TaskId), DeferredInvocation>,
    scripts: Option<ScriptRuntime>,
    frame: u64,
    _main_thread: PhantomData<*const ()>,
}

impl FrameLoop {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(tx, Arc::new(Shared::default()));
        Self {
            rx,
            dispatcher,
            pending: BTreeMap::new(),
            scripts: None,
            frame: 0,
            _main_thread: PhantomData,
        }
    }

    /// A loop that can run script callables with `runtime`
    pub fn with_scripts(runtime: ScriptRuntime) -> Self {
        let mut frame_loop = Self::new();
        frame_loop.scripts = Some(runtime);
        frame_loop
    }

    /// Attach a script runtime, returning the previous one
    pub fn attach_scripts(&mut self, runtime: ScriptRuntime) -> Option<ScriptRuntime> {
        self.scripts.replace(runtime)
    }

    pub fn scripts(&mut self) -> Option<&mut ScriptRuntime> {
        self.scripts.as_mut()
    }

    /// A handle other threads can schedule work through
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Make this loop the process-wide target of the
    /// [`main_thread`](crate::main_thread) functions
    pub fn make_current(&self) {
        main_thread::set_active(self.dispatcher.clone());
    }

    pub fn now(&self) -> Duration {
        self.dispatcher.now()
    }

    /// Number of ticks run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Invocations submitted and not yet run
    pub fn pending_count(&mut self) -> usize {
        self.collect_submissions();
        self.pending.len()
    }

    /// Where `id` is in its lifecycle, or `None` if no dispatcher of this loop
    /// issued it.
    ///
    /// An id issued on another thread whose submission has not reached the
    /// loop yet reads as `Discarded`.
    pub fn state_of(&mut self, id: TaskId) -> Option<InvocationState> {
        self.collect_submissions();
        if self.pending.values().any(|invocation| invocation.id() == id) {
            Some(InvocationState::Pending)
        } else if id.0 < self.dispatcher.shared().issued() {
            Some(InvocationState::Discarded)
        } else {
            None
        }
    }

    /// Advance the loop clock by `dt` and run everything that has become
    /// eligible.
    ///
    /// Only submissions that arrived before the tick started are considered;
    /// anything scheduled by a callable during the tick waits for the next
    /// one. Eligible invocations run in order of eligibility, ties broken by
    /// submission order. A failing callable is logged and does not stop the
    /// rest.
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        self.frame += 1;
        let now = self.dispatcher.shared().advance(dt);
        self.collect_submissions();

        let mut report = TickReport {
            frame: self.frame,
            now,
            invoked: Vec::new(),
        };

        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let invocation = entry.remove();
            let id = invocation.id();
            debug!(target: "cinnamon::dispatch", "Invoking {} on frame {}", id, self.frame);

            let outcome = invocation.invoke(self.scripts.as_mut());
            report.invoked.push(InvocationReport { id, outcome });
        }

        report
    }

    /// Tear down the loop and its script runtime. Pending work is dropped.
    pub fn shutdown(mut self) {
        if let Some(runtime) = self.scripts.take() {
            runtime.shutdown();
        }
    }

    fn collect_submissions(&mut self) {
        while let Ok(invocation) = self.rx.try_recv() {
            self.pending
                .insert((invocation.eligible_at(), invocation.id()), invocation);
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        main_thread::clear_active(&self.dispatcher);
        self.rx.close();
        self.collect_submissions();
        if !self.pending.is_empty() {
            warn!(
                target: "cinnamon::dispatch",
                "Dropping {} pending invocation(s) with the frame loop",
                self.pending.len()
            );
        }
    }
}
