use std::cell::Cell;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use cinnamon_core::{run_with_exception_handler, GuardOutcome};
use cinnamon_scripting_host::{ScriptFunction, ScriptRuntime};

/// Identifies a scheduled invocation. Ids increase in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Lifecycle of a deferred invocation.
///
/// `Invoked` only holds while the callable is running, so the loop itself
/// never reports it; code running inside the callable sees its own id through
/// [`current_task`](crate::main_thread::current_task). Once the callable
/// returns the invocation is released and reads as `Discarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Pending,
    Invoked,
    Discarded,
}

thread_local! {
    static RUNNING: Cell<Option<TaskId>> = const { Cell::new(None) };
}

/// Id of the invocation running on this thread, if any
pub(crate) fn running() -> Option<TaskId> {
    RUNNING.with(Cell::get)
}

/// A zero-argument unit of work
pub enum Callable {
    Native(Box<dyn FnOnce() -> anyhow::Result<()> + Send>),
    /// A function exported by a module loaded into the script runtime
    Script(ScriptFunction),
    /// Load and run the script file at this path
    ScriptFile(PathBuf),
}

impl Callable {
    pub fn native<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Callable::Native(Box::new(move || {
            f();
            Ok(())
        }))
    }

    pub fn fallible<F>(f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Callable::Native(Box::new(f))
    }

    fn call(self, scripts: Option<&mut ScriptRuntime>) -> anyhow::Result<()> {
        match self {
            Callable::Native(f) => f(),
            Callable::Script(function) => {
                let runtime =
                    scripts.ok_or_else(|| anyhow!("no script runtime to call {}", function))?;
                runtime.call(&function)?;
                Ok(())
            }
            Callable::ScriptFile(path) => {
                let runtime = scripts
                    .ok_or_else(|| anyhow!("no script runtime to run {}", path.display()))?;
                runtime.run_file(&path)?;
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => f.write_str("Native(..)"),
            Callable::Script(function) => write!(f, "Script({})", function),
            Callable::ScriptFile(path) => write!(f, "ScriptFile({})", path.display()),
        }
    }
}

/// A callable waiting for the frame loop
#[derive(Debug)]
pub(crate) struct DeferredInvocation {
    id: TaskId,
    callable: Callable,
    /// Loop clock reading at which the callable becomes eligible to run
    eligible_at: Duration,
}

impl DeferredInvocation {
    pub(crate) fn new(id: TaskId, callable: Callable, eligible_at: Duration) -> Self {
        Self {
            id,
            callable,
            eligible_at,
        }
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn eligible_at(&self) -> Duration {
        self.eligible_at
    }

    /// Run the callable behind the error boundary. Consumes the invocation.
    pub(crate) fn invoke(self, scripts: Option<&mut ScriptRuntime>) -> GuardOutcome {
        let previous = RUNNING.with(|running| running.replace(Some(self.id)));
        let callable = self.callable;
        let outcome = run_with_exception_handler(move || callable.call(scripts));
        RUNNING.with(|running| running.set(previous));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_native_callable_runs() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let invocation = DeferredInvocation::new(
            TaskId(0),
            Callable::native(move || flag.store(true, Ordering::SeqCst)),
            Duration::ZERO,
        );

        assert_eq!(invocation.invoke(None), GuardOutcome::Completed);
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_running_id_is_set_only_during_invoke() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let slot = seen.clone();
        let invocation = DeferredInvocation::new(
            TaskId(3),
            Callable::native(move || *slot.lock().unwrap() = running()),
            Duration::ZERO,
        );

        assert_eq!(running(), None);
        invocation.invoke(None);
        assert_eq!(*seen.lock().unwrap(), Some(TaskId(3)));
        assert_eq!(running(), None);
    }

    #[test]
    fn test_running_id_is_cleared_after_panic() {
        let invocation = DeferredInvocation::new(
            TaskId(4),
            Callable::native(|| panic!("boom")),
            Duration::ZERO,
        );

        assert!(!invocation.invoke(None).is_completed());
        assert_eq!(running(), None);
    }

    #[test]
    fn test_script_file_without_runtime_fails() {
        let invocation = DeferredInvocation::new(
            TaskId(1),
            Callable::ScriptFile(PathBuf::from("boot.wasm")),
            Duration::ZERO,
        );

        match invocation.invoke(None) {
            GuardOutcome::Failed(message) => {
                assert!(message.contains("no script runtime"), "{message}")
            }
            GuardOutcome::Completed => panic!("expected failure"),
        }
    }

    #[test]
    fn test_task_ids_order_by_submission() {
        assert!(TaskId(1) < TaskId(2));
        assert_eq!(TaskId(7).to_string(), "task#7");
    }
}
