mod common;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use cinnamon_core::GuardOutcome;
use cinnamon_runner::{main_thread, FrameLoop, InvocationState, ScheduleError, TaskId};
use common::{capture, FRAME};

/// Shared log of which callables ran, in order
#[derive(Clone, Default)]
struct Trace(Arc<Mutex<Vec<&'static str>>>);

impl Trace {
    fn push(&self, name: &'static str) -> impl FnOnce() + Send + 'static {
        let inner = self.0.clone();
        move || inner.lock().unwrap().push(name)
    }

    fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[test]
fn test_delayed_callable_runs_once_after_delay() {
    let mut frame_loop = FrameLoop::new();
    let trace = Trace::default();
    frame_loop
        .dispatcher()
        .schedule_after(trace.push("delayed"), Duration::from_millis(100))
        .unwrap();

    // Eligible at 100ms: frames end at 16, 32, ... 96, 112
    for _ in 0..6 {
        frame_loop.tick(FRAME);
        assert!(trace.take().is_empty());
    }
    let report = frame_loop.tick(FRAME);
    assert_eq!(report.frame, 7);
    assert_eq!(trace.take(), vec!["delayed"]);

    for _ in 0..10 {
        frame_loop.tick(FRAME);
    }
    assert!(trace.take().is_empty());
}

#[test]
fn test_schedule_matches_zero_delay() {
    let mut frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();
    let trace = Trace::default();

    dispatcher.schedule(trace.push("schedule")).unwrap();
    dispatcher
        .schedule_after(trace.push("after_zero"), Duration::ZERO)
        .unwrap();
    dispatcher
        .schedule_after_secs(trace.push("after_secs_zero"), 0.0)
        .unwrap();

    frame_loop.tick(FRAME);
    assert_eq!(trace.take(), vec!["schedule", "after_zero", "after_secs_zero"]);
}

#[test]
fn test_zero_long_zero_ordering() {
    let mut frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();
    let trace = Trace::default();

    let a = dispatcher.schedule(trace.push("a")).unwrap();
    let b = dispatcher
        .schedule_after(trace.push("b"), Duration::from_secs(5))
        .unwrap();
    let c = dispatcher.schedule(trace.push("c")).unwrap();

    let report = frame_loop.tick(Duration::from_secs(1));
    assert_eq!(report.ran().collect::<Vec<TaskId>>(), vec![a, c]);
    assert_eq!(trace.take(), vec!["a", "c"]);

    for _ in 0..3 {
        assert_eq!(frame_loop.tick(Duration::from_secs(1)).invoked.len(), 0);
    }

    let report = frame_loop.tick(Duration::from_secs(1));
    assert_eq!(report.now, Duration::from_secs(5));
    assert_eq!(report.ran().collect::<Vec<TaskId>>(), vec![b]);
    assert_eq!(trace.take(), vec!["b"]);
}

#[test]
fn test_earlier_eligibility_runs_first() {
    let mut frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();
    let trace = Trace::default();

    dispatcher
        .schedule_after(trace.push("two_seconds"), Duration::from_secs(2))
        .unwrap();
    dispatcher
        .schedule_after(trace.push("one_second"), Duration::from_secs(1))
        .unwrap();

    frame_loop.tick(Duration::from_secs(3));
    assert_eq!(trace.take(), vec!["one_second", "two_seconds"]);
}

#[test]
fn test_delay_counts_from_submission() {
    let mut frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();
    let trace = Trace::default();

    frame_loop.tick(Duration::from_secs(10));
    dispatcher
        .schedule_after(trace.push("late"), Duration::from_secs(1))
        .unwrap();

    frame_loop.tick(Duration::from_millis(500));
    assert!(trace.take().is_empty());
    frame_loop.tick(Duration::from_millis(500));
    assert_eq!(trace.take(), vec!["late"]);
}

#[test]
fn test_work_scheduled_during_tick_runs_next_tick() {
    let mut frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();
    let trace = Trace::default();

    let inner_dispatcher = dispatcher.clone();
    let inner = trace.push("inner");
    let outer = trace.push("outer");
    dispatcher
        .schedule(move || {
            outer();
            inner_dispatcher.schedule(inner).unwrap();
        })
        .unwrap();

    frame_loop.tick(FRAME);
    assert_eq!(trace.take(), vec!["outer"]);
    frame_loop.tick(FRAME);
    assert_eq!(trace.take(), vec!["inner"]);
}

#[test]
fn test_callables_run_on_loop_thread() {
    let mut frame_loop = FrameLoop::new();
    let main_id = thread::current().id();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = frame_loop.dispatcher();
            let seen = seen.clone();
            thread::spawn(move || {
                let submitter = thread::current().id();
                dispatcher
                    .schedule(move || seen.lock().unwrap().push((submitter, thread::current().id())))
                    .unwrap();
                submitter
            })
        })
        .collect();
    let submitters: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    frame_loop.tick(FRAME);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    for (submitter, runner) in seen.iter() {
        assert!(submitters.contains(submitter));
        assert_ne!(submitter, runner);
        assert_eq!(*runner, main_id);
    }
}

#[test]
fn test_failures_are_logged_and_do_not_stop_the_tick() {
    let mut frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();
    let trace = Trace::default();

    dispatcher.schedule(|| panic!("boom")).unwrap();
    dispatcher
        .try_schedule(|| Err(anyhow!("bad state")))
        .unwrap();
    dispatcher.schedule(trace.push("survivor")).unwrap();

    let (report, output) = capture(|| frame_loop.tick(FRAME));

    assert_eq!(report.invoked.len(), 3);
    assert_eq!(report.failed_count(), 2);
    assert_eq!(report.invoked[0].outcome, GuardOutcome::Failed("boom".to_string()));
    assert_eq!(trace.take(), vec!["survivor"]);

    assert!(output.contains("CINNAMON: ERROR >> Exception: boom"), "output was: {output}");
    assert!(output.contains("CINNAMON: ERROR >> Exception: bad state"), "output was: {output}");
}

#[test]
fn test_invalid_delays_are_rejected() {
    let mut frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();

    assert_eq!(
        dispatcher.schedule_after_secs(|| {}, -0.5),
        Err(ScheduleError::InvalidDelay(-0.5))
    );
    assert!(matches!(
        dispatcher.schedule_after_secs(|| {}, f32::NAN),
        Err(ScheduleError::InvalidDelay(_))
    ));
    // Finite, but too large for a Duration
    assert_eq!(
        dispatcher.schedule_after_secs(|| {}, 1.0e30),
        Err(ScheduleError::InvalidDelay(1.0e30))
    );
    assert_eq!(frame_loop.pending_count(), 0);
}

#[test]
fn test_dispatcher_outliving_loop() {
    let frame_loop = FrameLoop::new();
    let dispatcher = frame_loop.dispatcher();
    frame_loop.shutdown();

    assert_eq!(
        dispatcher.schedule(|| {}),
        Err(ScheduleError::NoActiveContext)
    );
}

#[test]
fn test_callable_sees_itself_invoked() {
    let mut frame_loop = FrameLoop::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let ids: Vec<TaskId> = (0..2)
        .map(|_| {
            let seen = seen.clone();
            frame_loop
                .dispatcher()
                .schedule(move || seen.lock().unwrap().push(main_thread::current_task()))
                .unwrap()
        })
        .collect();
    for &id in &ids {
        assert_eq!(frame_loop.state_of(id), Some(InvocationState::Pending));
    }
    assert_eq!(main_thread::current_task(), None);

    frame_loop.tick(FRAME);

    assert_eq!(*seen.lock().unwrap(), vec![Some(ids[0]), Some(ids[1])]);
    assert_eq!(main_thread::current_task(), None);
    for &id in &ids {
        assert_eq!(frame_loop.state_of(id), Some(InvocationState::Discarded));
    }
}
