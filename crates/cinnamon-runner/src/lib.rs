//! Main-thread deferred invocation.
//!
//! A [`FrameLoop`] lives on the thread that drives the host's per-frame
//! update. Any thread can hand it work through a [`Dispatcher`]; the work runs
//! exactly once, on the loop's thread, during the first tick at which its
//! delay has elapsed on the loop's clock.
//!
//! ```no_run
//! use std::time::Duration;
//! use cinnamon_runner::FrameLoop;
//!
//! let mut frame_loop = FrameLoop::new();
//! let dispatcher = frame_loop.dispatcher();
//!
//! std::thread::spawn(move || {
//!     dispatcher.schedule(|| println!("on the main thread")).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! frame_loop.tick(Duration::from_millis(16));
//! ```

mod dispatcher;
mod frame_loop;
mod invocation;
pub mod main_thread;

pub use dispatcher::{Dispatcher, ScheduleError};
pub use frame_loop::{FrameLoop, InvocationReport, TickReport};
pub use invocation::{Callable, InvocationState, TaskId};
