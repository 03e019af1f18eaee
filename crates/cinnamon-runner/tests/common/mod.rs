#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cinnamon_core::logging::CinnamonFormat;

pub const FRAME: Duration = Duration::from_millis(16);

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` and return what it logged, formatted like the console
pub fn capture<T, F: FnOnce() -> T>(f: F) -> (T, String) {
    let output = Captured::default();
    let writer = output.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .event_format(CinnamonFormat::default())
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);

    let bytes = output.0.lock().unwrap().clone();
    (value, String::from_utf8(bytes).unwrap())
}
