use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::{LogLevel, TAG};

/// Formats events as `<TAG>: <LEVEL> >> <message>`.
///
/// Events emitted through the sink carry a `severity` field holding the
/// original level name. Other events fall back to their tracing level, and any
/// extra fields are appended as `key=value` pairs.
#[derive(Debug, Clone)]
pub struct CinnamonFormat {
    tag: String,
}

impl CinnamonFormat {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Default for CinnamonFormat {
    fn default() -> Self {
        Self::new(TAG)
    }
}

impl<S, N> FormatEvent<S, N> for CinnamonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = LineFields::default();
        event.record(&mut fields);

        let severity = fields
            .severity
            .unwrap_or_else(|| LogLevel::from_tracing(event.metadata().level()).to_string());

        write!(writer, "{}: {} >> {}", self.tag, severity, fields.message)?;
        for (name, value) in &fields.extra {
            write!(writer, " {}={}", name, value)?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct LineFields {
    message: String,
    severity: Option<String>,
    extra: Vec<(&'static str, String)>,
}

impl LineFields {
    fn put(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            "severity" => self.severity = Some(value),
            name => self.extra.push((name, value)),
        }
    }
}

impl Visit for LineFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}
