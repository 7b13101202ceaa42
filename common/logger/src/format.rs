use chrono::Local;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// The name of the event field carrying the level name of a log line.
pub const LEVEL_FIELD: &str = "level_name";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Formats an event as `LEVEL [timestamp] message`.
///
/// The level is read from the `level_name` field when present, so that levels without a
/// `tracing` counterpart (CRITICAL) keep their own name; otherwise the `tracing` level is used.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {}

impl LineFormatter {
    pub fn new() -> LineFormatter {
        Default::default()
    }

    pub fn format_line(&self, level: &str, message: &str) -> String {
        format!("{} [{}] {}", level, Local::now().format(TIMESTAMP_FORMAT), message)
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
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
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let level =
            visitor.level_name.take().unwrap_or_else(|| event.metadata().level().to_string());
        writeln!(writer, "{}", self.format_line(&level, &visitor.message))
    }
}

#[derive(Default)]
struct LineVisitor {
    level_name: Option<String>,
    message: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            LEVEL_FIELD => self.level_name = Some(value.to_owned()),
            "message" => self.message.push_str(value),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture<F: FnOnce()>(f: F) -> String {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt()
            .event_format(LineFormatter::new())
            .with_writer(buffer.clone())
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn should_format_level_timestamp_and_message() {
        let output = capture(|| tracing::info!("hello {}", "world"));

        assert!(output.starts_with("INFO ["), "{}", output);
        assert!(output.ends_with("] hello world\n"), "{}", output);
        assert_eq!(1, output.lines().count());
    }

    #[test]
    fn should_prefer_the_level_name_field() {
        let output = capture(|| tracing::error!(level_name = "CRITICAL", "disk on fire"));

        assert!(output.starts_with("CRITICAL ["), "{}", output);
        assert!(output.ends_with("] disk on fire\n"), "{}", output);
    }

    #[test]
    fn should_ignore_other_fields() {
        let output = capture(|| tracing::warn!(answer = 42, "only the message"));

        assert!(output.starts_with("WARN ["), "{}", output);
        assert!(output.ends_with("] only the message\n"), "{}", output);
    }

    #[test]
    fn timestamp_should_have_millisecond_precision() {
        let line = LineFormatter::new().format_line("INFO", "message");

        let timestamp = &line["INFO [".len()..line.find(']').unwrap()];
        assert_eq!("2024-01-01 00:00:00,000".len(), timestamp.len());
        assert_eq!(Some(','), timestamp.chars().nth(19));
        assert!(line.ends_with("] message"));
    }
}
