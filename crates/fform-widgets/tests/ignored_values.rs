#![forbid(unsafe_code)]
#![cfg(feature = "tracing")]

//! Controls log values they cannot hold instead of storing them.

use std::io;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};
use fform_core::{Control, Value};
use fform_widgets::{DateField, TimeField};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("capture lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture(f: impl FnOnce()) -> String {
    let sink = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(sink.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    sink.text()
}

#[test]
fn date_field_warns_and_keeps_value() {
    let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let mut field = DateField::new();
    field.set_value(Value::Date(day));

    let logs = capture(|| field.set_value(Value::Int(42)));

    assert!(logs.contains("date field ignored non-date value"), "{logs}");
    assert!(logs.contains("42"), "{logs}");
    assert_eq!(field.date(), Some(day));
}

#[test]
fn time_field_warns_and_keeps_value() {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let mut field = TimeField::new();
    field.set_value(Value::Time(noon));

    let logs = capture(|| field.set_value(Value::Bool(true)));

    assert!(logs.contains("time field ignored non-time value"), "{logs}");
    assert_eq!(field.time(), Some(noon));
}

#[test]
fn accepted_values_log_nothing() {
    let mut field = TimeField::new();
    let logs = capture(|| field.set_value(Value::Null));
    assert!(logs.is_empty(), "{logs}");
}
