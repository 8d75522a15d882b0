#![no_main]

use arbitrary::Arbitrary;
use fform_core::Control;
use fform_widgets::DateField;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    pattern: String,
    date_text: String,
    time_text: String,
}

fuzz_target!(|input: Input| {
    let mut field = DateField::new();
    let _ = field.set_date_format(&input.pattern);
    let _ = field.enter_date_text(&input.date_text);
    let _ = field.enter_time_text(&input.time_text);
    let _ = field.display_text();
    let value = field.value();
    if field.date().is_none() {
        assert!(value.is_null());
    }
});
