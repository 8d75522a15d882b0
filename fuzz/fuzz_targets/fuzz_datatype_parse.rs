#![no_main]

use arbitrary::Arbitrary;
use fform_core::{Datatype, Datatypes, ValueType};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    target: u8,
    text: String,
}

fuzz_target!(|input: Input| {
    let ty = ValueType::ALL[usize::from(input.target) % ValueType::ALL.len()];
    let datatype = Datatypes::standard().get(ty);
    if let Ok(value) = datatype.parse(&input.text) {
        assert!(value.conforms_to(ty));
        // Canonical text must parse back to the same value.
        if ty != ValueType::Decimal {
            let again = datatype.parse(&datatype.format(&value));
            assert_eq!(again, Ok(value));
        }
    }
});
