#![forbid(unsafe_code)]
#![cfg(feature = "serde")]

//! Wire names of the configuration-facing enums.

use fform_core::{Resolution, ValueType};

#[test]
fn resolution_uses_lowercase_names() {
    assert_eq!(serde_json::to_string(&Resolution::Minute).unwrap(), "\"minute\"");
    let parsed: Vec<Resolution> = serde_json::from_str(r#"["second", "day", "year"]"#).unwrap();
    assert_eq!(
        parsed,
        vec![Resolution::Second, Resolution::Day, Resolution::Year]
    );
    assert!(serde_json::from_str::<Resolution>("\"week\"").is_err());
}

#[test]
fn value_type_uses_snake_case_names() {
    assert_eq!(serde_json::to_string(&ValueType::DateTime).unwrap(), "\"date_time\"");
    for ty in ValueType::ALL {
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(serde_json::from_str::<ValueType>(&json).unwrap(), ty);
    }
}
