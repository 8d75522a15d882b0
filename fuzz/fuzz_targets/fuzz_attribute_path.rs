#![no_main]

use fform_core::AttributePath;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(path) = AttributePath::parse(data) {
        assert!(!path.is_empty());
        assert!(path.segments().iter().all(|segment| !segment.is_empty()));
        let reparsed = AttributePath::parse(&path.to_string());
        assert_eq!(reparsed.as_ref(), Ok(&path));
    }
});
