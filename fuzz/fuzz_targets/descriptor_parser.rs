#![no_main]
use libfuzzer_sys::fuzz_target;
use pas_model::{FieldEncoding, PasDate};

fuzz_target!(|data: &str| {
    if let Ok(encoding) = FieldEncoding::parse(data) {
        // Display output must parse back to the same encoding.
        let rendered = encoding.to_string();
        assert_eq!(FieldEncoding::parse(&rendered).ok(), Some(encoding));
    }
    let _ = PasDate::parse(data);
});
