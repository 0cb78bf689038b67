#![no_main]
use libfuzzer_sys::fuzz_target;
use pas_validator_core::{RecordKind, RecordReader, SpecTable};

fuzz_target!(|data: (&[u8], &[u8])| {
    let (table_bytes, record_bytes) = data;
    let Ok(table) = SpecTable::from_reader(table_bytes) else {
        return;
    };
    for kind in RecordKind::ALL {
        if let Ok(view) = table.subset(kind) {
            let _ = RecordReader::new().read(record_bytes, &view, "fuzz.tsv");
        }
    }
});
