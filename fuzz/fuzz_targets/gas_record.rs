#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pas_validator_core::dispatch::{CL_FRACTIONS, CL_HEADER, FS_HEADER, RECOMBINED_PROPERTIES, SS_GAS};
use pas_validator_core::{validate_record, FieldEncoding, FieldSpec, PasRecord, PasValue, RecordKind, SpecView};

const FIELDS: &[(&str, Option<&str>, &str, &str)] = &[
    ("STYP.", None, "CHAR 1", "mandatory"),
    ("H2SLC.", None, "CHAR 1", "mandatory"),
    ("H2SMT.", None, "CHAR 1", "mandatory, if h2slc is f or b"),
    ("FLDH2S.PPM", None, "NUMB 8,1", "mandatory, if h2slc is f or b"),
    ("LABH2S.FRAC", None, "NUMB 6,4", "mandatory, if h2slc is l or b. can be zero"),
    ("HYDLP.", None, "CHAR 1", "mandatory"),
    ("DSTLOC.", None, "CHAR 1", "mandatory, if fs-spnt = 50"),
    ("TTOPL.M", None, "NUMB 7,2", "mandatory. must be > 0"),
    ("TBASL.M", None, "NUMB 7,2", "mandatory. must be > 0"),
    ("FS-SPNT.", Some(FS_HEADER), "NUMB 2", "mandatory"),
    ("FS-SDAT.DAY", Some(FS_HEADER), "YYYY MM DD", "mandatory"),
    ("FS-SPRES.KPAA", Some(FS_HEADER), "NUMB 8,2", "optional"),
    ("SS-RELDEN.", Some(SS_GAS), "NUMB 5,3", "optional"),
    ("CL-SPNT.", Some(CL_HEADER), "NUMB 2", "mandatory"),
    ("RELMM.", Some(CL_FRACTIONS), "NUMB 6,2", "optional"),
    ("SEPCOND.", Some(RECOMBINED_PROPERTIES), "CHAR 1", "mandatory, if styp = r"),
];

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Absent,
    Text(String),
    Number(f64),
}

fuzz_target!(|values: Vec<FuzzValue>| {
    let fields = FIELDS
        .iter()
        .filter_map(|(mnemonic, section, descriptor, rule)| {
            let encoding = FieldEncoding::parse(descriptor).ok()?;
            Some(FieldSpec::new(mnemonic, *section, encoding, rule, "GAN"))
        })
        .collect();
    let view = SpecView::new(RecordKind::Gas, fields);

    let mut record = PasRecord::new(2);
    for ((mnemonic, ..), value) in FIELDS.iter().zip(values) {
        match value {
            FuzzValue::Absent => {}
            FuzzValue::Text(text) => record.insert(*mnemonic, PasValue::text(text)),
            FuzzValue::Number(number) => record.insert(*mnemonic, PasValue::number(number)),
        }
    }
    let _ = validate_record(&view, &record);
});
