use pas_validator_core::{
    validate_files, NoticeSeverity, RecordKind, SpecTable, ValidationOptions, ValidationOutcome,
};
use std::path::{Path, PathBuf};

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // root
        .unwrap()
        .to_path_buf()
}

fn test_data_root() -> PathBuf {
    project_root().join("test-pas-data")
}

fn run(data_file: &str, kind: &str) -> ValidationOutcome {
    let root = test_data_root();
    let data_path = root.join(data_file);
    assert!(data_path.exists(), "fixture not found at {:?}", data_path);
    validate_files(
        &root.join("pas_lookup.csv"),
        &data_path,
        kind,
        &ValidationOptions::default(),
    )
}

fn assert_all_pass(outcome: &ValidationOutcome) {
    let errors: Vec<_> = outcome
        .notices
        .iter()
        .filter(|n| n.severity == NoticeSeverity::Error)
        .collect();
    assert!(errors.is_empty(), "expected no errors, found: {:#?}", errors);
    assert_eq!(outcome.failed_count(), 0);
}

/// (row, notice code, field) per failing row of an invalid fixture.
fn assert_failures(outcome: &ValidationOutcome, expected: &[(u64, &str, &str)]) {
    let found: Vec<(u64, String, String)> = outcome
        .notices
        .iter()
        .map(|n| {
            (
                n.row.unwrap_or_default(),
                n.code.clone(),
                n.field.clone().unwrap_or_default(),
            )
        })
        .collect();
    let expected: Vec<(u64, String, String)> = expected
        .iter()
        .map(|(row, code, field)| (*row, code.to_string(), field.to_string()))
        .collect();
    assert_eq!(found, expected, "notices: {:#?}", outcome.notices);
    assert_eq!(outcome.passed_count(), 0);
}

#[test]
fn lookup_table_covers_every_kind() {
    let table = SpecTable::from_path(test_data_root().join("pas_lookup.csv"))
        .expect("Failed to load lookup table");
    for kind in RecordKind::ALL {
        let view = table.subset(kind).expect("kind present in lookup table");
        assert!(!view.is_empty());
        assert!(view.field("PASTYPE.").is_some());
    }
    let gas = table.subset(RecordKind::Gas).unwrap();
    assert_eq!(
        gas.field("LIQRAT.M3/D").and_then(|f| f.section.as_deref()),
        Some("~ RECOMBINED GAS ANALYSIS - DATA PROPERTIES")
    );
}

#[test]
fn test_oil_valid() {
    let outcome = run("oan_valid.tsv", "OAN");
    assert_eq!(outcome.kind, Some(RecordKind::Oil));
    assert_eq!(outcome.records.len(), 2);
    assert_all_pass(&outcome);
}

#[test]
fn test_water_valid() {
    let outcome = run("wan_valid.tsv", "WAN");
    assert_eq!(outcome.kind, Some(RecordKind::Water));
    assert_eq!(outcome.records.len(), 1);
    assert_all_pass(&outcome);
}

#[test]
fn test_gas_valid() {
    let outcome = run("gan_valid.tsv", "GAN");
    assert_eq!(outcome.kind, Some(RecordKind::Gas));
    assert_eq!(outcome.records.len(), 2);
    assert_all_pass(&outcome);
}

#[test]
fn test_oil_errors() {
    let outcome = run("oan_invalid.tsv", "OAN");
    assert_failures(
        &outcome,
        &[
            (2, "ordered_pair_violated", "TTOPL.M"),
            (3, "forbidden_field_present", "DSTLOC."),
            (4, "value_out_of_range", "TROOM.DEGC"),
            (5, "required_pair_both_absent", "TSUL.FRAC"),
            (6, "value_not_a_legal_code", "SPNT."),
            (7, "zero_not_allowed", "ADNCL.KG/M3"),
        ],
    );
}

#[test]
fn test_gas_errors() {
    let outcome = run("gan_invalid.tsv", "GAN");
    assert_failures(
        &outcome,
        &[
            (2, "required_field_absent", "SS-GAS.E3M3/D"),
            (3, "forbidden_field_present", "MOLC.FRAC"),
            (4, "exact_value_mismatch", "FLDH2S.PPM"),
            (5, "required_field_absent", "FS-SPRES.KPAA"),
            (6, "value_out_of_range", "RDLIQ."),
        ],
    );
}

#[test]
fn later_cutoff_relaxes_pressure_requirement() {
    let root = test_data_root();
    let options = ValidationOptions {
        sample_date_cutoff: chrono::NaiveDate::from_ymd_opt(2020, 1, 1),
        ..ValidationOptions::default()
    };
    let outcome = validate_files(
        &root.join("pas_lookup.csv"),
        &root.join("gan_invalid.tsv"),
        "GAN",
        &options,
    );
    assert!(outcome.records[3].passed(), "{:#?}", outcome.records[3]);
    assert_eq!(outcome.failed_count(), 4);
}

#[test]
fn kind_without_rules_is_rejected() {
    let outcome = run("oan_valid.tsv", "DST");
    assert!(outcome.kind.is_none());
    assert!(outcome.records.is_empty());
    assert!(outcome.notices.has_errors());
    assert_eq!(
        outcome.notices.iter().next().map(|n| n.code.as_str()),
        Some("unknown_record_kind")
    );
}

#[test]
fn wrong_kind_for_file_reports_missing_fields() {
    let outcome = run("wan_valid.tsv", "OAN");
    assert_eq!(outcome.kind, Some(RecordKind::Oil));
    assert_eq!(outcome.failed_count(), 1);
    let notice = outcome.notices.iter().next().unwrap();
    assert_eq!(notice.code, "required_field_absent");
}
