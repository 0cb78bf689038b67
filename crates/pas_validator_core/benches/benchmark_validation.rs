use criterion::{criterion_group, criterion_main, Criterion};
use pas_validator_core::{
    FieldEncoding, FieldSpec, PasRecord, PasValue, RecordKind, RecordValidator, SpecView,
};

const FRACTIONS: &str = "~ DATA TABLE - CONDENSATE / LIQUID FRACTION DISTILLATION";
const RECOMBINED: &str = "~ RECOMBINED GAS ANALYSIS - DATA PROPERTIES";

fn field(mnemonic: &str, section: Option<&str>, descriptor: &str, rule: &str) -> FieldSpec {
    let encoding = FieldEncoding::parse(descriptor).expect("descriptor");
    FieldSpec::new(mnemonic, section, encoding, rule, "GAN")
}

fn gas_view() -> SpecView {
    SpecView::new(
        RecordKind::Gas,
        vec![
            field("STYP.", None, "CHAR 1", "mandatory"),
            field("H2SLC.", None, "CHAR 1", "mandatory"),
            field("H2SMT.", None, "CHAR 1", "mandatory, if h2slc is f or b"),
            field("FLDH2S.PPM", None, "NUMB 8,1", "mandatory, if h2slc is f or b"),
            field("HYDLP.", None, "CHAR 1", "mandatory"),
            field("TTOPL.M", None, "NUMB 7,2", "mandatory. must be > 0"),
            field("TBASL.M", None, "NUMB 7,2", "mandatory. must be > 0"),
            field("FS-SDAT.DAY", None, "YYYY MM DD", "mandatory"),
            field("FS-SPRES.KPAA", None, "NUMB 8,2", "optional"),
            field("MOLL.FRAC", Some(FRACTIONS), "NUMB 6,4", "optional"),
            field("RELMM.", Some(FRACTIONS), "NUMB 6,2", "optional"),
            field("SEPCOND.", Some(RECOMBINED), "CHAR 1", "mandatory, if styp = r"),
            field("SS-GAS.E3M3/D", Some(RECOMBINED), "NUMB 8,2", "optional"),
        ],
    )
}

fn generate_records(count: u64) -> Vec<PasRecord> {
    (0..count)
        .map(|index| {
            // Every seventh record carries a zero second-stage rate.
            let rate = if index % 7 == 0 { 0.0 } else { 5.0 + index as f64 };
            PasRecord::from_pairs(
                index + 2,
                [
                    ("STYP.", PasValue::text("R")),
                    ("H2SLC.", PasValue::text("F")),
                    ("H2SMT.", PasValue::text("T")),
                    ("FLDH2S.PPM", PasValue::number(120.0)),
                    ("HYDLP.", PasValue::text("Y")),
                    ("TTOPL.M", PasValue::number(1500.5)),
                    ("TBASL.M", PasValue::number(1520.25)),
                    ("FS-SDAT.DAY", PasValue::text("2019 05 14")),
                    ("FS-SPRES.KPAA", PasValue::number(3500.0)),
                    ("MOLL.FRAC", PasValue::number(0.4)),
                    ("RELMM.", PasValue::number(120.0)),
                    ("SEPCOND.", PasValue::text("B")),
                    ("SS-GAS.E3M3/D", PasValue::number(rate)),
                ],
            )
        })
        .collect()
}

fn benchmark_validation(c: &mut Criterion) {
    let view = gas_view();
    let records = generate_records(10_000);
    let validator = RecordValidator::new(&view);

    c.bench_function("gas_records_10000", |b| {
        b.iter(|| validator.validate_all(&records))
    });
}

criterion_group!(benches, benchmark_validation);
criterion_main!(benches);
