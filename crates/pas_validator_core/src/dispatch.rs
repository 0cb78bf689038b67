use pas_model::RecordKind;
use tracing::debug;

use crate::catalog::Bounds;
use crate::field_check::Measure;
use crate::gating::{Condition, FieldRule, Plan, Policy, SectionRule};
use crate::record::PasRecord;
use crate::spec_table::SpecView;
use crate::violation::Violation;

pub const FS_HEADER: &str = "~ HEADER DATA - FIRST STAGE SEPARATOR GAS ANALYSIS";
pub const FS_DATA: &str = "~ DATA TABLE - FIRST STAGE SEPARATOR GAS ANALYSIS";
pub const SS_HEADER: &str = "~ HEADER DATA - SECOND STAGE SEPARATOR - GAS ANALYSIS";
pub const SS_GAS: &str = "~ SECOND STAGE SEPARATOR - GAS ANALYSIS";
pub const CL_HEADER: &str = "~ HEADER DATA - CONDENSATE / LIQUID ANALYSIS";
pub const CL_DATA: &str = "~ DATA TABLE - CONDENSATE / LIQUID ANALYSIS";
pub const CL_PROPERTIES: &str = "~ CONDENSATE / LIQUID ANALYSIS - DATA PROPERTIES";
pub const CL_FRACTIONS: &str = "~ DATA TABLE - CONDENSATE / LIQUID FRACTION DISTILLATION";
pub const RECOMBINED_PROPERTIES: &str = "~ RECOMBINED GAS ANALYSIS - DATA PROPERTIES";
pub const RECOMBINED_COMPOSITION: &str = "~ RECOMBINED GAS COMPOSITION";
pub const RECOMBINED_GAS_PROPERTIES: &str = "~ RECOMBINED GAS PROPERTIES";

/// Sample type codes.
const COMPOSITIONAL: &str = "C";
const RECOMBINED: &str = "R";
/// Separator condition: both stages present.
const BOTH_STAGES: &str = "B";
/// Sample point code that carries a DST location.
const DST_SAMPLE_POINT: &str = "50";

const BELOW_ONE: Bounds = Bounds::below(1.0);

static OIL_WATER_FIELDS: [FieldRule; 1] = [FieldRule::new(
    "DSTLOC.",
    Policy::Located {
        gate: "SPNT.",
        value: DST_SAMPLE_POINT,
    },
)];

pub static OIL_WATER_PLAN: Plan = Plan {
    sections: &[],
    fields: &OIL_WATER_FIELDS,
};

static GAS_SECTIONS: [SectionRule; 11] = [
    SectionRule {
        section: FS_HEADER,
        forbid_when: Condition::Equals("STYP.", COMPOSITIONAL),
        open: Policy::Declared,
        exceptions: &[],
    },
    SectionRule {
        section: FS_DATA,
        forbid_when: Condition::Equals("STYP.", COMPOSITIONAL),
        open: Policy::Declared,
        exceptions: &[],
    },
    SectionRule {
        section: SS_HEADER,
        forbid_when: Condition::Absent("FS-SPNT."),
        open: Policy::Choose {
            when: Condition::Equals("SEPCOND.", BOTH_STAGES),
            then: &Policy::Declared,
            otherwise: &Policy::IfPresent,
        },
        exceptions: &[],
    },
    SectionRule {
        section: SS_GAS,
        forbid_when: Condition::Never,
        open: Policy::Choose {
            when: Condition::All(&[
                Condition::Equals("SEPCOND.", BOTH_STAGES),
                Condition::Equals("STYP.", RECOMBINED),
            ]),
            then: &Policy::Mandatory,
            otherwise: &Policy::Declared,
        },
        exceptions: &[],
    },
    SectionRule {
        section: CL_HEADER,
        forbid_when: Condition::NotEquals("HYDLP.", "Y"),
        open: Policy::Declared,
        exceptions: &[],
    },
    SectionRule {
        section: CL_DATA,
        forbid_when: Condition::NotEquals("HYDLP.", "Y"),
        open: Policy::Declared,
        exceptions: &[],
    },
    SectionRule {
        section: CL_PROPERTIES,
        forbid_when: Condition::Equals("HYDLP.", "N"),
        open: Policy::Declared,
        exceptions: &[
            FieldRule::new("H2SLP.", Policy::Mandatory),
            FieldRule::new(
                "LIQRDN.",
                Policy::Measured(Measure::within(BELOW_ONE).required().nonzero()),
            ),
        ],
    },
    SectionRule {
        section: CL_FRACTIONS,
        forbid_when: Condition::Equals("HYDLP.", "N"),
        open: Policy::Measured(Measure::within(BELOW_ONE)),
        exceptions: &[
            FieldRule::new("LIQCOMP.", Policy::Declared),
            FieldRule::new(
                "RELMM.",
                Policy::Measured(Measure::within(Bounds::new(80.0, 250.0)).nonzero().nonnegative()),
            ),
            FieldRule::new("RDLIQ.", Policy::Measured(Measure::within(BELOW_ONE).nonzero())),
        ],
    },
    SectionRule {
        section: RECOMBINED_PROPERTIES,
        forbid_when: Condition::NotEquals("STYP.", RECOMBINED),
        open: Policy::Mandatory,
        exceptions: &[
            FieldRule::new(
                "FS-GAS.E3M3/D",
                Policy::Choose {
                    when: Condition::OneOf("SEPCOND.", &["F", BOTH_STAGES]),
                    then: &Policy::Mandatory,
                    otherwise: &Policy::Declared,
                },
            ),
            FieldRule::new(
                "SS-GAS.E3M3/D",
                Policy::Choose {
                    when: Condition::Equals("SEPCOND.", BOTH_STAGES),
                    then: &Policy::Mandatory,
                    otherwise: &Policy::Declared,
                },
            ),
        ],
    },
    SectionRule {
        section: RECOMBINED_COMPOSITION,
        forbid_when: Condition::Never,
        open: Policy::Choose {
            when: Condition::Equals("STYP.", RECOMBINED),
            then: &Policy::Mandatory,
            otherwise: &Policy::Declared,
        },
        exceptions: &[],
    },
    SectionRule {
        section: RECOMBINED_GAS_PROPERTIES,
        forbid_when: Condition::NotEquals("STYP.", RECOMBINED),
        open: Policy::Mandatory,
        exceptions: &[
            FieldRule::new("R-PPC.KPAA", Policy::Declared),
            FieldRule::new("R-PTC.DEGK", Policy::Declared),
        ],
    },
];

static GAS_FIELDS: [FieldRule; 6] = [
    FieldRule::new(
        "DSTLOC.",
        Policy::Located {
            gate: "FS-SPNT.",
            value: DST_SAMPLE_POINT,
        },
    ),
    FieldRule::new(
        "GLR.M3/M3",
        Policy::Choose {
            when: Condition::Equals("STYP.", RECOMBINED),
            then: &Policy::Mandatory,
            otherwise: &Policy::Declared,
        },
    ),
    FieldRule::new(
        "FLDH2S.PPM",
        Policy::Choose {
            when: Condition::Equals("H2SMT.", "N"),
            then: &Policy::ExactlyZero,
            otherwise: &Policy::Mandatory,
        },
    )
    .forbidden_when(Condition::NotOneOf("H2SLC.", &["F", "B"])),
    FieldRule::new("HYDLP.", Policy::Mandatory),
    FieldRule::new("H2SMT.", Policy::Mandatory).forbidden_when(Condition::Equals("H2SLC.", "L")),
    FieldRule::new(
        "LABH2S.FRAC",
        Policy::Choose {
            when: Condition::OneOf("H2SLC.", &["B", "L"]),
            then: &Policy::Mandatory,
            otherwise: &Policy::Declared,
        },
    ),
];

pub static GAS_PLAN: Plan = Plan {
    sections: &GAS_SECTIONS,
    fields: &GAS_FIELDS,
};

pub fn plan_for(kind: RecordKind) -> &'static Plan {
    match kind {
        RecordKind::Oil | RecordKind::Water => &OIL_WATER_PLAN,
        RecordKind::Gas => &GAS_PLAN,
    }
}

/// Validates `record` against every field of `view` in table order, stopping
/// at the first violation.
pub fn validate_record(view: &SpecView, record: &PasRecord) -> Result<(), Violation> {
    let plan = plan_for(view.kind());
    for field in view.iter() {
        plan.apply(field, record)?;
    }
    debug!("{} record at row {} passed", view.kind(), record.row());
    Ok(())
}
