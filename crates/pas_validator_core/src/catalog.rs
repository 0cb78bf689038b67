//! Static code lists and numeric validity ranges.
//!
//! Every interval is open: a value equal to either bound is out of range.

use std::fmt;

use pas_model::mnemonic_unit;

const YES_NO: &[&str] = &["Y", "N"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    Text(&'static [&'static str]),
    Integer(&'static [i64]),
}

impl CodeSet {
    /// Membership of a text value. Integer lists accept text that parses to a member.
    pub fn contains_text(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            CodeSet::Text(codes) => codes.iter().any(|code| *code == value),
            CodeSet::Integer(codes) => value
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(|number| codes.contains(&(number.trunc() as i64)))
                .unwrap_or(false),
        }
    }

    pub fn contains_integer(&self, value: i64) -> bool {
        match self {
            CodeSet::Text(codes) => {
                let rendered = value.to_string();
                codes.iter().any(|code| *code == rendered)
            }
            CodeSet::Integer(codes) => codes.contains(&value),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CodeSet::Text(codes) => codes.join(", "),
            CodeSet::Integer(codes) => codes
                .iter()
                .map(|code| code.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Legal values for a coded mnemonic.
pub fn code_set(mnemonic: &str) -> Option<CodeSet> {
    let set = match mnemonic {
        "AIN." | "AWSVAL." | "DPTS." | "H2SIND." | "HYDLP." | "INTRP." | "LIT." | "MSRN."
        | "MSRNG." | "MTST" | "MTST." | "PACKER." | "POOL." | "PVT" | "RRUN." | "TULD." => {
            CodeSet::Text(YES_NO)
        }
        "AFLO." => CodeSet::Text(&["A", "C", "T", "B"]),
        "AOFTY." => CodeSet::Integer(&[1, 2, 31, 32, 41]),
        "CL-SPNT." | "FS-SPNT." | "SPNT." | "SS-SPNT." => {
            CodeSet::Integer(&[20, 25, 30, 35, 40, 45, 50, 60, 70])
        }
        "CUTP." => CodeSet::Integer(&[1, 2, 3, 4, 5]),
        "DRILLEG." => CodeSet::Integer(&[1, 2, 3, 4, 5, 6, 7, 8, 9]),
        "DSTLOC." => CodeSet::Text(&["T", "M", "B"]),
        "FLEXP." | "WSFL." => CodeSet::Integer(&[1, 2, 6, 17]),
        "GPOS." => CodeSet::Text(&["I", "O", "R", "B", "N", "U"]),
        "H2SLC." => CodeSet::Text(&["F", "L", "B"]),
        "H2SLP." => CodeSet::Text(&["N", "T", "M"]),
        "H2SMT." => CodeSet::Text(&["T", "L", "C", "O", "S", "N"]),
        "INJFL." => CodeSet::Integer(&[1, 2, 6]),
        "LIQGPT." => CodeSet::Text(&["F", "S", "T"]),
        "LIQT." => CodeSet::Text(&["O", "C", "W"]),
        "LQMTYP." => CodeSet::Text(&["T", "L", "V", "O"]),
        "MDTYPE." => CodeSet::Text(&["P", "O", "T", "i", "C", "V", "H"]),
        "PLIND." | "SLIND." => CodeSet::Text(&["O", "W", "C", "E", "T"]),
        "PRPS." => CodeSet::Text(&["I", "A", "O"]),
        "PRSTY." => CodeSet::Integer(&[4, 5, 6, 11, 12, 14, 15, 24, 34, 50]),
        "RPXX." => CodeSet::Text(&["V", "H", "N"]),
        "RTNUM." => CodeSet::Text(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "E"]),
        "SEPCOND." => CodeSet::Text(&["F", "B"]),
        "STYP." => CodeSet::Text(&["G", "C", "B", "R"]),
        "SURBTM." => CodeSet::Text(&["S", "B"]),
        "TAP." => CodeSet::Text(&["F", "P"]),
        "TAPL." => CodeSet::Text(&["U", "D"]),
        "TMEA." => CodeSet::Text(&["I", "C"]),
        "TTYP." => CodeSet::Text(&["3", "10", "13", "23", "33", "43"]),
        "UNIT." => CodeSet::Text(&["M"]),
        "WTYP." => CodeSet::Text(&["V", "D", "H"]),
        _ => return None,
    };
    Some(set)
}

/// An open numeric interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn below(max: f64) -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.min, self.max)
    }
}

pub fn unit_range(unit: &str) -> Option<Bounds> {
    match unit {
        "DEGC" => Some(Bounds::new(-100.0, 1000.0)),
        "DEGK" => Some(Bounds::new(173.15, 1273.15)),
        "KPA" | "KPAA" => Some(Bounds::below(150_000.0)),
        "MPA'S" => Some(Bounds::below(150.0)),
        "M" => Some(Bounds::below(7000.0)),
        _ => None,
    }
}

/// Per-mnemonic intervals that replace the unit interval.
pub fn mnemonic_override(mnemonic: &str) -> Option<Bounds> {
    match mnemonic {
        "TROOM.DEGC" => Some(Bounds::new(0.0, 45.0)),
        "RELMM." => Some(Bounds::new(80.0, 250.0)),
        "RDLIQ." => Some(Bounds::below(1.0)),
        _ => None,
    }
}

/// The interval a numeric mnemonic must fall inside, if any.
pub fn range_for(mnemonic: &str) -> Option<Bounds> {
    mnemonic_override(mnemonic).or_else(|| mnemonic_unit(mnemonic).and_then(unit_range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_codes_compare_text() {
        let set = code_set("HYDLP.").unwrap();
        assert!(set.contains_text("Y"));
        assert!(set.contains_text(" N "));
        assert!(!set.contains_text("y"));
        assert!(code_set("MTST").is_some());
        assert!(code_set("PVT.").is_none());
    }

    #[test]
    fn integer_codes_accept_parsed_text() {
        let set = code_set("SPNT.").unwrap();
        assert!(set.contains_integer(50));
        assert!(set.contains_text("50"));
        assert!(set.contains_text("20.7"));
        assert!(!set.contains_integer(55));
        assert!(!set.contains_text("fifty"));
    }

    #[test]
    fn text_codes_accept_integral_numbers() {
        let set = code_set("TTYP.").unwrap();
        assert!(set.contains_integer(13));
        assert!(!set.contains_integer(14));
    }

    #[test]
    fn override_supersedes_unit_range() {
        let bounds = range_for("TROOM.DEGC").unwrap();
        assert_eq!(bounds, Bounds::new(0.0, 45.0));
        assert_eq!(range_for("STEMP.DEGC"), Some(Bounds::new(-100.0, 1000.0)));
        assert_eq!(range_for("RDLIQ."), Some(Bounds::below(1.0)));
        assert_eq!(range_for("GHV.MJ/M3"), None);
    }

    #[test]
    fn bounds_are_exclusive() {
        let bounds = unit_range("M").unwrap();
        assert!(bounds.contains(6999.99));
        assert!(!bounds.contains(7000.0));
        assert!(bounds.contains(-5.0));
        let kelvin = unit_range("DEGK").unwrap();
        assert!(!kelvin.contains(173.15));
        assert!(kelvin.contains(173.16));
    }

    #[test]
    fn describes_allowed_values() {
        assert_eq!(code_set("CUTP.").unwrap().describe(), "1, 2, 3, 4, 5");
        assert_eq!(Bounds::below(1.0).to_string(), "(-inf, 1)");
    }
}
