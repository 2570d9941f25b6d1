//! Department Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Production department (ordered pipeline)
///
/// `Layup → Plugging → Barcode → CNC → Finish → Gunsmith → Paint → QC → Shipping → Shipped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    Layup,
    Plugging,
    Barcode,
    #[serde(rename = "CNC")]
    Cnc,
    Finish,
    Gunsmith,
    Paint,
    #[serde(rename = "QC")]
    Qc,
    Shipping,
    Shipped,
}

impl Department {
    /// All departments in pipeline order
    pub const PIPELINE: [Department; 10] = [
        Department::Layup,
        Department::Plugging,
        Department::Barcode,
        Department::Cnc,
        Department::Finish,
        Department::Gunsmith,
        Department::Paint,
        Department::Qc,
        Department::Shipping,
        Department::Shipped,
    ];

    /// Position in the pipeline (Layup = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Next department in the pipeline, `None` for Shipped
    pub fn successor(self) -> Option<Department> {
        Self::PIPELINE.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == Department::Shipped
    }

    /// Departments an order may ship from
    pub fn can_ship_from(self) -> bool {
        matches!(self, Department::Qc | Department::Shipping)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Layup => "Layup",
            Department::Plugging => "Plugging",
            Department::Barcode => "Barcode",
            Department::Cnc => "CNC",
            Department::Finish => "Finish",
            Department::Gunsmith => "Gunsmith",
            Department::Paint => "Paint",
            Department::Qc => "QC",
            Department::Shipping => "Shipping",
            Department::Shipped => "Shipped",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown department name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown department: {0}")]
pub struct UnknownDepartment(pub String);

impl FromStr for Department {
    type Err = UnknownDepartment;

    /// Case-insensitive; accepts the display names (`CNC`, `QC`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::PIPELINE
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDepartment(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_chain() {
        assert_eq!(Department::Layup.successor(), Some(Department::Plugging));
        assert_eq!(Department::Barcode.successor(), Some(Department::Cnc));
        assert_eq!(Department::Shipping.successor(), Some(Department::Shipped));
        assert_eq!(Department::Shipped.successor(), None);
    }

    #[test]
    fn test_pipeline_order() {
        assert!(Department::Layup < Department::Cnc);
        assert!(Department::Qc < Department::Shipped);
        for (i, d) in Department::PIPELINE.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn test_parse_and_serde_names() {
        assert_eq!("cnc".parse::<Department>(), Ok(Department::Cnc));
        assert_eq!("QC".parse::<Department>(), Ok(Department::Qc));
        assert_eq!("layup".parse::<Department>(), Ok(Department::Layup));
        let err = "Assembly".parse::<Department>().unwrap_err();
        assert_eq!(err, UnknownDepartment("Assembly".to_string()));
        assert_eq!(err.to_string(), "unknown department: Assembly");

        assert_eq!(serde_json::to_string(&Department::Cnc).unwrap(), "\"CNC\"");
        let d: Department = serde_json::from_str("\"Gunsmith\"").unwrap();
        assert_eq!(d, Department::Gunsmith);
    }
}
