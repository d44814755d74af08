use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Row identifier assigned by the store on insert. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultId(pub i64);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The operator's choice of conversion factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    A,
    B,
    C,
}

impl Selector {
    /// Liters of well volume per meter of measured distance.
    pub fn factor(self) -> f64 {
        match self {
            Selector::A => 2.019,
            Selector::B => 3.020,
            Selector::C => 4.513,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Selector::A => "A",
            Selector::B => "B",
            Selector::C => "C",
        }
    }
}

impl FromStr for Selector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Selector::A),
            "B" => Ok(Selector::B),
            "C" => Ok(Selector::C),
            other => Err(AppError::new(
                ErrorKind::InvalidSelector,
                format!("unrecognized conversion option '{other}'"),
            )),
        }
    }
}
