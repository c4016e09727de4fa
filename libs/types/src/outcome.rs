//! The two-variant binary outcome type
//!
//! Every market has exactly two complementary outcomes. The enum is the only
//! domain representation; the raw `u8` encoding used by thin client wrappers
//! is converted at the service boundary and never travels further in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two complementary outcomes of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    OptionA,
    OptionB,
}

impl Outcome {
    /// The opposite outcome.
    pub fn complement(self) -> Self {
        match self {
            Outcome::OptionA => Outcome::OptionB,
            Outcome::OptionB => Outcome::OptionA,
        }
    }

    /// Stable index for per-outcome storage (`0` for A, `1` for B).
    pub fn index(self) -> usize {
        match self {
            Outcome::OptionA => 0,
            Outcome::OptionB => 1,
        }
    }

    /// Decode the wire encoding used by the CLI wrapper (`0` = A, `1` = B).
    pub fn try_from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Outcome::OptionA),
            1 => Some(Outcome::OptionB),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::OptionA => write!(f, "A"),
            Outcome::OptionB => write!(f, "B"),
        }
    }
}
