use thiserror::Error;

/// Errors raised while parsing a number selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The token is neither an integer nor a dash-separated range
    #[error("'{token}' is not a valid list of ranges")]
    Malformed { token: String },

    /// A number (or range end) lies outside the allowed bounds
    #[error("{token} not in range {min}-{max}")]
    OutOfBounds { token: String, min: u32, max: u32 },

    /// A range whose start is greater than its end
    #[error("{token} ends before it starts")]
    Reversed { token: String },

    /// The allowed bounds themselves are empty (min > max)
    #[error("no numbers can be selected from {min}-{max}")]
    EmptyBounds { min: u32, max: u32 },
}

impl RangeError {
    pub fn malformed(token: impl Into<String>) -> Self {
        Self::Malformed {
            token: token.into(),
        }
    }

    pub fn out_of_bounds(token: impl Into<String>, min: u32, max: u32) -> Self {
        Self::OutOfBounds {
            token: token.into(),
            min,
            max,
        }
    }

    pub fn reversed(token: impl Into<String>) -> Self {
        Self::Reversed {
            token: token.into(),
        }
    }
}
