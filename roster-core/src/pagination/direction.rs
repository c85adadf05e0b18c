use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::page::PaginationRequestError;

/// Scan direction relative to the cursor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Ids greater than the cursor, ascending.
    #[default]
    Next,
    /// Ids lower than the cursor, scanned descending.
    Previous,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Next => "NEXT",
            Direction::Previous => "PREVIOUS",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = PaginationRequestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.eq_ignore_ascii_case("NEXT") {
            Ok(Direction::Next)
        } else if raw.eq_ignore_ascii_case("PREVIOUS") {
            Ok(Direction::Previous)
        } else {
            Err(PaginationRequestError::InvalidDirection {
                value: raw.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("next".parse::<Direction>().unwrap(), Direction::Next);
        for raw in ["Previous", "PREVIOUS"] {
            assert_eq!(raw.parse::<Direction>().unwrap(), Direction::Previous);
        }
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "sideways".parse::<Direction>().unwrap_err();
        assert_eq!(
            err,
            PaginationRequestError::InvalidDirection {
                value: "sideways".into()
            }
        );
        assert!(" next".parse::<Direction>().is_err());
    }
}
