use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse track bucket a chapter belongs to, derived from its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    N1,
    N2,
    N3,
    N4,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::N1, Level::N2, Level::N3, Level::N4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::N1 => "N1",
            Level::N2 => "N2",
            Level::N3 => "N3",
            Level::N4 => "N4",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N1" => Ok(Level::N1),
            "N2" => Ok(Level::N2),
            "N3" => Ok(Level::N3),
            "N4" => Ok(Level::N4),
            other => Err(format!("unknown level '{}', expected N1..N4", other)),
        }
    }
}

/// Map a chapter id onto its level.
///
/// Ids starting with `10`, `20` or `30` land in N2, N3 and N4. Anything else,
/// including ids with no numeric prefix at all, falls back to N1.
pub fn classify_level(chapter_id: &str) -> Level {
    if chapter_id.starts_with("10") {
        Level::N2
    } else if chapter_id.starts_with("20") {
        Level::N3
    } else if chapter_id.starts_with("30") {
        Level::N4
    } else {
        Level::N1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_prefixes() {
        assert_eq!(classify_level("101"), Level::N2);
        assert_eq!(classify_level("10"), Level::N2);
        assert_eq!(classify_level("2005"), Level::N3);
        assert_eq!(classify_level("30-douane"), Level::N4);
    }

    #[test]
    fn test_everything_else_is_n1() {
        for id in ["", "1", "01", "40", "ch9", "id_k3j2h1_1700000000000_4", "١٠", "  10"] {
            assert_eq!(classify_level(id), Level::N1, "id {:?}", id);
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("n3".parse::<Level>(), Ok(Level::N3));
        assert!("N5".parse::<Level>().is_err());
    }
}
