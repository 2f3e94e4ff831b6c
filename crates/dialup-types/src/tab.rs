//! Browser tab and frame identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TabId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TabId)
    }
}

/// Identifier of a frame inside a tab. `0` is the top-level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub u32);

impl FrameId {
    pub const MAIN: FrameId = FrameId(0);

    pub fn is_main(self) -> bool {
        self == Self::MAIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_id_parses_and_displays() {
        let id: TabId = " 42 ".parse().unwrap();
        assert_eq!(id, TabId(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<TabId>().is_err());
    }

    #[test]
    fn main_frame_is_zero() {
        assert!(FrameId(0).is_main());
        assert!(!FrameId(3).is_main());
    }

    #[test]
    fn tab_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&TabId(7)).unwrap(), "7");
    }
}
