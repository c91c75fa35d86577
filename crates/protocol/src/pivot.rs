use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Which horizontal edge (or the center) a node tracks when its parent grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

impl HorizontalAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Which vertical edge (or the middle) a node tracks when its parent grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAnchor {
    Top,
    Middle,
    Bottom,
}

impl VerticalAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

/// Anchor encoding carried by layout elements.
///
/// On the wire a pivot is a single string: the horizontal anchor followed by
/// the vertical anchor, with absent axes omitted (`lefttop`, `right`,
/// `middle`). A pivot with neither axis set is never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pivot {
    pub horizontal: Option<HorizontalAnchor>,
    pub vertical: Option<VerticalAnchor>,
}

impl Pivot {
    /// Fixed anchor for the contents of repeated cells.
    pub const LEFT_TOP: Pivot = Pivot {
        horizontal: Some(HorizontalAnchor::Left),
        vertical: Some(VerticalAnchor::Top),
    };

    pub fn new(horizontal: Option<HorizontalAnchor>, vertical: Option<VerticalAnchor>) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}

impl fmt::Display for Pivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(h) = self.horizontal {
            f.write_str(h.as_str())?;
        }
        if let Some(v) = self.vertical {
            f.write_str(v.as_str())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pivot: {0:?}")]
pub struct PivotParseError(pub String);

impl FromStr for Pivot {
    type Err = PivotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (horizontal, rest) = [
            HorizontalAnchor::Left,
            HorizontalAnchor::Center,
            HorizontalAnchor::Right,
        ]
        .into_iter()
        .find_map(|h| s.strip_prefix(h.as_str()).map(|rest| (Some(h), rest)))
        .unwrap_or((None, s));

        let vertical = match rest {
            "" => None,
            "top" => Some(VerticalAnchor::Top),
            "middle" => Some(VerticalAnchor::Middle),
            "bottom" => Some(VerticalAnchor::Bottom),
            _ => return Err(PivotParseError(s.to_string())),
        };

        let pivot = Pivot::new(horizontal, vertical);
        if pivot.is_empty() {
            return Err(PivotParseError(s.to_string()));
        }
        Ok(pivot)
    }
}

impl Serialize for Pivot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pivot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
