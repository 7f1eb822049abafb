//! Zoom projection: re-expressing a matched term at a chosen level of
//! generality.
//!
//! The caller picks a [`ZoomLevel`] once at the boundary; [`project`] then
//! always yields a displayable term. Levels past the top of the available
//! hierarchy saturate at its most general node, and an empty hierarchy falls
//! back to the matched term itself.

use std::convert::Infallible;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Requested abstraction level for display terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ZoomLevel {
    /// The matched term itself.
    #[default]
    MostSpecific,
    /// 1-based index into the pruned hierarchy path, root first.
    Level(NonZeroUsize),
}

impl ZoomLevel {
    /// Wire name of [`ZoomLevel::MostSpecific`].
    pub const MICRO: &'static str = "micro";

    /// Parse a raw zoom value. Anything that is not a positive integer means
    /// [`ZoomLevel::MostSpecific`].
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<usize>()
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(ZoomLevel::MostSpecific, ZoomLevel::Level)
    }

    /// Build a zoom level from a numeric value. Non-positive values mean
    /// [`ZoomLevel::MostSpecific`].
    pub fn from_number(value: i64) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(ZoomLevel::MostSpecific, ZoomLevel::Level)
    }

    /// Shorthand for a level, with 0 meaning [`ZoomLevel::MostSpecific`].
    pub fn level(n: usize) -> Self {
        NonZeroUsize::new(n).map_or(ZoomLevel::MostSpecific, ZoomLevel::Level)
    }
}

impl FromStr for ZoomLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ZoomLevel {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoomLevel::MostSpecific => f.write_str(Self::MICRO),
            ZoomLevel::Level(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for ZoomLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ZoomLevel::MostSpecific => serializer.serialize_str(Self::MICRO),
            ZoomLevel::Level(n) => serializer.serialize_u64(n.get() as u64),
        }
    }
}

impl<'de> Deserialize<'de> for ZoomLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawZoom {
            Number(i64),
            Text(String),
            Other(serde::de::IgnoredAny),
        }

        Ok(match RawZoom::deserialize(deserializer)? {
            RawZoom::Number(n) => ZoomLevel::from_number(n),
            RawZoom::Text(s) => ZoomLevel::parse(&s),
            RawZoom::Other(_) => ZoomLevel::MostSpecific,
        })
    }
}

/// Select the display term for `leaf_term` at `zoom` over `pruned_path`
/// (root first).
pub fn project<S: AsRef<str>>(leaf_term: &str, pruned_path: &[S], zoom: ZoomLevel) -> String {
    let ZoomLevel::Level(level) = zoom else {
        return leaf_term.to_string();
    };

    pruned_path
        .get(level.get() - 1)
        .or_else(|| pruned_path.last())
        .map_or_else(|| leaf_term.to_string(), |term| term.as_ref().to_string())
}
