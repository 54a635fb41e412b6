//! Redirect ratio: CDN redirects per origin-server redirect.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced while parsing a `"N:D"` ratio string.
///
/// Each variant names the constraint that failed so callers can report it
/// without matching on error text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatioParseError {
    /// The string is not of the form `<cdn count>:<origin count>`.
    #[error("redirect ratio must have the form \"<cdn redirects>:<origin redirects>\"")]
    Format,

    /// The CDN redirect count is not a positive integer.
    #[error("cdn redirect count must be a positive integer, got {0:?}")]
    CdnCount(String),

    /// The origin redirect count is not a positive integer.
    #[error("origin redirect count must be a positive integer, got {0:?}")]
    OriginCount(String),
}

/// Ratio of CDN redirects to origin-server redirects.
///
/// Always held in lowest terms, so `2:2` compares equal to `1:1` and both
/// drive an identical decision sequence. Serialized textual form is `"N:D"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RedirectRatio {
    cdn: u32,
    origin: u32,
}

impl RedirectRatio {
    /// Build a ratio from raw counts, reducing to lowest terms.
    ///
    /// Returns `None` when either count is zero; the split is undefined
    /// without at least one request on each side of the block.
    pub fn new(cdn: u32, origin: u32) -> Option<Self> {
        if cdn == 0 || origin == 0 {
            return None;
        }
        let divisor = gcd(cdn, origin);
        Some(Self {
            cdn: cdn / divisor,
            origin: origin / divisor,
        })
    }

    /// CDN redirects per block.
    pub fn cdn(&self) -> u32 {
        self.cdn
    }

    /// Origin-server redirects per block.
    pub fn origin(&self) -> u32 {
        self.origin
    }

    /// Size of the repeating window over which the ratio is exactly realized.
    pub fn block(&self) -> u32 {
        self.cdn + self.origin
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|count| *count >= 1)
}

impl FromStr for RedirectRatio {
    type Err = RatioParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (cdn_raw, origin_raw) = value.split_once(':').ok_or(RatioParseError::Format)?;
        let cdn = parse_count(cdn_raw).ok_or_else(|| RatioParseError::CdnCount(cdn_raw.to_string()))?;
        let origin =
            parse_count(origin_raw).ok_or_else(|| RatioParseError::OriginCount(origin_raw.to_string()))?;
        // Both counts checked >= 1 above, so the constructor cannot fail.
        Self::new(cdn, origin).ok_or(RatioParseError::Format)
    }
}

impl fmt::Display for RedirectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.cdn, self.origin)
    }
}

impl Serialize for RedirectRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RedirectRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
