//! Parsing of `PAD:KIND` build orders supplied on the command line.

use std::{fmt, str::FromStr};

use pathguard_core::{PadIndex, TowerKind};
use thiserror::Error;

/// A tower the runner constructs before the first wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BuildOrder {
    pub(crate) pad: PadIndex,
    pub(crate) kind: TowerKind,
}

/// Reasons a build order could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum BuildOrderError {
    /// The separator between pad and kind is missing.
    #[error("expected PAD:KIND, got `{0}`")]
    MissingSeparator(String),
    /// The pad is not a non-negative integer.
    #[error("invalid pad index `{0}`")]
    InvalidPad(String),
    /// The tower kind is not one of the known archetypes.
    #[error("unknown tower kind `{0}` (expected archer, mage, artillery or barracks)")]
    UnknownKind(String),
}

impl FromStr for BuildOrder {
    type Err = BuildOrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (pad, kind) = value
            .split_once(':')
            .ok_or_else(|| BuildOrderError::MissingSeparator(value.to_owned()))?;

        let pad = pad
            .trim()
            .parse::<u32>()
            .map_err(|_| BuildOrderError::InvalidPad(pad.to_owned()))?;
        let kind = parse_kind(kind.trim())
            .ok_or_else(|| BuildOrderError::UnknownKind(kind.to_owned()))?;

        Ok(Self {
            pad: PadIndex::new(pad),
            kind,
        })
    }
}

impl fmt::Display for BuildOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pad.get(), kind_name(self.kind))
    }
}

fn parse_kind(value: &str) -> Option<TowerKind> {
    TowerKind::ALL
        .into_iter()
        .find(|kind| kind_name(*kind).eq_ignore_ascii_case(value))
}

fn kind_name(kind: TowerKind) -> &'static str {
    match kind {
        TowerKind::Archer => "archer",
        TowerKind::Mage => "mage",
        TowerKind::Artillery => "artillery",
        TowerKind::Barracks => "barracks",
    }
}
