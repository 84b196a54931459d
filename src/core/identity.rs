//! Entity identity - prefixed ULID identifiers
//!
//! Every persisted entity carries an ID of the form `PREFIX-ULID`
//! (e.g. `TPL-01KCWY20F01B21V0G4E835NW3J`). The prefix is a closed set so
//! an ID always reveals its entity type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    /// Checklist template
    Tpl,
    /// Inspection run
    Run,
}

impl EntityPrefix {
    /// All known prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[EntityPrefix::Tpl, EntityPrefix::Run]
    }

    /// The string form used in IDs and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Tpl => "TPL",
            EntityPrefix::Run => "RUN",
        }
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TPL" => Ok(EntityPrefix::Tpl),
            "RUN" => Ok(EntityPrefix::Run),
            _ => Err(IdParseError::UnknownPrefix(s.to_string())),
        }
    }
}

/// Errors from parsing an entity ID string
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("Unknown entity prefix: {0}")]
    UnknownPrefix(String),

    #[error("Malformed entity ID (expected PREFIX-ULID): {0}")]
    Malformed(String),

    #[error("Invalid ULID in entity ID: {0}")]
    InvalidUlid(String),
}

/// A unique, sortable entity identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh ID for the given entity type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// The entity type prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// First 8 ULID characters, used for display and git-friendly references
    pub fn short(&self) -> String {
        let ulid = self.ulid.to_string();
        format!("{}-{}", self.prefix, &ulid[..8])
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::Malformed(s.to_string()))?;
        let prefix = prefix.parse::<EntityPrefix>()?;
        let ulid = Ulid::from_string(ulid).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}
