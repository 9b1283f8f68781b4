//! Session identifiers for agent reasoning runs.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one reasoning session.
///
/// Selecting a session requires a positive id. On the wire the id is usually a JSON
/// number but some emitters stringify it, so decoding accepts both forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Result<Self> {
        if id == 0 {
            return Err(Error::validation_with_context(
                "session id must be positive",
                ErrorContext::new()
                    .with_field_path("session_id")
                    .with_source("session_id"),
            ));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().parse::<u64>().map_err(|e| {
            Error::validation_with_context(
                format!("invalid session id '{}'", s),
                ErrorContext::new()
                    .with_field_path("session_id")
                    .with_details(e.to_string()),
            )
        })?;
        Self::new(id)
    }
}

impl TryFrom<u64> for SessionId {
    type Error = Error;

    fn try_from(id: u64) -> Result<Self> {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        // Zero is accepted here; it simply never matches an active session.
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(SessionId(n)),
            Raw::Text(s) => s
                .trim()
                .parse::<u64>()
                .map(SessionId)
                .map_err(serde::de::Error::custom),
        }
    }
}
