//! # Principals
//!
//! Principals are the identities that appear in ACLs and in the session's
//! principal set. The server reports them as plain strings; we parse them
//! into one of four shapes:
//!
//! - `system.Everyone`: any caller, authenticated or not
//! - `system.Authenticated`: any authenticated caller
//! - `/buckets/<bid>/groups/<gid>`: members of a group
//! - anything else: an opaque user principal (e.g. `account:admin`, `fxa:...`)
//!
//! Parsing never fails on the opaque case, so every server string has a
//! principal. [`Display`](std::fmt::Display) writes the original string back.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const EVERYONE: &str = "system.Everyone";
pub const AUTHENTICATED: &str = "system.Authenticated";

static GROUP_URI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/buckets/([^/]+)/groups/([^/]+)$").unwrap());

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PrincipalParseError {
    #[error("empty principal")]
    Empty,
}

/// An identity that can be granted permissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Principal {
    /// `system.Everyone`
    Everyone,
    /// `system.Authenticated`
    Authenticated,
    /// A group of a bucket, `/buckets/<bucket_id>/groups/<group_id>`.
    Group { bucket_id: String, group_id: String },
    /// Any other identity, kept verbatim.
    User(String),
}

impl Principal {
    /// Build the principal URI of a bucket group.
    pub fn group(bucket_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Principal::Group {
            bucket_id: bucket_id.into(),
            group_id: group_id.into(),
        }
    }

    /// The group id, if this principal is a group of `bucket_id`.
    pub fn group_of(&self, bucket_id: &str) -> Option<&str> {
        match self {
            Principal::Group {
                bucket_id: bid,
                group_id,
            } if bid == bucket_id => Some(group_id),
            _ => None,
        }
    }
}

impl FromStr for Principal {
    type Err = PrincipalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PrincipalParseError::Empty);
        }
        if s == EVERYONE {
            return Ok(Principal::Everyone);
        }
        if s == AUTHENTICATED {
            return Ok(Principal::Authenticated);
        }
        if let Some(caps) = GROUP_URI_REGEX.captures(s) {
            return Ok(Principal::group(&caps[1], &caps[2]));
        }
        Ok(Principal::User(s.to_string()))
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.to_string()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Everyone => write!(f, "{}", EVERYONE),
            Principal::Authenticated => write!(f, "{}", AUTHENTICATED),
            Principal::Group {
                bucket_id,
                group_id,
            } => write!(f, "/buckets/{}/groups/{}", bucket_id, group_id),
            Principal::User(id) => write!(f, "{}", id),
        }
    }
}
