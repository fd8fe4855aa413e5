//! Record identifier validation.
//!
//! A record identifier (RID) addresses a single stored record by cluster
//! and position: `#12:0`. The identifier shape is also what is used to
//! decide what a bare `truncate` call targets.

use crate::error::{QueryError, QueryResult};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `#cluster:position`, the hash being optional
static RID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#)?(\d+):(\d+)$").unwrap());

/// A validated record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rid {
    pub cluster: u32,
    pub position: u64,
}

impl Rid {
    pub fn new(cluster: u32, position: u64) -> Self {
        Self { cluster, position }
    }

    /// Validate `input` under the given policy.
    pub fn parse_with(input: &str, policy: RidPolicy) -> QueryResult<Self> {
        let invalid = || QueryError::InvalidRid(input.to_string());

        let caps = shape(input, policy).ok_or_else(invalid)?;
        let cluster = caps[2].parse().map_err(|_| invalid())?;
        let position = caps[3].parse().map_err(|_| invalid())?;
        Ok(Self { cluster, position })
    }

    /// Check whether `input` is a valid record identifier.
    pub fn is_rid(input: &str, policy: RidPolicy) -> bool {
        Self::parse_with(input, policy).is_ok()
    }

    /// Check whether `input` looks like a record identifier, regardless of
    /// whether its numbers fit.
    pub fn has_shape(input: &str, policy: RidPolicy) -> bool {
        shape(input, policy).is_some()
    }
}

fn shape(input: &str, policy: RidPolicy) -> Option<Captures<'_>> {
    RID_RE
        .captures(input.trim())
        .filter(|caps| policy == RidPolicy::Lenient || caps.get(1).is_some())
}

impl FromStr for Rid {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with(s, RidPolicy::Lenient)
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.cluster, self.position)
    }
}

/// How strictly a string must look like a RID to be treated as one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RidPolicy {
    /// `12:0` and `#12:0` are both record identifiers
    #[default]
    Lenient,
    /// Only `#`-prefixed identifiers are record identifiers
    Strict,
}

/// What a `truncate` call targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TruncateTarget {
    Record(Rid),
    Class,
    Cluster,
}

impl TruncateTarget {
    /// Operation identifier of the command handling this target
    pub fn operation_id(&self) -> &'static str {
        match self {
            TruncateTarget::Record(_) => "truncate.record",
            TruncateTarget::Class => "truncate.class",
            TruncateTarget::Cluster => "truncate.cluster",
        }
    }
}

/// Decide what `entity` names.
///
/// Anything shaped like a RID under `policy` is a record, whatever the
/// caller meant; a RID-shaped entity whose numbers overflow is an
/// `InvalidRid` error. Everything else is a class, or a cluster when
/// `and_cluster` is set.
pub fn classify_truncate(
    entity: &str,
    and_cluster: bool,
    policy: RidPolicy,
) -> QueryResult<TruncateTarget> {
    if Rid::has_shape(entity, policy) {
        return Rid::parse_with(entity, policy).map(TruncateTarget::Record);
    }

    Ok(if and_cluster {
        TruncateTarget::Cluster
    } else {
        TruncateTarget::Class
    })
}
