//! Node identifiers.
//!
//! This module provides the [`NodeId`] type. Ids are assigned by the shape
//! merger in first-seen order and rendered as `node_<n>` in every output.

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const PREFIX: &str = "node_";

/// Identifier of a logical node, stable for a given input and configuration.
///
/// Ordering follows assignment order, so sorting by id reproduces detection
/// order.
///
/// # Examples
///
/// ```
/// use flowsketch_core::identifier::NodeId;
///
/// let id = NodeId::from_ordinal(3);
/// assert_eq!(id.to_string(), "node_3");
/// assert_eq!("node_3".parse::<NodeId>(), Ok(id));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates the id for the `n`-th node (1-based).
    ///
    /// An ordinal of zero is bumped to one.
    pub fn from_ordinal(n: u32) -> Self {
        Self(NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN))
    }

    /// Returns the 1-based ordinal of this id.
    pub fn ordinal(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

/// Error returned when a string is not of the form `node_<n>` with `n >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid node id `{0}`, expected `node_<n>` with n >= 1")]
pub struct ParseNodeIdError(String);

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(PREFIX)
            .and_then(|digits| digits.parse::<NonZeroU32>().ok())
            .map(Self)
            .ok_or_else(|| ParseNodeIdError(s.to_string()))
    }
}

impl TryFrom<String> for NodeId {
    type Error = ParseNodeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}
