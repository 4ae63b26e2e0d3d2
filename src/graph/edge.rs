//! Edge representation: unordered character pairs with interaction evidence

use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERACTION_TYPE: &str = "Unknown";
pub const DEFAULT_SENTIMENT: &str = "Neutral";
pub const DEFAULT_LOCATION: &str = "Unknown";
pub const DEFAULT_EVIDENCE: &str = "N/A";

/// Unordered pair of canonical names.
///
/// Stored as `(min, max)` under lexicographic order so `(A, B)` and `(B, A)`
/// are the same key. Self-pairs cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    first: String,
    second: String,
}

impl EdgeKey {
    /// Build a key, or `None` for a self-pair.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }

    /// The endpoint opposite `name`, if `name` is an endpoint.
    pub fn other(&self, name: &str) -> Option<&str> {
        if self.first == name {
            Some(&self.second)
        } else if self.second == name {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -- {}", self.first, self.second)
    }
}

/// Attributes retained from one raw interaction record.
///
/// Every field is total: absent upstream attributes are replaced with the
/// `DEFAULT_*` strings at aggregation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionDetail {
    #[serde(rename = "type")]
    pub interaction_type: String,
    pub sentiment: String,
    pub location: String,
    pub evidence: String,
}

impl Default for InteractionDetail {
    fn default() -> Self {
        Self {
            interaction_type: DEFAULT_INTERACTION_TYPE.to_string(),
            sentiment: DEFAULT_SENTIMENT.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            evidence: DEFAULT_EVIDENCE.to_string(),
        }
    }
}

impl InteractionDetail {
    /// Fill a detail from optional attributes, defaulting each missing one.
    pub fn from_optional(
        interaction_type: Option<&str>,
        sentiment: Option<&str>,
        location: Option<&str>,
        evidence: Option<&str>,
    ) -> Self {
        Self {
            interaction_type: interaction_type.unwrap_or(DEFAULT_INTERACTION_TYPE).to_string(),
            sentiment: sentiment.unwrap_or(DEFAULT_SENTIMENT).to_string(),
            location: location.unwrap_or(DEFAULT_LOCATION).to_string(),
            evidence: evidence.unwrap_or(DEFAULT_EVIDENCE).to_string(),
        }
    }
}

/// An aggregated relationship between two characters.
///
/// The weight is the number of interaction records folded into the edge and
/// is always equal to `details().len()`; it is derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEdge {
    key: EdgeKey,
    details: Vec<InteractionDetail>,
}

impl WeightedEdge {
    /// A weight-1 edge carrying its first interaction.
    pub fn new(key: EdgeKey, detail: InteractionDetail) -> Self {
        Self {
            key,
            details: vec![detail],
        }
    }

    /// An edge from an existing detail sequence; `None` if it is empty.
    pub fn from_details(key: EdgeKey, details: Vec<InteractionDetail>) -> Option<Self> {
        if details.is_empty() {
            return None;
        }
        Some(Self { key, details })
    }

    /// Count one more interaction.
    pub fn record(&mut self, detail: InteractionDetail) {
        self.details.push(detail);
    }

    /// Fold another contribution for the same key into this edge, keeping
    /// this edge's details first.
    pub fn absorb(&mut self, other: WeightedEdge) {
        debug_assert_eq!(self.key, other.key);
        self.details.extend(other.details);
    }

    pub fn key(&self) -> &EdgeKey {
        &self.key
    }

    pub fn weight(&self) -> u32 {
        self.details.len() as u32
    }

    pub fn details(&self) -> &[InteractionDetail] {
        &self.details
    }
}
