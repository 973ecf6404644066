//! Capability names and declared capability sets.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const CAPABILITY_CONFIG: &str = "config";
pub const CAPABILITY_SETTING: &str = "setting";
pub const CAPABILITY_COMMAND: &str = "command";
pub const CAPABILITY_PROJECT: &str = "project";

/// A named function a consumer can request from the composed API.
///
/// The four known capabilities are variants so consumers can match on them
/// exhaustively. Third-party builders use [`Capability::Custom`]. Names are
/// case-sensitive; `"Config"` is a custom capability, not [`Capability::Config`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    Config,
    Setting,
    Command,
    Project,
    Custom(String),
}

impl Capability {
    /// Every known capability. A fully assembled API resolves all of them.
    pub const REQUIRED: [Capability; 4] = [
        Capability::Config,
        Capability::Setting,
        Capability::Command,
        Capability::Project,
    ];

    pub fn name(&self) -> &str {
        match self {
            Self::Config => CAPABILITY_CONFIG,
            Self::Setting => CAPABILITY_SETTING,
            Self::Command => CAPABILITY_COMMAND,
            Self::Project => CAPABILITY_PROJECT,
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        match name {
            CAPABILITY_CONFIG => Self::Config,
            CAPABILITY_SETTING => Self::Setting,
            CAPABILITY_COMMAND => Self::Command,
            CAPABILITY_PROJECT => Self::Project,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for Capability {
    fn from(name: String) -> Self {
        Capability::from(name.as_str())
    }
}

impl From<Capability> for String {
    fn from(capability: Capability) -> Self {
        capability.name().to_string()
    }
}

impl FromStr for Capability {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Capability::from(s))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// The set of capabilities a builder declares it can satisfy.
///
/// Membership is the only semantic operation; iteration order is sorted so
/// listings are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Implementations {
    capabilities: BTreeSet<Capability>,
}

impl Implementations {
    pub fn new<I, C>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Capability>,
    {
        Self {
            capabilities: capabilities.into_iter().map(Into::<Capability>::into).collect(),
        }
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn insert(&mut self, capability: impl Into<Capability>) -> bool {
        self.capabilities.insert(capability.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl<C: Into<Capability>> FromIterator<C> for Implementations {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Implementations::new(iter)
    }
}

impl IntoIterator for Implementations {
    type Item = Capability;
    type IntoIter = std::collections::btree_set::IntoIter<Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.capabilities.into_iter()
    }
}

impl<'a> IntoIterator for &'a Implementations {
    type Item = &'a Capability;
    type IntoIter = std::collections::btree_set::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.capabilities.iter()
    }
}
