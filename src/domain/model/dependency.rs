use serde::{Deserialize, Serialize};
use std::fmt;

use super::Version;

/// Requirement modifier carried by a dependency declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DependencyModifier {
    /// No marker
    #[default]
    Required,
    /// `?`
    Optional,
    /// `(?)`
    HiddenOptional,
    /// `!`
    Incompatible,
}

impl DependencyModifier {
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            DependencyModifier::Optional | DependencyModifier::HiddenOptional
        )
    }

    pub fn marker(&self) -> &'static str {
        match self {
            DependencyModifier::Required => "",
            DependencyModifier::Optional => "?",
            DependencyModifier::HiddenOptional => "(?)",
            DependencyModifier::Incompatible => "!",
        }
    }
}

/// Comparison operator of a version clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = ">")]
    Greater,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Equal => "=",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Greater => ">",
        }
    }
}

/// Trailing `<op> <version>` clause of a declaration.
///
/// Retained for consumers that want it; dependency filtering ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRequirement {
    pub comparison: Comparison,
    pub version: Version,
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.comparison.as_str(), self.version)
    }
}

/// A parsed dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConstraint {
    pub target_name: String,
    pub modifier: DependencyModifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<VersionRequirement>,
}

impl fmt::Display for DependencyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = self.modifier.marker();
        if !marker.is_empty() {
            write!(f, "{} ", marker)?;
        }
        write!(f, "{}", self.target_name)?;
        if let Some(req) = &self.requirement {
            write!(f, " {}", req)?;
        }
        Ok(())
    }
}
