//! Parsing of free-text dependency declarations.
//!
//! A declaration is an optional marker (`?`, `(?)` or `!`), a package name
//! and an optional `<op> <version>` clause:
//!
//! ```text
//! ? bobplates >= 0.15.0
//! (?) hidden-helper
//! ! conflicting-mod
//! base >= 0.15
//! ```

use log::debug;

use crate::domain::model::{
    Comparison, DependencyConstraint, DependencyModifier, ModRequest, VersionRequirement,
};
use crate::error::ModError;

/// Name of the base game package, which is never installed from the portal.
pub const BASE_PACKAGE: &str = "base";

pub struct DependencyParser;

impl DependencyParser {
    /// Parse a single declaration.
    ///
    /// A version clause that does not parse is dropped rather than failing the
    /// whole declaration.
    pub fn parse(declaration: &str) -> Result<DependencyConstraint, ModError> {
        let (modifier, rest) = Self::split_marker(declaration.trim());
        let rest = rest.trim_start();

        let name_end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '='))
            .unwrap_or(rest.len());
        let (name, clause) = rest.split_at(name_end);
        if name.is_empty() {
            return Err(ModError::InvalidDependency {
                declaration: declaration.to_string(),
            });
        }

        let clause = clause.trim();
        let requirement = if clause.is_empty() {
            None
        } else {
            let parsed = Self::parse_requirement(clause);
            if parsed.is_none() {
                debug!("Ignoring unparseable version clause in {:?}", declaration);
            }
            parsed
        };

        Ok(DependencyConstraint {
            target_name: name.to_string(),
            modifier,
            requirement,
        })
    }

    /// Turn declarations into the list of packages to install.
    ///
    /// The base game is always dropped. Without `include_optional`, optional
    /// and hidden-optional entries are dropped too. Order and duplicates are
    /// preserved.
    ///
    /// Incompatible (`!`) declarations are not filtered and come back as
    /// install requests. This matches the long-standing behavior callers rely
    /// on; filter them before downloading if that is not wanted.
    pub fn resolve_set(
        declarations: &[String],
        include_optional: bool,
    ) -> Result<Vec<ModRequest>, ModError> {
        let mut requests = Vec::new();
        for declaration in declarations {
            let constraint = Self::parse(declaration)?;
            if constraint.target_name == BASE_PACKAGE {
                continue;
            }
            if constraint.modifier.is_optional() && !include_optional {
                continue;
            }
            if constraint.modifier == DependencyModifier::Incompatible {
                debug!(
                    "Keeping incompatible dependency {} in install set",
                    constraint.target_name
                );
            }
            requests.push(ModRequest::latest(constraint.target_name));
        }
        Ok(requests)
    }

    fn split_marker(s: &str) -> (DependencyModifier, &str) {
        if let Some(rest) = s.strip_prefix("(?)") {
            (DependencyModifier::HiddenOptional, rest)
        } else if let Some(rest) = s.strip_prefix('?') {
            (DependencyModifier::Optional, rest)
        } else if let Some(rest) = s.strip_prefix('!') {
            (DependencyModifier::Incompatible, rest)
        } else {
            (DependencyModifier::Required, s)
        }
    }

    fn parse_requirement(clause: &str) -> Option<VersionRequirement> {
        // Two-character operators first so "<=" is not read as "<".
        const OPERATORS: [(&str, Comparison); 5] = [
            ("<=", Comparison::LessOrEqual),
            (">=", Comparison::GreaterOrEqual),
            ("<", Comparison::Less),
            (">", Comparison::Greater),
            ("=", Comparison::Equal),
        ];

        let (comparison, rest) = OPERATORS
            .iter()
            .find_map(|(op, cmp)| clause.strip_prefix(op).map(|rest| (*cmp, rest)))?;
        let version = rest.trim().parse().ok()?;
        Some(VersionRequirement {
            comparison,
            version,
        })
    }
}
