//! Domain error types.
//!
//! Pure domain functions return `Result<T, ModError>`. Orchestration code
//! wraps them in `anyhow::Error`; callers recover the kind with
//! `err.downcast_ref::<ModError>()`.

use thiserror::Error;

use crate::domain::model::Version;

#[derive(Error, Debug)]
pub enum ModError {
    /// The metadata source does not know the package
    #[error("package '{name}' not found")]
    PackageNotFound { name: String },

    /// The package exists but has no release with the requested version
    #[error("release {version} of package '{name}' not found")]
    ReleaseNotFound { name: String, version: Version },

    /// The binary save record failed a length or bounds check
    #[error("malformed mod-list record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    /// Opaque failure from the network or file collaborators
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    /// Authentication input is missing required fields
    #[error("insufficient credentials: {0}")]
    InsufficientCredentials(String),

    #[error("invalid version '{input}'")]
    InvalidVersion { input: String },

    #[error("invalid dependency declaration '{declaration}'")]
    InvalidDependency { declaration: String },

    #[error("archive has no entry named '{entry}'")]
    MissingArchiveEntry { entry: String },
}

impl ModError {
    pub fn package_not_found(name: impl Into<String>) -> Self {
        ModError::PackageNotFound { name: name.into() }
    }

    pub fn release_not_found(name: impl Into<String>, version: Version) -> Self {
        ModError::ReleaseNotFound {
            name: name.into(),
            version,
        }
    }

    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        ModError::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }

    /// True for both the package and the exact-release not-found cases.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ModError::PackageNotFound { .. } | ModError::ReleaseNotFound { .. }
        )
    }
}
