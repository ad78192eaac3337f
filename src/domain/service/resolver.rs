//! Version resolution for packages.
//!
//! Decides whether a newer compatible release exists and which release to
//! download. All methods are stateless and operate on slices of releases.

use log::debug;
use serde::Serialize;

use crate::domain::model::{Release, Version};
use crate::error::ModError;

/// Outcome of an update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateCheck {
    UpToDate,
    Available { version: Version },
}

impl UpdateCheck {
    pub fn has_update(&self) -> bool {
        matches!(self, UpdateCheck::Available { .. })
    }

    pub fn version(&self) -> Option<Version> {
        match self {
            UpdateCheck::Available { version } => Some(*version),
            UpdateCheck::UpToDate => None,
        }
    }
}

/// Version resolver - pure functions for version resolution.
pub struct VersionResolver;

impl VersionResolver {
    /// Check whether `releases` offers an update over `installed`.
    ///
    /// `releases` must be ordered most-recent first. The first release that is
    /// strictly newer than `installed` and compatible with
    /// `target_game_version` wins; later entries are never looked at, so an
    /// unsorted list can yield a compatible release that is not the newest.
    ///
    /// A `target_game_version` of `0.0.0` accepts any game version. Otherwise
    /// a release is compatible when its game version has the same minor
    /// component as the target.
    pub fn check_for_update(
        installed: &Version,
        releases: &[Release],
        target_game_version: &Version,
    ) -> UpdateCheck {
        releases
            .iter()
            .find(|r| {
                r.version > *installed
                    && Self::is_compatible(&r.game_version, target_game_version)
            })
            .map(|r| {
                debug!(
                    "Update {} -> {} (game {})",
                    installed, r.version, r.game_version
                );
                UpdateCheck::Available { version: r.version }
            })
            .unwrap_or(UpdateCheck::UpToDate)
    }

    /// Whether a release built for `release_game` can run on `target_game`.
    pub fn is_compatible(release_game: &Version, target_game: &Version) -> bool {
        target_game.is_wildcard() || release_game.minor == target_game.minor
    }

    /// Pick the release to download for `package`.
    ///
    /// With a requested version, the release with exactly that version;
    /// otherwise the first (most recent) release.
    pub fn select_release_to_download<'a>(
        package: &str,
        releases: &'a [Release],
        requested: Option<&Version>,
    ) -> Result<&'a Release, ModError> {
        match requested {
            Some(version) => releases
                .iter()
                .find(|r| r.version == *version)
                .ok_or_else(|| ModError::release_not_found(package, *version)),
            None => releases
                .first()
                .ok_or_else(|| ModError::package_not_found(package)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_release(version: &str, game: &str) -> Release {
        Release {
            version: version.parse().unwrap(),
            game_version: game.parse().unwrap(),
            download_url: format!("/download/mod/{}", version),
            ..Default::default()
        }
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_skips_release_for_other_game_minor() {
        let releases = vec![make_release("1.2.0", "0.15.0"), make_release("1.1.0", "0.14.0")];

        let check = VersionResolver::check_for_update(&v("1.0.0"), &releases, &v("0.14.0"));

        assert_eq!(
            check,
            UpdateCheck::Available {
                version: v("1.1.0")
            }
        );
    }

    #[test]
    fn test_wildcard_accepts_first_newer_release() {
        let releases = vec![make_release("1.2.0", "0.15.0"), make_release("1.1.0", "0.14.0")];

        let check = VersionResolver::check_for_update(&v("1.0.0"), &releases, &Version::ZERO);

        assert_eq!(check.version(), Some(v("1.2.0")));
        assert!(check.has_update());
    }

    #[test]
    fn test_up_to_date_when_installed_is_highest() {
        let releases = vec![make_release("1.2.0", "0.15.0"), make_release("1.1.0", "0.14.0")];

        let check = VersionResolver::check_for_update(&v("1.2.0"), &releases, &Version::ZERO);

        assert_eq!(check, UpdateCheck::UpToDate);
        assert!(!check.has_update());
        assert_eq!(check.version(), None);
    }

    #[test]
    fn test_first_match_wins_on_unsorted_list() {
        // Ordering is trusted: the older compatible release comes first and wins.
        let releases = vec![make_release("1.1.0", "0.14.0"), make_release("1.3.0", "0.14.0")];

        let check = VersionResolver::check_for_update(&v("1.0.0"), &releases, &v("0.14"));

        assert_eq!(check.version(), Some(v("1.1.0")));
    }

    #[test]
    fn test_two_component_game_versions_are_normalized() {
        let releases = vec![make_release("0.2.6", "0.13")];

        let check = VersionResolver::check_for_update(&v("0.2.5"), &releases, &v("0.13"));

        assert_eq!(check.version(), Some(v("0.2.6")));
    }

    #[test]
    fn test_no_releases_means_up_to_date() {
        let check = VersionResolver::check_for_update(&v("1.0.0"), &[], &Version::ZERO);
        assert_eq!(check, UpdateCheck::UpToDate);
    }

    #[test]
    fn test_equal_version_is_not_an_update() {
        let releases = vec![make_release("1.0.0", "0.14.0")];
        let check = VersionResolver::check_for_update(&v("1.0"), &releases, &v("0.14.0"));
        assert!(!check.has_update());
    }

    #[test]
    fn test_select_latest() {
        let releases = vec![make_release("1.2.0", "0.15.0"), make_release("1.1.0", "0.14.0")];
        let release = VersionResolver::select_release_to_download("mod", &releases, None).unwrap();
        assert_eq!(release.version, v("1.2.0"));
    }

    #[test]
    fn test_select_exact() {
        let releases = vec![make_release("1.2.0", "0.15.0"), make_release("1.1.0", "0.14.0")];
        let release =
            VersionResolver::select_release_to_download("mod", &releases, Some(&v("1.1")))
                .unwrap();
        assert_eq!(release.version, v("1.1.0"));
    }

    #[test]
    fn test_select_exact_missing_is_not_found() {
        let releases = vec![make_release("1.2.0", "0.15.0")];
        let err = VersionResolver::select_release_to_download("mod", &releases, Some(&v("9.9.9")))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, ModError::ReleaseNotFound { .. }));
    }

    #[test]
    fn test_select_latest_from_empty_is_not_found() {
        let err = VersionResolver::select_release_to_download("mod", &[], None).unwrap_err();
        assert!(err.is_not_found());
    }
}
