//! Local mod directory: package files, the enable list and the
//! one-version-per-package rule.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveReader, DESCRIPTOR_ENTRY};
use crate::domain::model::{InstalledPackage, ModDescriptor, ModList, PackageFile};
use crate::runtime::Runtime;

/// Name of the persisted enable list inside the mod directory.
pub const MOD_LIST_FILE: &str = "mod-list.json";

/// Inventory of the packages in one mod directory.
pub struct ModInventory<'a, R: Runtime> {
    runtime: &'a R,
    archive: &'a dyn ArchiveReader,
    mod_dir: PathBuf,
}

impl<'a, R: Runtime> ModInventory<'a, R> {
    pub fn new(runtime: &'a R, archive: &'a dyn ArchiveReader, mod_dir: PathBuf) -> Self {
        Self {
            runtime,
            archive,
            mod_dir,
        }
    }

    pub fn mod_dir(&self) -> &Path {
        &self.mod_dir
    }

    /// Returns: `<mod_dir>/mod-list.json`
    pub fn mod_list_path(&self) -> PathBuf {
        self.mod_dir.join(MOD_LIST_FILE)
    }

    /// Write a downloaded package into the mod directory.
    #[tracing::instrument(skip(self, bytes))]
    pub fn write_package(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if !self.runtime.exists(&self.mod_dir) {
            self.runtime.create_dir_all(&self.mod_dir)?;
        }
        let path = self.mod_dir.join(file_name);
        self.runtime
            .write(&path, bytes)
            .with_context(|| format!("Failed to write package {:?}", path))?;
        debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }

    /// Delete every other version of `package` unless multiple versions are allowed.
    ///
    /// Every deletion is attempted. If any of them failed, the call fails with
    /// the first error after the rest have run. Returns the removed paths.
    ///
    /// Assumes nothing else adds files for `package` while this runs.
    #[tracing::instrument(skip(self))]
    pub fn enforce_single_version(
        &self,
        package: &str,
        keep_file: &str,
        allow_multiple: bool,
    ) -> Result<Vec<PathBuf>> {
        if allow_multiple {
            return Ok(vec![]);
        }

        let pattern = format!("{}_*.zip", glob::Pattern::escape(package));
        let stale: Vec<PathBuf> = self
            .runtime
            .find(&self.mod_dir, &pattern)?
            .into_iter()
            .filter(|path| {
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    return false;
                };
                // `a_*.zip` also matches `a_b_1.0.0.zip`, which belongs to `a_b`
                file_name != keep_file
                    && PackageFile::parse(file_name).is_some_and(|f| f.name == package)
            })
            .collect();

        self.remove_all(stale)
    }

    /// Delete `<name_glob>_<version_glob>.zip`; `None` matches every version.
    #[tracing::instrument(skip(self))]
    pub fn remove_matching(
        &self,
        name_glob: &str,
        version_glob: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        let pattern = format!("{}_{}.zip", name_glob, version_glob.unwrap_or("*"));
        let matched = self.runtime.find(&self.mod_dir, &pattern)?;
        if matched.is_empty() {
            info!("No package files match {}", pattern);
        }
        self.remove_all(matched)
    }

    fn remove_all(&self, paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        let mut first_error = None;
        let mut removed = Vec::with_capacity(paths.len());

        for path in paths {
            match self.runtime.remove_file(&path) {
                Ok(()) => {
                    debug!("Removed {:?}", path);
                    removed.push(path);
                }
                Err(e) => {
                    warn!("Failed to remove {:?}: {}", path, e);
                    if first_error.is_none() {
                        first_error = Some(e.context(format!("Failed to remove {:?}", path)));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    /// Apply persisted enable flags to `installed`, sorted by name.
    ///
    /// Packages missing from the list are enabled.
    pub fn merge_enablement(
        installed: Vec<InstalledPackage>,
        persisted: &ModList,
    ) -> Vec<InstalledPackage> {
        let mut merged: Vec<InstalledPackage> = installed
            .into_iter()
            .map(|mut package| {
                package.enabled = persisted.find(&package.name).is_none_or(|e| e.enabled);
                package
            })
            .collect();
        merged.sort_by(|a, b| a.name.cmp(&b.name));
        merged
    }

    /// Package files in the mod directory, in path order.
    ///
    /// Zips that do not follow `<name>_<version>.zip` are skipped.
    #[tracing::instrument(skip(self))]
    pub fn package_files(&self) -> Result<Vec<PackageFile>> {
        let paths = self.runtime.find(&self.mod_dir, "*_*.zip")?;
        Ok(paths
            .iter()
            .filter_map(|path| {
                let file_name = path.file_name()?.to_str()?;
                let parsed = PackageFile::parse(file_name);
                if parsed.is_none() {
                    debug!("Skipping {:?}: not a package file name", path);
                }
                parsed
            })
            .collect())
    }

    /// Read `info.json` out of a package zip in the mod directory.
    #[tracing::instrument(skip(self))]
    pub fn read_descriptor(&self, file_name: &str) -> Result<ModDescriptor> {
        let path = self.mod_dir.join(file_name);
        let bytes = self
            .runtime
            .read(&path)
            .with_context(|| format!("Failed to read package {:?}", path))?;
        let info = self
            .archive
            .read_entry(&bytes, DESCRIPTOR_ENTRY)
            .with_context(|| format!("Failed to open {}", file_name))?;
        serde_json::from_slice(&info)
            .with_context(|| format!("Failed to parse {} in {}", DESCRIPTOR_ENTRY, file_name))
    }

    /// Descriptors of every package file, sorted by name.
    pub fn read_descriptors(&self) -> Result<Vec<ModDescriptor>> {
        let mut descriptors = self
            .package_files()?
            .iter()
            .map(|f| self.read_descriptor(&f.file_name))
            .collect::<Result<Vec<_>>>()?;
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(descriptors)
    }

    /// Load the enable list, creating an empty one if it does not exist.
    #[tracing::instrument(skip(self))]
    pub fn load_mod_list(&self) -> Result<ModList> {
        let path = self.mod_list_path();
        if !self.runtime.exists(&path) {
            info!("Creating empty {:?}", path);
            let empty = ModList::default();
            self.save_mod_list(&empty)?;
            return Ok(empty);
        }

        let content = self.runtime.read_to_string(&path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    #[tracing::instrument(skip(self, list))]
    pub fn save_mod_list(&self, list: &ModList) -> Result<()> {
        if !self.runtime.exists(&self.mod_dir) {
            self.runtime.create_dir_all(&self.mod_dir)?;
        }
        let path = self.mod_list_path();
        let content = serde_json::to_string_pretty(list)?;
        self.runtime
            .write(&path, content.as_bytes())
            .with_context(|| format!("Failed to save mod list to {:?}", path))
    }

    /// Installed packages read from their descriptors, with enable flags applied.
    pub fn load_installed(&self) -> Result<Vec<InstalledPackage>> {
        let installed = self
            .read_descriptors()?
            .into_iter()
            .map(InstalledPackage::from)
            .collect();
        let list = self.load_mod_list()?;
        Ok(Self::merge_enablement(installed, &list))
    }

    /// Set the persisted flag for one package, adding an entry if needed.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut list = self.load_mod_list()?;
        list.set_enabled(name, enabled);
        self.save_mod_list(&list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MockArchiveReader;
    use crate::domain::model::{ModListEntry, Version};
    use crate::runtime::MockRuntime;
    use mockall::predicate::{always, eq};

    fn installed(name: &str) -> InstalledPackage {
        InstalledPackage {
            name: name.to_string(),
            version: Version::new(1, 0, 0),
            title: None,
            enabled: true,
        }
    }

    #[test]
    fn test_enforce_single_version_deletes_others() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime
            .expect_find()
            .with(eq(Path::new("/mods")), eq("mod_*.zip"))
            .returning(|_, _| {
                Ok(vec![
                    PathBuf::from("/mods/mod_1.0.0.zip"),
                    PathBuf::from("/mods/mod_1.1.0.zip"),
                ])
            });
        runtime
            .expect_remove_file()
            .with(eq(Path::new("/mods/mod_1.0.0.zip")))
            .times(1)
            .returning(|_| Ok(()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let removed = inventory
            .enforce_single_version("mod", "mod_1.1.0.zip", false)
            .unwrap();

        assert_eq!(removed, vec![PathBuf::from("/mods/mod_1.0.0.zip")]);
    }

    #[test]
    fn test_enforce_single_version_allow_multiple_is_noop() {
        let runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let removed = inventory
            .enforce_single_version("mod", "mod_1.1.0.zip", true)
            .unwrap();

        assert!(removed.is_empty());
    }

    #[test]
    fn test_enforce_single_version_spares_longer_names() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime.expect_find().returning(|_, _| {
            Ok(vec![
                PathBuf::from("/mods/bob_1.0.0.zip"),
                PathBuf::from("/mods/bob_logistics_0.15.2.zip"),
            ])
        });
        runtime.expect_remove_file().never();

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let removed = inventory
            .enforce_single_version("bob", "bob_1.0.0.zip", false)
            .unwrap();

        assert!(removed.is_empty());
    }

    #[test]
    fn test_enforce_single_version_escapes_glob_characters() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime
            .expect_find()
            .with(always(), eq("odd[[]mod[]]_*.zip"))
            .returning(|_, _| Ok(vec![]));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        inventory
            .enforce_single_version("odd[mod]", "odd[mod]_1.0.0.zip", false)
            .unwrap();
    }

    #[test_log::test]
    fn test_enforce_single_version_attempts_all_deletions() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime.expect_find().returning(|_, _| {
            Ok(vec![
                PathBuf::from("/mods/mod_1.0.0.zip"),
                PathBuf::from("/mods/mod_1.1.0.zip"),
                PathBuf::from("/mods/mod_1.2.0.zip"),
            ])
        });
        runtime
            .expect_remove_file()
            .with(eq(Path::new("/mods/mod_1.0.0.zip")))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("permission denied")));
        runtime
            .expect_remove_file()
            .with(eq(Path::new("/mods/mod_1.1.0.zip")))
            .times(1)
            .returning(|_| Ok(()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let err = inventory
            .enforce_single_version("mod", "mod_1.2.0.zip", false)
            .unwrap_err();

        assert!(err.to_string().contains("mod_1.0.0.zip"));
    }

    #[test]
    fn test_remove_matching_with_version() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime
            .expect_find()
            .with(eq(Path::new("/mods")), eq("Foreman_1.*.zip"))
            .returning(|_, _| Ok(vec![PathBuf::from("/mods/Foreman_1.1.5.zip")]));
        runtime.expect_remove_file().times(1).returning(|_| Ok(()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let removed = inventory.remove_matching("Foreman", Some("1.*")).unwrap();

        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn test_remove_matching_all_versions() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime
            .expect_find()
            .with(always(), eq("bob*_*.zip"))
            .returning(|_, _| Ok(vec![]));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        assert!(inventory.remove_matching("bob*", None).unwrap().is_empty());
    }

    #[test]
    fn test_merge_enablement() {
        let persisted = ModList {
            mods: vec![ModListEntry {
                name: "a".into(),
                enabled: false,
            }],
        };

        let merged = ModInventory::<MockRuntime>::merge_enablement(
            vec![installed("b"), installed("a")],
            &persisted,
        );

        let view: Vec<_> = merged.iter().map(|p| (p.name.as_str(), p.enabled)).collect();
        assert_eq!(view, vec![("a", false), ("b", true)]);
    }

    #[test]
    fn test_merge_enablement_sorts_case_sensitive() {
        let merged = ModInventory::<MockRuntime>::merge_enablement(
            vec![installed("beta"), installed("Zeta"), installed("alpha")],
            &ModList::default(),
        );

        let names: Vec<_> = merged.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "alpha", "beta"]);
    }

    #[test]
    fn test_package_files_skips_unparsable() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime
            .expect_find()
            .with(eq(Path::new("/mods")), eq("*_*.zip"))
            .returning(|_, _| {
                Ok(vec![
                    PathBuf::from("/mods/Foreman_1.1.5.zip"),
                    PathBuf::from("/mods/backup_old.zip"),
                ])
            });

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let files = inventory.package_files().unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Foreman");
        assert_eq!(files[0].version, Version::new(1, 1, 5));
    }

    #[test]
    fn test_read_descriptor() {
        let mut runtime = MockRuntime::new();
        let mut archive = MockArchiveReader::new();

        runtime
            .expect_read()
            .with(eq(Path::new("/mods/Foreman_1.1.5.zip")))
            .returning(|_| Ok(b"zip-bytes".to_vec()));
        archive
            .expect_read_entry()
            .withf(|bytes, entry| bytes == b"zip-bytes" && entry == "info.json")
            .returning(|_, _| Ok(br#"{"name":"Foreman","version":"1.1.5"}"#.to_vec()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let descriptor = inventory.read_descriptor("Foreman_1.1.5.zip").unwrap();

        assert_eq!(descriptor.name, "Foreman");
        assert_eq!(descriptor.version, Version::new(1, 1, 5));
    }

    #[test]
    fn test_read_descriptor_bad_json() {
        let mut runtime = MockRuntime::new();
        let mut archive = MockArchiveReader::new();

        runtime.expect_read().returning(|_| Ok(vec![]));
        archive
            .expect_read_entry()
            .returning(|_, _| Ok(b"not json".to_vec()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let err = inventory.read_descriptor("x_1.0.0.zip").unwrap_err();

        assert!(err.to_string().contains("Failed to parse info.json"));
    }

    #[test]
    fn test_load_mod_list_creates_missing_file() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime
            .expect_exists()
            .with(eq(Path::new("/mods/mod-list.json")))
            .returning(|_| false);
        runtime
            .expect_exists()
            .with(eq(Path::new("/mods")))
            .returning(|_| true);
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("/mods/mod-list.json")
                    && serde_json::from_slice::<serde_json::Value>(contents).unwrap()
                        == serde_json::json!({"mods": []})
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let list = inventory.load_mod_list().unwrap();

        assert!(list.mods.is_empty());
    }

    #[test]
    fn test_load_installed_merges_descriptors_and_list() {
        let mut runtime = MockRuntime::new();
        let mut archive = MockArchiveReader::new();

        runtime.expect_find().returning(|_, _| {
            Ok(vec![
                PathBuf::from("/mods/b_2.0.0.zip"),
                PathBuf::from("/mods/a_1.0.0.zip"),
            ])
        });
        runtime
            .expect_read()
            .returning(|path| Ok(path.to_string_lossy().into_owned().into_bytes()));
        archive.expect_read_entry().returning(|bytes, _| {
            let path = String::from_utf8(bytes.to_vec()).unwrap();
            let json = if path.ends_with("a_1.0.0.zip") {
                r#"{"name":"a","version":"1.0.0","title":"Alpha"}"#
            } else {
                r#"{"name":"b","version":"2.0.0"}"#
            };
            Ok(json.as_bytes().to_vec())
        });
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"mods":[{"name":"a","enabled":"false"}]}"#.to_string()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let installed = inventory.load_installed().unwrap();

        assert_eq!(installed.len(), 2);
        assert_eq!(installed[0].name, "a");
        assert_eq!(installed[0].title.as_deref(), Some("Alpha"));
        assert!(!installed[0].enabled);
        assert_eq!(installed[1].name, "b");
        assert!(installed[1].enabled);
    }

    #[test]
    fn test_set_enabled_appends_entry() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"mods":[{"name":"base","enabled":"true"}]}"#.to_string()));
        runtime
            .expect_write()
            .withf(|_, contents| {
                let list: ModList = serde_json::from_slice(contents).unwrap();
                list.mods.len() == 2 && list.find("Foreman").is_some_and(|e| !e.enabled)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        inventory.set_enabled("Foreman", false).unwrap();
    }

    #[test]
    fn test_write_package_creates_dir() {
        let mut runtime = MockRuntime::new();
        let archive = MockArchiveReader::new();

        runtime.expect_exists().returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(eq(Path::new("/mods")))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .with(eq(Path::new("/mods/mod_1.0.0.zip")), always())
            .times(1)
            .returning(|_, _| Ok(()));

        let inventory = ModInventory::new(&runtime, &archive, PathBuf::from("/mods"));
        let path = inventory.write_package("mod_1.0.0.zip", b"data").unwrap();

        assert_eq!(path, PathBuf::from("/mods/mod_1.0.0.zip"));
    }
}
