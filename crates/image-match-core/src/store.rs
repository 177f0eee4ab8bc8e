//! Persisted descriptor database.
//!
//! Each dataset directory holds one `csd_<kind>.json` file per descriptor
//! kind. The file is a JSON array of `{"path": ..., "descriptor": [...]}`
//! entries; every descriptor in a file has the file's kind.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::descriptor::{Descriptor, DescriptorKind};
use crate::error::StoreError;
use crate::types::DescriptorRecord;

const FILE_PREFIX: &str = "csd_";
const FILE_SUFFIX: &str = ".json";

#[derive(Deserialize)]
struct StoredEntry {
    path: String,
    descriptor: Vec<f32>,
}

#[derive(Serialize)]
struct StoredEntryRef<'a> {
    path: &'a str,
    descriptor: &'a [f32],
}

/// In-memory view of one store file.
#[derive(Debug)]
pub struct DescriptorStore {
    path: PathBuf,
    kind: DescriptorKind,
    records: Vec<DescriptorRecord>,
    identifiers: HashSet<String>,
}

impl DescriptorStore {
    /// File name used for stores of `kind`.
    pub fn file_name(kind: DescriptorKind) -> String {
        format!("{FILE_PREFIX}{}{FILE_SUFFIX}", kind.as_u16())
    }

    /// Location of the `kind` store inside `dataset`.
    pub fn path_for(dataset: &Path, kind: DescriptorKind) -> PathBuf {
        dataset.join(Self::file_name(kind))
    }

    /// Parse a store file name back into its kind.
    pub fn kind_from_file_name(name: &str) -> Option<DescriptorKind> {
        let number = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        number.parse::<i64>().ok()?.try_into().ok()
    }

    /// A new, empty store that will be written to the `kind` file of `dataset`.
    ///
    /// Used for forced regeneration: whatever the file held is replaced on
    /// the next [`persist`](Self::persist).
    pub fn empty(dataset: &Path, kind: DescriptorKind) -> Self {
        Self {
            path: Self::path_for(dataset, kind),
            kind,
            records: Vec::new(),
            identifiers: HashSet::new(),
        }
    }

    /// Load the `kind` store of `dataset`, or start empty if it does not exist yet.
    pub fn open(dataset: &Path, kind: DescriptorKind) -> Result<Self, StoreError> {
        let path = Self::path_for(dataset, kind);
        if path.is_file() {
            Self::load(&path, kind)
        } else {
            tracing::debug!("No existing database at {}", path.display());
            Ok(Self::empty(dataset, kind))
        }
    }

    /// Find the store file to match against.
    ///
    /// With an explicit kind the corresponding file must exist. Without
    /// one, the dataset must contain exactly one store file.
    pub fn locate(
        dataset: &Path,
        kind: Option<DescriptorKind>,
    ) -> Result<(PathBuf, DescriptorKind), StoreError> {
        if let Some(kind) = kind {
            let path = Self::path_for(dataset, kind);
            return if path.is_file() {
                Ok((path, kind))
            } else {
                Err(StoreError::NotFound {
                    dir: dataset.to_path_buf(),
                })
            };
        }

        let entries = std::fs::read_dir(dataset).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound {
                dir: dataset.to_path_buf(),
            },
            _ => StoreError::Read {
                path: dataset.to_path_buf(),
                source: e,
            },
        })?;

        let mut found: Vec<(PathBuf, DescriptorKind)> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| {
                let kind = Self::kind_from_file_name(e.file_name().to_str()?)?;
                Some((e.path(), kind))
            })
            .collect();
        found.sort_by_key(|(_, kind)| *kind);

        match found.len() {
            0 => Err(StoreError::NotFound {
                dir: dataset.to_path_buf(),
            }),
            1 => Ok(found.remove(0)),
            _ => Err(StoreError::Ambiguous {
                dir: dataset.to_path_buf(),
                kinds: found
                    .iter()
                    .map(|(_, k)| k.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Load and validate a store file of the given kind.
    pub fn load(path: &Path, kind: DescriptorKind) -> Result<Self, StoreError> {
        tracing::info!("Loading database {}", path.display());

        let file = File::open(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let malformed = |message: String| StoreError::Malformed {
            path: path.to_path_buf(),
            message,
        };

        let entries: Vec<StoredEntry> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| malformed(e.to_string()))?;

        let mut store = Self {
            path: path.to_path_buf(),
            kind,
            records: Vec::with_capacity(entries.len()),
            identifiers: HashSet::with_capacity(entries.len()),
        };

        for (index, entry) in entries.into_iter().enumerate() {
            if entry.descriptor.iter().any(|v| !v.is_finite()) {
                return Err(malformed(format!(
                    "entry {index} ({}) has non-finite values",
                    entry.path
                )));
            }
            let descriptor = Descriptor::new(kind, entry.descriptor)
                .map_err(|e| malformed(format!("entry {index} ({}): {e}", entry.path)))?;
            if store.identifiers.contains(&entry.path) {
                return Err(malformed(format!("duplicate entry for {}", entry.path)));
            }
            store.insert(DescriptorRecord::new(entry.path, descriptor));
        }

        tracing::debug!("Loaded {} descriptors", store.len());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn records(&self) -> &[DescriptorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record for this identifier is already stored.
    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    /// Add new records, ignoring identifiers that are already present.
    ///
    /// Returns the number of records actually added.
    pub fn append(
        &mut self,
        records: impl IntoIterator<Item = DescriptorRecord>,
    ) -> Result<usize, StoreError> {
        let mut added = 0;
        for record in records {
            if record.descriptor.kind() != self.kind {
                return Err(StoreError::Malformed {
                    path: self.path.clone(),
                    message: format!(
                        "cannot add a {}-bin descriptor to a {}-bin database",
                        record.descriptor.kind(),
                        self.kind
                    ),
                });
            }
            if self.contains_identifier(&record.identifier) {
                tracing::debug!("Already stored: {}", record.identifier);
                continue;
            }
            self.insert(record);
            added += 1;
        }
        Ok(added)
    }

    /// Write the store to disk as a compact JSON array.
    ///
    /// Data goes to a sibling temporary file first and is renamed into
    /// place, so an interrupted write leaves the previous file intact.
    pub fn persist(&self) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let tmp_path = self.path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);

        let entries: Vec<StoredEntryRef<'_>> = self
            .records
            .iter()
            .map(|r| StoredEntryRef {
                path: &r.identifier,
                descriptor: r.descriptor.values(),
            })
            .collect();
        serde_json::to_writer(&mut writer, &entries)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        tracing::info!(
            "Wrote {} descriptors to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Consume the store, yielding its records.
    pub fn into_records(self) -> Vec<DescriptorRecord> {
        self.records
    }

    fn insert(&mut self, record: DescriptorRecord) {
        self.identifiers.insert(record.identifier.clone());
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, kind: DescriptorKind, hot: usize) -> DescriptorRecord {
        let mut values = vec![0.0; kind.bins()];
        values[hot] = 1.0;
        DescriptorRecord::new(path, Descriptor::new(kind, values).unwrap())
    }

    #[test]
    fn test_file_names() {
        assert_eq!(DescriptorStore::file_name(DescriptorKind::Bin128), "csd_128.json");
        assert_eq!(
            DescriptorStore::kind_from_file_name("csd_64.json"),
            Some(DescriptorKind::Bin64)
        );
        assert_eq!(DescriptorStore::kind_from_file_name("csd_48.json"), None);
        assert_eq!(DescriptorStore::kind_from_file_name("csd_64.toml"), None);
        assert_eq!(DescriptorStore::kind_from_file_name("other.json"), None);
    }

    #[test]
    fn test_open_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DescriptorStore::open(dir.path(), DescriptorKind::Bin32).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.path(), dir.path().join("csd_32.json"));
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let kind = DescriptorKind::Bin64;

        let mut store = DescriptorStore::empty(dir.path(), kind);
        let added = store
            .append(vec![record("/d/a.png", kind, 3), record("/d/b.png", kind, 9)])
            .unwrap();
        assert_eq!(added, 2);
        store.persist().unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[{\"path\":\"/d/a.png\",\"descriptor\":["));
        assert!(!raw.contains('\n'));

        let loaded = DescriptorStore::open(dir.path(), kind).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains_identifier("/d/b.png"));
        assert!(!loaded.contains_identifier("/d/c.png"));
        assert_eq!(loaded.records(), store.records());
    }

    #[test]
    fn test_append_skips_known_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let kind = DescriptorKind::Bin32;
        let mut store = DescriptorStore::empty(dir.path(), kind);
        store.append(vec![record("/x.png", kind, 0)]).unwrap();

        let added = store
            .append(vec![record("/x.png", kind, 1), record("/y.png", kind, 2)])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.len(), 2);
        // The original record wins.
        assert_eq!(store.records()[0].descriptor.values()[0], 1.0);
    }

    #[test]
    fn test_append_rejects_other_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DescriptorStore::empty(dir.path(), DescriptorKind::Bin32);
        let err = store
            .append(vec![record("/x.png", DescriptorKind::Bin64, 0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn test_load_rejects_wrong_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csd_32.json");
        std::fs::write(&path, r#"[{"path":"/a.png","descriptor":[0.5,0.5]}]"#).unwrap();

        let err = DescriptorStore::load(&path, DescriptorKind::Bin32).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn test_load_rejects_bad_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csd_32.json");

        for body in [
            r#"{"path":"/a.png"}"#,
            r#"[{"descriptor":[]}]"#,
            r#"[{"path":"/a.png","descriptor":["x"]}]"#,
            "not json",
        ] {
            std::fs::write(&path, body).unwrap();
            let err = DescriptorStore::load(&path, DescriptorKind::Bin32).unwrap_err();
            assert!(matches!(err, StoreError::Malformed { .. }), "body: {body}");
        }
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let kind = DescriptorKind::Bin32;
        let zeros = serde_json::to_string(&vec![0.0f32; 32]).unwrap();
        let body = format!(
            r#"[{{"path":"/a.png","descriptor":{zeros}}},{{"path":"/a.png","descriptor":{zeros}}}]"#
        );
        let path = dir.path().join("csd_32.json");
        std::fs::write(&path, body).unwrap();

        let err = DescriptorStore::load(&path, kind).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_locate() {
        let dir = tempfile::tempdir().unwrap();
        let err = DescriptorStore::locate(dir.path(), None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        std::fs::write(dir.path().join("csd_64.json"), "[]").unwrap();
        std::fs::write(dir.path().join("csd_99.json"), "[]").unwrap();
        let (path, kind) = DescriptorStore::locate(dir.path(), None).unwrap();
        assert_eq!(kind, DescriptorKind::Bin64);
        assert!(path.ends_with("csd_64.json"));

        std::fs::write(dir.path().join("csd_256.json"), "[]").unwrap();
        let err = DescriptorStore::locate(dir.path(), None).unwrap_err();
        match err {
            StoreError::Ambiguous { kinds, .. } => assert_eq!(kinds, "64, 256"),
            other => panic!("unexpected error: {other}"),
        }

        let (_, kind) = DescriptorStore::locate(dir.path(), Some(DescriptorKind::Bin256)).unwrap();
        assert_eq!(kind, DescriptorKind::Bin256);
        let err = DescriptorStore::locate(dir.path(), Some(DescriptorKind::Bin32)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
