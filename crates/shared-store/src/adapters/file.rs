use super::lock::{DatabaseLock, LockError};
use super::{apply_batch, scan_prefix};
use crate::errors::KVStoreError;
use crate::ports::{BatchOperation, KeyValueStore, ScanResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

/// File-backed key-value store.
///
/// Keeps the full table in memory and rewrites the data file on every batch
/// (temp file + rename). The in-memory table only changes after the file
/// write succeeded, so a failed flush leaves both views on the old state.
///
/// File format: repeated `[key_len:u32 LE][key][value_len:u32 LE][value]`.
pub struct FileBackedKVStore {
    data: RwLock<Table>,
    path: PathBuf,
    _lock: DatabaseLock,
}

impl FileBackedKVStore {
    /// Open (or create) the store at `path`, taking the process lock.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();
        let lock = DatabaseLock::acquire(&path).map_err(|e| match e {
            LockError::AlreadyLocked { .. } => KVStoreError::Locked {
                message: e.to_string(),
            },
            other => KVStoreError::IOError {
                message: other.to_string(),
            },
        })?;

        let data = if path.exists() {
            let table = Self::load_from_file(&path)?;
            tracing::info!(path = %path.display(), keys = table.len(), "loaded store file");
            table
        } else {
            tracing::info!(path = %path.display(), "no existing store file, starting empty");
            Table::new()
        };

        Ok(Self {
            data: RwLock::new(data),
            path,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<Table, KVStoreError> {
        let mut file = std::fs::File::open(path).map_err(io_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error)?;

        let mut data = Table::new();
        let mut cursor = 0;
        while cursor < bytes.len() {
            let key = read_chunk(&bytes, &mut cursor)?;
            let value = read_chunk(&bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    fn save_to_file(&self, data: &Table) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let mut bytes = Vec::new();
        for (key, value) in data {
            write_chunk(&mut bytes, key)?;
            write_chunk(&mut bytes, value)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_prefix(&self.data.read(), prefix))
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut data = self.data.write();
        let mut next = data.clone();
        apply_batch(&mut next, operations)?;
        self.save_to_file(&next)?;
        *data = next;
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let truncated = || KVStoreError::CorruptionError {
        message: format!("truncated store file at offset {}", cursor),
    };
    let len_end = cursor.checked_add(4).filter(|end| *end <= bytes.len());
    let len_end = len_end.ok_or_else(truncated)?;
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[*cursor..len_end]);
    let len = u32::from_le_bytes(len_bytes) as usize;

    let end = len_end
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(truncated)?;
    let chunk = bytes[len_end..end].to_vec();
    *cursor = end;
    Ok(chunk)
}

fn write_chunk(out: &mut Vec<u8>, chunk: &[u8]) -> Result<(), KVStoreError> {
    let len = u32::try_from(chunk.len()).map_err(|_| KVStoreError::SerializationError {
        message: format!("entry of {} bytes exceeds the file format limit", chunk.len()),
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(chunk);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.db");

        {
            let store = FileBackedKVStore::open(&path).unwrap();
            store
                .atomic_batch_write(vec![
                    BatchOperation::put(b"reg:1".to_vec(), b"{\"code\":\"R1\"}".to_vec()),
                    BatchOperation::put(b"reg:2".to_vec(), Vec::new()),
                ])
                .unwrap();
        }

        let store = FileBackedKVStore::open(&path).unwrap();
        assert_eq!(
            store.get(b"reg:1").unwrap(),
            Some(b"{\"code\":\"R1\"}".to_vec())
        );
        assert_eq!(store.get(b"reg:2").unwrap(), Some(Vec::new()));
        assert_eq!(store.prefix_scan(b"reg:").unwrap().len(), 2);
    }

    #[test]
    fn test_rejected_batch_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.db");

        {
            let store = FileBackedKVStore::open(&path).unwrap();
            store
                .atomic_batch_write(vec![BatchOperation::put(b"a".to_vec(), b"1".to_vec())])
                .unwrap();
            let result = store.atomic_batch_write(vec![
                BatchOperation::expect_absent(b"a".to_vec()),
                BatchOperation::put(b"b".to_vec(), b"2".to_vec()),
            ]);
            assert!(result.is_err());
        }

        let store = FileBackedKVStore::open(&path).unwrap();
        assert!(!store.exists(b"b").unwrap());
    }

    #[test]
    fn test_second_open_is_locked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.db");

        let _store = FileBackedKVStore::open(&path).unwrap();
        let second = FileBackedKVStore::open(&path);
        assert!(matches!(second, Err(KVStoreError::Locked { .. })));
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core.db");
        std::fs::write(&path, [5u8, 0, 0, 0, b'a']).unwrap();

        let result = FileBackedKVStore::open(&path);
        assert!(matches!(result, Err(KVStoreError::CorruptionError { .. })));
    }
}
