//! FileStore - ディレクトリに key ごとのファイルを置く KeyValueStore
//!
//! `set` は一時ファイルに書いて fsync してから rename する。
//! 途中でクラッシュしても、読めるのは旧い値か新しい値のどちらかだけ。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::StoreError;
use crate::ports::KeyValueStore;

/// FileStore はファイルシステム上の KeyValueStore
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// `dir` を（なければ作って）ストアとして開く
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::Unavailable(format!(
                "key {key:?} is not a valid file name"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// rename をディレクトリエントリごと永続化する
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

// Windows ではディレクトリを開いて fsync できない
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)?;
            sync_dir(&self.dir)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(match e.kind() {
                io::ErrorKind::StorageFull => StoreError::Full {
                    needed: value.len(),
                    capacity: 0,
                },
                _ => StoreError::Io(e),
            });
        }
        Ok(())
    }
}
