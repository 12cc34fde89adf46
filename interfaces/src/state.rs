use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::defs::PostId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("processed-post file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("processed-post file I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Post ids that have already been handled, persisted as a JSON array.
///
/// The in-memory order is the order ids were marked. Every mark rewrites the
/// whole file through a temporary file and a rename, so the file on disk is
/// always a complete snapshot: a crash either leaves the previous snapshot or
/// the new one, never a torn write.
#[derive(Debug)]
pub struct ProcessedSet {
    path: PathBuf,
    order: Vec<PostId>,
    members: HashSet<PostId>,
}

impl ProcessedSet {
    /// Loads the set from `path`. A missing or empty file is an empty set.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No processed-post file at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let ids: Vec<PostId> = if data.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            serde_json::from_slice(&data).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?
        };

        let mut set = Self {
            path,
            order: Vec::with_capacity(ids.len()),
            members: HashSet::with_capacity(ids.len()),
        };
        for id in ids {
            if set.members.insert(id) {
                set.order.push(id);
            } else {
                warn!("Duplicate post id {} in {}, ignoring", id, set.path.display());
            }
        }

        info!("Loaded {} processed post ids from {}", set.len(), set.path.display());
        Ok(set)
    }

    pub fn contains(&self, id: PostId) -> bool {
        self.members.contains(&id)
    }

    /// Records `id` and rewrites the file before returning.
    ///
    /// Returns `false` without touching the file when `id` was already present.
    pub fn mark_processed(&mut self, id: PostId) -> Result<bool, StoreError> {
        if self.members.contains(&id) {
            return Ok(false);
        }

        self.order.push(id);
        self.members.insert(id);

        if let Err(e) = self.persist() {
            // Roll back so memory never claims more than the disk holds.
            self.order.pop();
            self.members.remove(&id);
            return Err(e);
        }

        debug!("Marked post {} as processed", id);
        Ok(true)
    }

    pub fn ids(&self) -> &[PostId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let tmp_path = {
            let mut os = self.path.clone().into_os_string();
            os.push(".tmp");
            PathBuf::from(os)
        };

        let encoded = serde_json::to_vec(&self.order).map_err(io::Error::from)?;

        let mut file = File::create(&tmp_path)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        sync_parent_dir(&self.path)?;
        Ok(())
    }
}

// Makes the rename itself durable.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
