use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use certquest_game::KeyValueStore;
use log::debug;

/// Directory-backed [`KeyValueStore`]: one JSON file per key.
///
/// `quest/CC_INTRO_001` lands at `<root>/quest/CC_INTRO_001.json`. Path segments are
/// reduced to `[A-Za-z0-9_-]` so keys can never escape the root.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        let segments: Vec<String> = key
            .split('/')
            .filter(|s| !s.is_empty())
            .map(sanitize_segment)
            .collect();
        match segments.split_last() {
            Some((file, dirs)) => {
                for dir in dirs {
                    path.push(dir);
                }
                path.push(format!("{file}.json"));
            }
            None => path.push("_.json"),
        }
        path
    }
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KeyValueStore for FileStore {
    type Error = io::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write beside the target then rename so a crash never leaves half a document.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        debug!("wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }
}
