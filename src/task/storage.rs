#![forbid(unsafe_code)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::error::TodosError;
use crate::task::model::Task;

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    saved_at: Option<String>,
    tasks: Vec<StoredTask>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTask {
    description: String,
    done: bool,
}

/// Load/save boundary for the task list. Holds no task data itself.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    pretty: bool,
}

impl Repository {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path, pretty: true }
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the store contents with `tasks`, via a temp file and rename.
    pub fn save(&self, tasks: &[Task]) -> Result<(), TodosError> {
        let file = StoreFile {
            version: STORE_VERSION,
            saved_at: now_rfc3339(),
            tasks: tasks
                .iter()
                .map(|t| StoredTask {
                    description: t.description.clone(),
                    done: t.done,
                })
                .collect(),
        };
        let data = if self.pretty {
            serde_json::to_vec_pretty(&file)
        } else {
            serde_json::to_vec(&file)
        }
        .map_err(TodosError::Serialize)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| TodosError::StoreWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = self.tmp_path();
        if let Err(source) = std::fs::write(&tmp, &data) {
            let _ = std::fs::remove_file(&tmp);
            return Err(TodosError::StoreWrite { path: tmp, source });
        }
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(TodosError::StoreWrite {
                path: self.path.clone(),
                source,
            });
        }
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Loads the task list. A missing store is an empty list, not an error.
    pub fn load(&self) -> Result<Vec<Task>, TodosError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no task store yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(TodosError::StoreRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let file: StoreFile =
            serde_json::from_slice(&data).map_err(|source| TodosError::StoreCorrupt {
                path: self.path.clone(),
                source,
            })?;
        if file.version > STORE_VERSION {
            return Err(TodosError::UnsupportedStoreVersion {
                path: self.path.clone(),
                found: file.version,
            });
        }

        let tasks: Vec<Task> = file
            .tasks
            .into_iter()
            .enumerate()
            .map(|(i, t)| Task::new(i + 1, t.description, t.done))
            .collect();
        debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn now_rfc3339() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}
