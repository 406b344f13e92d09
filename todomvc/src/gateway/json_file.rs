//! Gateway storing every todo in one JSON document.
//!
//! The document has the shape `{"todos": [...]}`. Each write rewrites the
//! whole file through a temporary sibling and a rename, so a crash mid-write
//! leaves the previous version intact.

use super::{GatewayError, GatewayFuture, PersistenceGateway};
use crate::types::{TodoId, TodoItem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(default)]
    todos: Vec<TodoItem>,
}

/// File-backed gateway
#[derive(Debug)]
pub struct JsonFileGateway {
    path: PathBuf,
    // Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonFileGateway {
    /// Create a gateway for the document at `path`
    ///
    /// The file does not need to exist yet; a missing file reads as empty.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> Result<TodoDocument, GatewayError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(TodoDocument::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Ok(TodoDocument::default())
            },
            Err(error) => Err(error.into()),
        }
    }

    async fn write(&self, document: &TodoDocument) -> Result<(), GatewayError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::trace!(path = %self.path.display(), todos = document.todos.len(), "Wrote todo document");
        Ok(())
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn save(&self, item: TodoItem) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            let mut document = self.read().await?;

            if let Some(existing) = document.todos.iter_mut().find(|t| t.id == item.id) {
                *existing = item;
            } else {
                document.todos.push(item);
            }

            self.write(&document).await
        })
    }

    fn delete(&self, id: TodoId) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            let mut document = self.read().await?;

            let before = document.todos.len();
            document.todos.retain(|t| t.id != id);
            if document.todos.len() == before {
                return Err(GatewayError::NotFound(id));
            }

            self.write(&document).await
        })
    }

    fn find(&self, id: TodoId) -> GatewayFuture<'_, Option<TodoItem>> {
        Box::pin(async move {
            let document = self.read().await?;
            Ok(document.todos.into_iter().find(|t| t.id == id))
        })
    }

    fn find_all(&self) -> GatewayFuture<'_, Vec<TodoItem>> {
        Box::pin(async move { Ok(self.read().await?.todos) })
    }
}
