//! File drop adapter for [`DocumentDelivery`]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_milestone::{DocumentDelivery, OutboundDocument};

/// Delivers batches as files under a root folder
#[derive(Debug, Clone)]
pub struct FileDropDelivery {
    root: PathBuf,
}

impl FileDropDelivery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path of a document
    pub fn path_for(&self, document: &OutboundDocument) -> Result<PathBuf, PortError> {
        ensure_plain_name("folder", &document.folder)?;
        ensure_plain_name("file_name", &document.file_name)?;
        Ok(self.root.join(&document.folder).join(&document.file_name))
    }
}

/// Folder and file names must be single path components
fn ensure_plain_name(field: &str, name: &str) -> Result<(), PortError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(PortError::validation_field(
            format!("'{}' is not a valid {} name", name, field),
            field,
        ));
    }
    Ok(())
}

impl DomainPort for FileDropDelivery {}

#[async_trait]
impl DocumentDelivery for FileDropDelivery {
    #[instrument(skip(self, document), fields(folder = %document.folder, file = %document.file_name))]
    async fn deliver(&self, document: &OutboundDocument) -> Result<(), PortError> {
        let target = self.path_for(document)?;
        let folder = self.root.join(&document.folder);
        let destination = target.display().to_string();

        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| PortError::write_failed(folder.display().to_string(), e))?;

        let staging = folder.join(format!(".{}.tmp", document.file_name));
        tokio::fs::write(&staging, &document.content)
            .await
            .map_err(|e| PortError::write_failed(destination.clone(), e))?;
        debug!(bytes = document.content.len(), "Batch staged");

        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(PortError::write_failed(destination, e));
        }

        info!(path = %target.display(), "Batch delivered");
        Ok(())
    }
}

#[async_trait]
impl HealthCheckable for FileDropDelivery {
    /// Healthy when the drop root exists and is a directory
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = tokio::fs::metadata(&self.root).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(meta) if meta.is_dir() => (AdapterHealth::Healthy, None),
            Ok(_) => (
                AdapterHealth::Unhealthy,
                Some(format!("{} is not a directory", self.root.display())),
            ),
            Err(e) => (
                AdapterHealth::Unhealthy,
                Some(format!("{}: {}", self.root.display(), e)),
            ),
        };

        HealthCheckResult {
            adapter_id: "file-drop-delivery".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}
