use std::path::PathBuf;

use async_trait::async_trait;
use baumkit_core::{IoError, Rasterizer, RenditionRequest};

/// File the rendition batch is written to, under the output root.
pub const MANIFEST_FILE: &str = "renditions.json";

/// Stand-in rasterizer for hosts without a renderer: writes the batch to
/// [`MANIFEST_FILE`] so a design-tool plug-in can produce the bitmaps later.
#[derive(Debug, Clone)]
pub struct ManifestRasterizer {
    root: PathBuf,
}

impl ManifestRasterizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Rasterizer for ManifestRasterizer {
    async fn create_renditions(&self, requests: &[RenditionRequest]) -> Result<usize, IoError> {
        for request in requests {
            tracing::debug!(node = %request.guid, path = %request.target.relative_path(), "queued");
        }
        let json = serde_json::to_string_pretty(requests)?;
        let path = self.root.join(MANIFEST_FILE);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| IoError::fs(path.display().to_string(), e))?;
        Ok(requests.len())
    }
}
