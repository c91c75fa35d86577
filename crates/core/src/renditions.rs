use std::collections::HashSet;

use serde::Serialize;

use crate::names::sanitize_file_name;
use crate::scene::NodeId;

/// Characters of the node id appended to a colliding file name.
const GUID_FRAGMENT_LEN: usize = 5;

/// Where a rasterized bitmap should land, relative to the output folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTarget {
    pub folder: String,
    pub file_name: String,
}

impl OutputTarget {
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.folder, self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenditionRequest {
    /// Unique within one export run; also the `image` field of the element.
    pub file_name: String,
    #[serde(skip)]
    pub node: NodeId,
    /// Host id of the node to rasterize.
    #[serde(rename = "node")]
    pub guid: String,
    pub target: OutputTarget,
    pub scale: f64,
}

/// Every bitmap queued during one export, flushed as a single batch.
#[derive(Debug, Clone, Default)]
pub struct RenditionManifest {
    requests: Vec<RenditionRequest>,
    taken: HashSet<String>,
}

impl RenditionManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `node` for rasterization and return its file name (without
    /// extension).
    ///
    /// The name is `<parent label> - <role label>`; on collision a fragment of
    /// the node id is appended, then a counter if that still collides.
    pub fn register(
        &mut self,
        node: NodeId,
        guid: &str,
        parent_label: &str,
        role_label: &str,
        folder: &str,
        scale: f64,
    ) -> String {
        let base = sanitize_file_name(&format!("{parent_label} - {role_label}"), true);
        let mut file_name = base.clone();
        if self.taken.contains(&file_name) {
            let fragment: String = guid.chars().take(GUID_FRAGMENT_LEN).collect();
            file_name = sanitize_file_name(&format!("{base}_{fragment}"), true);
            let stem = file_name.clone();
            let mut n = 2;
            while self.taken.contains(&file_name) {
                file_name = format!("{stem}_{n}");
                n += 1;
            }
        }

        self.taken.insert(file_name.clone());
        self.requests.push(RenditionRequest {
            file_name: file_name.clone(),
            node,
            guid: guid.to_string(),
            target: OutputTarget {
                folder: folder.to_string(),
                file_name: format!("{file_name}.png"),
            },
            scale,
        });
        file_name
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.taken.contains(file_name)
    }

    pub fn requests(&self) -> &[RenditionRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
