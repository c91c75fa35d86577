use std::sync::Mutex;

use baumkit_core::{
    ExportContext, ExportError, ExportSettings, RenditionRequest, SceneTree, SnapshotError,
    compile_export, parse_name,
};
use baumkit_protocol::LayoutDocument;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;

static DOCUMENTS: Mutex<Vec<Option<SceneTree>>> = Mutex::new(Vec::new());

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("invalid document handle {0}")]
    InvalidHandle(usize),
    #[error("document store poisoned")]
    Poisoned,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportResult<'a> {
    documents: Vec<DocumentEntry<'a>>,
    /// The plug-in rasterizes these itself, as one batch.
    renditions: &'a [RenditionRequest],
    diagnostics: Vec<String>,
    drift: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentEntry<'a> {
    name: &'a str,
    folder: &'a str,
    file: String,
    layout: &'a LayoutDocument,
}

#[derive(Serialize)]
struct ParsedLabel {
    name: String,
    options: String,
}

fn settings_from_json(settings_json: &str) -> Result<ExportSettings, BridgeError> {
    if settings_json.trim().is_empty() {
        return Ok(ExportSettings::default());
    }
    Ok(serde_json::from_str(settings_json)?)
}

/// Compile every export root of `tree` and describe the result as JSON.
///
/// Nothing is written; the caller owns the filesystem and the renderer.
pub fn export_tree(tree: &mut SceneTree, settings_json: &str) -> Result<String, BridgeError> {
    let settings = settings_from_json(settings_json)?;
    let ctx = ExportContext::from_settings(&settings).map_err(ExportError::from)?;
    let output = compile_export(tree, &[], &ctx).map_err(ExportError::from)?;

    let result = ExportResult {
        documents: output
            .roots
            .iter()
            .map(|root| DocumentEntry {
                name: &root.name,
                folder: &root.folder,
                file: root.layout_file_name(),
                layout: &root.document,
            })
            .collect(),
        renditions: output.manifest.requests(),
        diagnostics: output.diagnostics.iter().map(ToString::to_string).collect(),
        drift: output.drift.as_ref().map(ToString::to_string),
    };
    Ok(serde_json::to_string(&result)?)
}

/// Load a snapshot. Returns a handle for [`export_document`].
#[wasm_bindgen]
pub fn load_snapshot(data: &[u8]) -> Result<usize, JsError> {
    let tree = SceneTree::from_json(data).map_err(BridgeError::from)?;
    let mut documents = DOCUMENTS.lock().map_err(|_| BridgeError::Poisoned)?;
    documents.push(Some(tree));
    Ok(documents.len() - 1)
}

/// Export a loaded snapshot with the given settings JSON (empty for
/// defaults). The probe resizes the stored document in place and restores it.
#[wasm_bindgen]
pub fn export_document(handle: usize, settings_json: &str) -> Result<String, JsError> {
    let mut documents = DOCUMENTS.lock().map_err(|_| BridgeError::Poisoned)?;
    let tree = documents
        .get_mut(handle)
        .and_then(Option::as_mut)
        .ok_or(BridgeError::InvalidHandle(handle))?;
    Ok(export_tree(tree, settings_json)?)
}

/// Drop a loaded snapshot. Returns whether the handle was live.
#[wasm_bindgen]
pub fn release_snapshot(handle: usize) -> bool {
    let Ok(mut documents) = DOCUMENTS.lock() else {
        return false;
    };
    documents
        .get_mut(handle)
        .and_then(Option::take)
        .is_some()
}

/// One-shot load and export.
#[wasm_bindgen]
pub fn compile_snapshot(data: &[u8], settings_json: &str) -> Result<String, JsError> {
    let mut tree = SceneTree::from_json(data).map_err(BridgeError::from)?;
    Ok(export_tree(&mut tree, settings_json)?)
}

/// Parse a layer label the way the exporter does, as JSON
/// `{"name": ..., "options": ...}`.
#[wasm_bindgen]
pub fn parse_layout_name(label: &str, in_grid: bool) -> String {
    let parsed = parse_name(label, in_grid, true);
    let label = ParsedLabel {
        name: parsed.name,
        options: parsed.options.to_string(),
    };
    serde_json::to_string(&label).unwrap_or_default()
}
