use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::compile::{CompiledRoot, Compiler};
use crate::context::ExportContext;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ExportError, IoError, SelectionError};
use crate::plan::plan_export;
use crate::renditions::{RenditionManifest, RenditionRequest};
use crate::responsive::{BoundsDrift, ResponsiveMap};
use crate::scene::{DesignDocument, NodeId};

/// Where layout documents and image folders are written.
#[async_trait]
pub trait OutputFileSystem: Send + Sync {
    /// Create `name` under the output root if it does not exist yet,
    /// creating the root itself when it is missing.
    async fn ensure_folder(&self, name: &str) -> Result<(), IoError>;

    /// Create or overwrite `name` under the output root.
    async fn write_text(&self, name: &str, contents: &str) -> Result<(), IoError>;
}

/// Produces bitmap files for a batch of rendition requests.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Returns how many files were produced.
    async fn create_renditions(&self, requests: &[RenditionRequest]) -> Result<usize, IoError>;
}

/// [`OutputFileSystem`] over a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl OutputFileSystem for LocalFileSystem {
    async fn ensure_folder(&self, name: &str) -> Result<(), IoError> {
        let path = self.root.join(name);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| IoError::fs(path.display().to_string(), e))
    }

    async fn write_text(&self, name: &str, contents: &str) -> Result<(), IoError> {
        let path = self.root.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| IoError::fs(path.display().to_string(), e))
    }
}

/// Everything a run produced before touching any collaborator.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub roots: Vec<CompiledRoot>,
    pub manifest: RenditionManifest,
    pub responsive: ResponsiveMap,
    pub diagnostics: Diagnostics,
    pub drift: Option<BoundsDrift>,
}

/// Outcome of [`run_export`].
#[derive(Debug)]
pub struct ExportReport {
    /// Layout files written, in export order.
    pub documents: Vec<String>,
    /// Rendition requests in the batch.
    pub renditions: usize,
    /// Files the rasterizer reported as produced.
    pub rasterized: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub drift: Option<BoundsDrift>,
}

/// Plan, probe and compile every export root under `selection`.
///
/// The responsive probe resizes artboards in `doc` and puts them back; a
/// mismatch is returned as `drift` and logged once.
pub fn compile_export<D: DesignDocument>(
    doc: &mut D,
    selection: &[NodeId],
    ctx: &ExportContext,
) -> Result<ExportOutput, SelectionError> {
    let plan = plan_export(doc, selection, &ctx.options)?;

    let mut responsive = ResponsiveMap::new();
    if ctx.options.responsive_parameters {
        for &artboard in &plan.probe_artboards {
            responsive.extend(ResponsiveMap::probe(doc, artboard, &ctx.thresholds));
        }
    }
    let drift = responsive.verify_restored().err();
    if let Some(drift) = &drift {
        tracing::warn!("{drift}");
        for node in &drift.nodes {
            tracing::warn!(
                name = %node.name,
                before = ?node.before,
                restore = ?node.restore,
                "bounds drift"
            );
        }
    }

    let doc: &D = doc;
    let mut manifest = RenditionManifest::new();
    let mut diagnostics = Diagnostics::new();
    let roots = {
        let mut compiler = Compiler::new(doc, ctx, &responsive, &mut manifest, &mut diagnostics);
        plan.root_ids()
            .map(|root| compiler.compile_root(root))
            .collect()
    };

    Ok(ExportOutput {
        roots,
        manifest,
        responsive,
        diagnostics,
        drift,
    })
}

/// Full export: compile, write one layout file per root, then flush the
/// rendition batch.
///
/// Selection errors abort before anything is written. Write and rasterizer
/// failures are recorded as diagnostics and the run carries on.
pub async fn run_export<D, F, R>(
    doc: &mut D,
    selection: &[NodeId],
    ctx: &ExportContext,
    fs: &F,
    rasterizer: &R,
) -> Result<ExportReport, ExportError>
where
    D: DesignDocument,
    F: OutputFileSystem + ?Sized,
    R: Rasterizer + ?Sized,
{
    let ExportOutput {
        roots,
        manifest,
        mut diagnostics,
        drift,
        ..
    } = compile_export(doc, selection, ctx)?;

    let mut documents = Vec::with_capacity(roots.len());
    for root in &roots {
        if let Err(e) = fs.ensure_folder(&root.folder).await {
            diagnostics.push(Diagnostic::WriteFailed {
                file: root.folder.clone(),
                reason: e.to_string(),
            });
        }

        let file = root.layout_file_name();
        let written = match root.document.to_pretty_json() {
            Ok(json) => fs.write_text(&file, &json).await,
            Err(e) => Err(IoError::from(e)),
        };
        match written {
            Ok(()) => {
                tracing::info!(file = %file, "wrote layout");
                documents.push(file);
            }
            Err(e) => diagnostics.push(Diagnostic::WriteFailed {
                file,
                reason: e.to_string(),
            }),
        }
    }

    let mut rasterized = 0;
    if !manifest.is_empty() {
        match rasterizer.create_renditions(manifest.requests()).await {
            Ok(count) => {
                tracing::info!("saved {count} files");
                rasterized = count;
            }
            Err(e) => diagnostics.push(Diagnostic::RasterizeFailed {
                requests: manifest.len(),
                reason: e.to_string(),
            }),
        }
    }

    Ok(ExportReport {
        documents,
        renditions: manifest.len(),
        rasterized,
        diagnostics: diagnostics.into_vec(),
        drift,
    })
}
