use thiserror::Error;

/// Non-fatal anomaly found while exporting. The surrounding output is still
/// produced in a best-effort shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("{element}: no Area child found")]
    MissingArea { element: String },
    #[error("{node}: unknown node kind {kind:?}")]
    UnknownKind { node: String, kind: String },
    #[error("{node}: scroller has neither an Area child nor a repeated grid")]
    ScrollerWithoutGrid { node: String },
    #[error("failed to write {file}: {reason}")]
    WriteFailed { file: String, reason: String },
    #[error("rendition batch of {requests} image(s) failed: {reason}")]
    RasterizeFailed { requests: usize, reason: String },
}

impl Diagnostic {
    /// Raised by the filesystem or rasterization collaborator rather than by
    /// the document itself.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::WriteFailed { .. } | Self::RasterizeFailed { .. })
    }
}

/// Ordered collection of everything that went wrong without stopping the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log: collaborator failures at `error`, the rest at `warn`.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_io() {
            tracing::error!("{diagnostic}");
        } else {
            tracing::warn!("{diagnostic}");
        }
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
