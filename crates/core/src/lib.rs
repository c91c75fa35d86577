pub mod compile;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod layout;
pub mod names;
pub mod plan;
pub mod renditions;
pub mod responsive;
pub mod scene;

pub use compile::{CompiledRoot, Compiler};
pub use context::{ConfigError, ExportContext, ExportOptions, ExportSettings, ProbeThresholds};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{ExportError, IoError, SelectionError};
pub use export::{
    ExportOutput, ExportReport, LocalFileSystem, OutputFileSystem, Rasterizer, compile_export,
    run_export,
};
pub use names::{OptionKey, OptionSet, OptionValue, ParsedName, parse_name};
pub use plan::{ExportPlan, plan_export, select_by_name};
pub use renditions::{OutputTarget, RenditionManifest, RenditionRequest};
pub use responsive::{BoundsDrift, ResponsiveMap, ResponsiveParameter};
pub use scene::{DesignDocument, NodeId, NodeKind, SceneTree, SnapshotError};
