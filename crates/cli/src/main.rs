mod rasterizer;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use baumkit_core::context::ScaleInput;
use baumkit_core::{
    DesignDocument, ExportContext, ExportError, ExportSettings, LocalFileSystem, NodeKind,
    ProbeThresholds, ResponsiveMap, SceneTree, parse_name, run_export, select_by_name,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::rasterizer::{MANIFEST_FILE, ManifestRasterizer};

#[derive(Parser, Debug)]
#[command(
    name = "baumkit",
    version,
    about = "Compile design-document snapshots into Baum2 layout files",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every artboard and sub-prefab in a snapshot
    Export(ExportArgs),
    /// Show the anchors the resize probe derives for an artboard
    Probe {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
        /// Only probe the artboard with this name
        #[arg(long, value_name = "NAME")]
        artboard: Option<String>,
        /// JSON settings file to take the resize thresholds from
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,
    },
    /// Show how a layer name is parsed
    Name {
        label: String,
        /// Parse as a repeated-grid cell
        #[arg(long)]
        in_grid: bool,
    },
}

#[derive(Args, Debug, Default)]
struct ExportArgs {
    #[arg(value_name = "SNAPSHOT")]
    snapshot: PathBuf,
    /// Output folder (overrides the settings file)
    #[arg(long, short, value_name = "DIR")]
    out: Option<PathBuf>,
    /// Scale factor applied to every coordinate
    #[arg(long, value_name = "FACTOR")]
    scale: Option<String>,
    /// JSON settings file, as saved by the export dialog
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
    /// Export candidates even when they are not marked for export
    #[arg(long)]
    all: bool,
    /// Disable the Input and Scroller name suffixes
    #[arg(long)]
    no_extended: bool,
    /// Skip the resize probe and omit pivot/stretch fields
    #[arg(long)]
    no_responsive: bool,
    /// Inline `Name/` groups instead of exporting them separately
    #[arg(long)]
    no_sub_prefab: bool,
    /// Emit plain Text elements instead of TextMeshPro
    #[arg(long)]
    no_rich_text: bool,
    /// Rasterize every text node
    #[arg(long)]
    text_to_image: bool,
    /// Restrict the export to these nodes (raw label or display name)
    #[arg(long = "select", value_name = "NAME")]
    select: Vec<String>,
}

impl ExportArgs {
    /// Layer command-line flags over the loaded settings.
    fn apply(&self, settings: &mut ExportSettings) {
        if let Some(scale) = &self.scale {
            settings.scale = ScaleInput::Text(scale.clone());
        }
        if let Some(out) = &self.out {
            settings.output_folder = Some(out.clone());
        }
        let options = &mut settings.options;
        if self.all {
            options.check_marked_for_export = false;
        }
        if self.no_extended {
            options.enable_extended = false;
        }
        if self.no_responsive {
            options.responsive_parameters = false;
        }
        if self.no_sub_prefab {
            options.enable_sub_prefab = false;
        }
        if self.no_rich_text {
            options.text_to_rich_text = false;
        }
        if self.text_to_image {
            options.force_text_to_image = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Export(args) => export(&args).await,
        Command::Probe {
            snapshot,
            artboard,
            settings,
        } => {
            probe(&snapshot, artboard.as_deref(), settings.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Name { label, in_grid } => {
            let parsed = parse_name(&label, in_grid, true);
            let mut out = std::io::stdout().lock();
            writeln!(out, "name:    {}", parsed.name)?;
            writeln!(out, "options: {}", parsed.options)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn load_snapshot(path: &Path) -> Result<SceneTree> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    SceneTree::from_json(&data).with_context(|| format!("failed to load {}", path.display()))
}

async fn load_settings(path: Option<&Path>) -> Result<ExportSettings> {
    let Some(path) = path else {
        return Ok(ExportSettings::default());
    };
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("invalid settings in {}", path.display()))
}

async fn export(args: &ExportArgs) -> Result<ExitCode> {
    let mut settings = load_settings(args.settings.as_deref()).await?;
    args.apply(&mut settings);
    let ctx = ExportContext::from_settings(&settings).map_err(ExportError::from)?;

    let mut tree = load_snapshot(&args.snapshot).await?;
    let selection = select_by_name(&tree, &args.select, ctx.options.enable_extended)
        .map_err(ExportError::from)?;

    let fs = LocalFileSystem::new(&ctx.output_folder);
    let rasterizer = ManifestRasterizer::new(&ctx.output_folder);

    let report = run_export(&mut tree, &selection, &ctx, &fs, &rasterizer).await?;

    let mut out = std::io::stdout().lock();
    for document in &report.documents {
        writeln!(out, "wrote {}", fs.root().join(document).display())?;
    }
    if report.renditions > 0 {
        writeln!(
            out,
            "queued {} rendition(s) in {}",
            report.rasterized,
            fs.root().join(MANIFEST_FILE).display()
        )?;
    }
    if let Some(drift) = &report.drift {
        writeln!(out, "warning: {drift}")?;
    }
    for diagnostic in &report.diagnostics {
        writeln!(out, "{}: {diagnostic}", if diagnostic.is_io() { "error" } else { "warning" })?;
    }

    let failed = report.diagnostics.iter().any(|d| d.is_io());
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn probe(snapshot: &Path, artboard: Option<&str>, settings: Option<&Path>) -> Result<()> {
    let settings = load_settings(settings).await?;
    let mut tree = load_snapshot(snapshot).await?;
    let mut out = std::io::stdout().lock();
    write_anchors(&mut tree, artboard, &settings.thresholds, &mut out)
        .with_context(|| format!("failed to list anchors for {}", snapshot.display()))
}

/// Probe each matching artboard and list the anchors of its descendants.
fn write_anchors(
    tree: &mut SceneTree,
    artboard: Option<&str>,
    thresholds: &ProbeThresholds,
    out: &mut impl Write,
) -> Result<()> {
    let boards: Vec<_> = tree
        .top_level()
        .iter()
        .copied()
        .filter(|&id| tree.node(id).kind == NodeKind::Artboard)
        .filter(|&id| artboard.is_none_or(|name| tree.node(id).name == name))
        .collect();
    if boards.is_empty() {
        bail!("no matching artboard");
    }

    for board in boards {
        let map = ResponsiveMap::probe(tree, board, thresholds);
        writeln!(out, "{}", tree.node(board).name)?;

        let mut records: Vec<_> = map.iter().collect();
        records.sort_by_key(|(id, _)| *id);
        for (_, record) in records {
            let Some(parameter) = &record.parameter else {
                continue;
            };
            let pivot = parameter.pivot.map(|p| p.to_string()).unwrap_or_default();
            writeln!(
                out,
                "  {:<32} pivot={:<14} stretchx={:<5} stretchy={}",
                record.name, pivot, parameter.stretch_x, parameter.stretch_y
            )?;
        }
        if let Err(drift) = map.verify_restored() {
            writeln!(out, "  warning: {drift}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let mut settings = ExportSettings::default();
        let args = ExportArgs {
            scale: Some("2".into()),
            out: Some("out".into()),
            all: true,
            no_rich_text: true,
            ..ExportArgs::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.scale, ScaleInput::Text("2".into()));
        assert_eq!(settings.output_folder, Some(PathBuf::from("out")));
        assert!(!settings.options.check_marked_for_export);
        assert!(!settings.options.text_to_rich_text);
        assert!(settings.options.responsive_parameters);

        let ctx = ExportContext::from_settings(&settings).unwrap();
        assert_eq!(ctx.scale, 2.0);
    }

    #[test]
    fn export_command_parses() {
        let cli = Cli::try_parse_from([
            "baumkit",
            "export",
            "doc.json",
            "--out",
            "build",
            "--no-responsive",
            "--select",
            "Screen",
            "--select",
            "Popup",
        ])
        .unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.snapshot, PathBuf::from("doc.json"));
        assert!(args.no_responsive);
        assert_eq!(args.select, ["Screen", "Popup"]);
    }

    #[tokio::test]
    async fn export_writes_layouts_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("doc.json");
        std::fs::write(
            &snapshot,
            r#"{"children": [{"id": "a1", "name": "Home", "kind": "artboard",
                "markedForExport": true,
                "bounds": {"x": 0, "y": 0, "width": 320, "height": 480},
                "children": [{"id": "r1", "name": "bgImage", "kind": "rectangle",
                    "bounds": {"x": 0, "y": 0, "width": 320, "height": 480}}]}]}"#,
        )
        .unwrap();
        let out = dir.path().join("build");
        let args = ExportArgs {
            snapshot,
            out: Some(out.clone()),
            ..ExportArgs::default()
        };

        let code = export(&args).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.join("Home.layout.txt").is_file());
        assert!(out.join("Home").is_dir());
        assert!(out.join(MANIFEST_FILE).is_file());
    }

    #[tokio::test]
    async fn unmarked_snapshot_leaves_no_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("doc.json");
        std::fs::write(
            &snapshot,
            r#"{"children": [{"id": "a1", "name": "Home", "kind": "artboard",
                "bounds": {"x": 0, "y": 0, "width": 320, "height": 480}}]}"#,
        )
        .unwrap();
        let out = dir.path().join("build");
        let args = ExportArgs {
            snapshot,
            out: Some(out.clone()),
            ..ExportArgs::default()
        };

        assert!(export(&args).await.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn anchor_listing_accepts_settings() {
        let cli =
            Cli::try_parse_from(["baumkit", "probe", "doc.json", "--settings", "export.json"])
                .unwrap();
        let Command::Probe { settings, .. } = cli.command else {
            panic!("expected probe");
        };
        assert_eq!(settings, Some(PathBuf::from("export.json")));
    }

    #[tokio::test]
    async fn anchors_follow_configured_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{"thresholds": {"anchorRatio": 0.4}}"#).unwrap();
        let tight = load_settings(Some(&path)).await.unwrap().thresholds;

        let snapshot = br#"{"children": [{"id": "a1", "name": "Home", "kind": "artboard",
            "bounds": {"x": 0, "y": 0, "width": 320, "height": 480},
            "children": [{"id": "r1", "name": "logoImage", "kind": "rectangle",
                "bounds": {"x": 140, "y": 220, "width": 40, "height": 40},
                "constraints": {"horizontal": "center", "vertical": "middle"}}]}]}"#;
        let report = |thresholds: &ProbeThresholds| {
            let mut tree = SceneTree::from_json(snapshot).unwrap();
            let mut out = Vec::new();
            write_anchors(&mut tree, Some("Home"), thresholds, &mut out).unwrap();
            String::from_utf8(out).unwrap()
        };

        let relaxed = report(&ProbeThresholds::default());
        assert!(relaxed.contains("pivot=centermiddle"), "{relaxed}");
        let strict = report(&tight);
        assert!(strict.contains("pivot=rightbottom"), "{strict}");
        assert!(!strict.contains("warning"), "{strict}");
    }

    #[test]
    fn unknown_artboard_is_an_error() {
        let mut tree = SceneTree::new();
        let mut out = Vec::new();
        let err = write_anchors(&mut tree, Some("Home"), &ProbeThresholds::default(), &mut out)
            .unwrap_err();
        assert_eq!(err.to_string(), "no matching artboard");
    }
}
