//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations. Every command opens the workspace
//! store (config + snapshot), applies its actions through the store and
//! lets the store persist the result.

mod category;
mod draw;
mod frame;
mod import;
mod init;
mod palette;
mod play;
mod render;
mod show;
mod sprite;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, DotsConfig};
use crate::lookup::LookupError;
use crate::models::Tool;
use crate::persist::{FileStorage, Gateway};
use crate::store::Store;
use crate::telemetry::ErrorCollector;

pub use category::CategoryAction;
pub use frame::FrameAction;
pub use palette::PaletteAction;
pub use sprite::SpriteAction;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Dotsmith - edit 16x16 indexed-color sprites and their animation frames
#[derive(Parser)]
#[command(name = "dots")]
#[command(about = "Dotsmith - edit 16x16 indexed-color sprites and preview their animation")]
#[command(version)]
pub struct Cli {
    /// Config file (default: discover dotsmith.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot directory (overrides [storage] dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Snapshot key (overrides [storage] key)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Record swallowed failures to the error log
    #[arg(long, global = true)]
    pub collect_errors: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter dotsmith.toml and an empty snapshot
    Init {
        /// Project directory (default: current directory)
        path: Option<PathBuf>,

        /// Overwrite an existing dotsmith.toml
        #[arg(long)]
        force: bool,
    },

    /// Create, list, rename, move and delete sprites
    Sprite {
        #[command(subcommand)]
        action: SpriteAction,
    },

    /// Manage the category tree
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage color palettes
    Palette {
        #[command(subcommand)]
        action: PaletteAction,
    },

    /// Add, duplicate, delete, reorder and time frames
    Frame {
        #[command(subcommand)]
        action: FrameAction,
    },

    /// Edit the pixels of a frame
    Draw {
        /// Sprite id or name
        sprite: String,

        /// Frame index (default: the selected frame)
        #[arg(short, long)]
        frame: Option<usize>,

        /// Color index used by --pixel, --line and --fill (default: the selected color)
        #[arg(short, long)]
        color: Option<u8>,

        /// Set pixel: x,y (e.g. --pixel 5,10)
        #[arg(long, value_name = "X,Y")]
        pixel: Vec<String>,

        /// Erase pixel (set to transparent): x,y
        #[arg(long, value_name = "X,Y")]
        erase: Vec<String>,

        /// Draw a line between two cells: x0,y0,x1,y1
        #[arg(long, value_name = "X0,Y0,X1,Y1")]
        line: Vec<String>,

        /// Flood fill from a seed cell: x,y
        #[arg(long, value_name = "X,Y")]
        fill: Vec<String>,

        /// Read the color at x,y and make it the selected color
        #[arg(long, value_name = "X,Y")]
        pick: Option<String>,

        /// Tool for --path (default: the current tool)
        #[arg(long, value_enum)]
        tool: Option<Tool>,

        /// Pointer stroke in screen pixels: press at the first point, drag through the rest
        #[arg(long, value_name = "PX,PY", num_args = 1..)]
        path: Vec<String>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a frame to the terminal
    Show {
        /// Sprite id or name
        sprite: String,

        /// Frame index (default: the selected frame)
        #[arg(short, long)]
        frame: Option<usize>,

        /// Palette id or name (default: the selected palette)
        #[arg(short, long)]
        palette: Option<String>,

        /// Print color indices without ANSI colors
        #[arg(long)]
        plain: bool,
    },

    /// Simulate animation playback and print each frame change
    Play {
        /// Sprite id or name
        sprite: String,

        /// Playback speed multiplier (0.1-3.0)
        #[arg(short, long)]
        speed: Option<f64>,

        /// How long to play, in milliseconds
        #[arg(short, long, default_value = "1000")]
        duration: u64,

        /// Display refresh interval in milliseconds (default: [playback] refresh_ms)
        #[arg(long)]
        refresh: Option<u32>,
    },

    /// Write the document as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the document with an exported JSON file
    Import {
        /// JSON file produced by `dots export`
        input: PathBuf,

        /// Refuse documents with validation errors
        #[arg(long)]
        strict: bool,
    },

    /// Render a sprite to PNG, spritesheet or animated GIF
    Render {
        /// Sprite id or name
        sprite: String,

        /// Output file or directory (ends with / or exists).
        /// If omitted: {sprite}.png, {sprite}_{frame}.png per frame, or {sprite}.gif
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Palette id or name (default: the selected palette)
        #[arg(short, long)]
        palette: Option<String>,

        /// Only render this frame
        #[arg(short, long)]
        frame: Option<usize>,

        /// Scale output by integer factor (1-64)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=64))]
        scale: u32,

        /// Output as animated GIF
        #[arg(long)]
        gif: bool,

        /// Playback speed for GIF frame delays (default: the session speed)
        #[arg(long)]
        speed: Option<f64>,

        /// Output all frames on one spritesheet
        #[arg(long)]
        spritesheet: bool,

        /// Frames per spritesheet row (default: all on one row)
        #[arg(long)]
        cols: Option<u32>,

        /// Transparent pixels between spritesheet cells
        #[arg(long, default_value = "0")]
        spacing: u32,

        /// Strict mode: treat render warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

/// Loaded configuration plus the store backed by its snapshot directory.
pub(crate) struct Workspace {
    pub config: DotsConfig,
    pub store: Store<FileStorage>,
}

impl Workspace {
    /// Load config (explicit path or discovery), apply CLI overrides and open the store.
    pub fn open(cli: &GlobalArgs) -> Result<Self, ExitCode> {
        let mut config = match load_config(cli.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(ExitCode::from(EXIT_INVALID_ARGS));
            }
        };

        let overrides = CliOverrides {
            storage_dir: cli.data_dir.clone(),
            key: cli.key.clone(),
            speed: None,
            collect_errors: cli.collect_errors.then_some(true),
        };
        merge_cli_overrides(&mut config, &overrides);

        Ok(Self::with_config(config))
    }

    fn with_config(config: DotsConfig) -> Self {
        let collector = ErrorCollector::new(&config.telemetry.path, config.telemetry.collect_errors);
        let gateway = Gateway::with_key(FileStorage::new(&config.storage.dir), config.storage.key.clone())
            .with_collector(collector);
        let store = Store::open(gateway);
        Self { config, store }
    }
}

/// Options shared by every command.
pub(crate) struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub key: Option<String>,
    pub collect_errors: bool,
}

/// Print a failed lookup and return the matching exit code.
pub(crate) fn lookup_failed(error: LookupError) -> ExitCode {
    eprintln!("Error: {}", error);
    ExitCode::from(EXIT_ERROR)
}

/// Parse "x,y" into two integers.
pub(crate) fn parse_point(s: &str) -> Option<(i32, i32)> {
    let (x, y) = s.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Parse "x0,y0,x1,y1" into two points.
pub(crate) fn parse_segment(s: &str) -> Option<((i32, i32), (i32, i32))> {
    let parts: Vec<i32> = s.split(',').map(|p| p.trim().parse().ok()).collect::<Option<_>>()?;
    match parts[..] {
        [x0, y0, x1, y1] => Some(((x0, y0), (x1, y1))),
        _ => None,
    }
}

/// Parse "px,py" screen coordinates.
pub(crate) fn parse_screen_point(s: &str) -> Option<(f64, f64)> {
    let (x, y) = s.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("DOTS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let globals = GlobalArgs {
        config: cli.config,
        data_dir: cli.data_dir,
        key: cli.key,
        collect_errors: cli.collect_errors,
    };

    if let Commands::Init { path, force } = &cli.command {
        return init::run_init(path.as_deref().unwrap_or(Path::new(".")), *force);
    }

    let mut workspace = match Workspace::open(&globals) {
        Ok(workspace) => workspace,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Init { .. } => ExitCode::from(EXIT_SUCCESS),
        Commands::Sprite { action } => sprite::run_sprite(&mut workspace, action),
        Commands::Category { action } => category::run_category(&mut workspace, action),
        Commands::Palette { action } => palette::run_palette(&mut workspace, action),
        Commands::Frame { action } => frame::run_frame(&mut workspace, action),
        Commands::Draw { sprite, frame, color, pixel, erase, line, fill, pick, tool, path, dry_run } => {
            let ops = draw::DrawOps { pixel, erase, line, fill, pick, tool, path };
            draw::run_draw(&mut workspace, &sprite, frame, color, ops, dry_run)
        }
        Commands::Show { sprite, frame, palette, plain } => {
            show::run_show(&workspace, &sprite, frame, palette.as_deref(), plain)
        }
        Commands::Play { sprite, speed, duration, refresh } => {
            play::run_play(&workspace, &sprite, speed, duration, refresh)
        }
        Commands::Export { output } => import::run_export(&workspace, output.as_deref()),
        Commands::Import { input, strict } => import::run_import(&mut workspace, &input, strict),
        Commands::Render {
            sprite,
            output,
            palette,
            frame,
            scale,
            gif,
            speed,
            spritesheet,
            cols,
            spacing,
            strict,
        } => render::run_render(
            &workspace,
            &sprite,
            output.as_deref(),
            palette.as_deref(),
            frame,
            scale,
            gif,
            speed,
            spritesheet,
            cols,
            spacing,
            strict,
        ),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// A workspace whose snapshot lives in a temporary directory.
    pub fn workspace() -> (TempDir, Workspace) {
        let temp = TempDir::new().expect("should create temp dir");
        let mut config = DotsConfig::default();
        config.storage.dir = temp.path().join("data");
        config.telemetry.path = temp.path().join("errors.jsonl");
        (temp, Workspace::with_config(config))
    }
}
