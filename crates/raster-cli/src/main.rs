//! raster - drive the tiled-raster pixel cursors from the command line
//!
//! Builds a synthetic tiled raster from flags, fills it with a known
//! pattern, and scans, verifies or rewrites it through the cursor engine.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use raster_core::ElementType;

mod commands;

#[derive(Parser)]
#[command(name = "raster")]
#[command(author, version, about = "Tiled-raster pixel cursor tool")]
#[command(long_about = "
Builds an in-memory tiled raster and walks it with the pixel cursors.

Examples:
  raster info --width 4096 --height 2048 --tile-width 256
  raster scan --element f32 --bands 4 --discipline rook
  raster scan --layout banded --region 10,10,300,200
  raster verify --grid-x -7 --grid-y -3 --tile-width 13
  raster fill --element u8 --bands 4 --value 200 --premultiply 3
  RUST_LOG=raster_iter=trace raster scan --width 64 --height 64
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Show raster geometry, layout and the cursor family it selects
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Scan a region and report per-band sums
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    /// Check that every cursor family agrees on every sample
    #[command(visible_alias = "v")]
    Verify(VerifyArgs),

    /// Write through a writable cursor and report lease accounting
    Fill(FillArgs),
}

/// Element type flag.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ElementArg {
    U8,
    F32,
    F64,
}

impl From<ElementArg> for ElementType {
    fn from(arg: ElementArg) -> Self {
        match arg {
            ElementArg::U8 => ElementType::U8,
            ElementArg::F32 => ElementType::F32,
            ElementArg::F64 => ElementType::F64,
        }
    }
}

/// Band packing flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    Interleaved,
    Banded,
}

/// Traversal discipline flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Discipline {
    Rect,
    Rook,
    Random,
}

/// Synthetic raster configuration shared by every command.
#[derive(Args, Clone, Debug)]
struct RasterArgs {
    /// Image width in pixels
    #[arg(long, default_value = "1024")]
    width: u32,

    /// Image height in pixels
    #[arg(short = 'H', long, default_value = "768")]
    height: u32,

    /// Image origin x
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    x: i32,

    /// Image origin y
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    y: i32,

    /// Tile width
    #[arg(long, default_value = "64")]
    tile_width: u32,

    /// Tile height (defaults to the tile width)
    #[arg(long)]
    tile_height: Option<u32>,

    /// Bands per pixel
    #[arg(short, long, default_value = "3")]
    bands: usize,

    /// Element type
    #[arg(short, long, value_enum, default_value = "u8")]
    element: ElementArg,

    /// Band packing
    #[arg(short, long, value_enum, default_value = "interleaved")]
    layout: LayoutArg,

    /// Tile grid x offset (defaults to the image origin)
    #[arg(long, allow_hyphen_values = true)]
    grid_x: Option<i32>,

    /// Tile grid y offset (defaults to the image origin)
    #[arg(long, allow_hyphen_values = true)]
    grid_y: Option<i32>,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    raster: RasterArgs,
}

#[derive(Args)]
struct ScanArgs {
    #[command(flatten)]
    raster: RasterArgs,

    /// Region to scan as x,y,w,h (defaults to the whole image)
    #[arg(short, long, allow_hyphen_values = true)]
    region: Option<String>,

    /// Traversal discipline
    #[arg(short, long, value_enum, default_value = "rect")]
    discipline: Discipline,

    /// Use the fallback cursors even when a fast path exists
    #[arg(long)]
    fallback: bool,

    /// Split the region into tile-row strips across threads
    #[arg(short, long)]
    parallel: bool,
}

#[derive(Args)]
struct VerifyArgs {
    #[command(flatten)]
    raster: RasterArgs,

    /// Region to verify as x,y,w,h (defaults to the whole image)
    #[arg(short, long, allow_hyphen_values = true)]
    region: Option<String>,
}

#[derive(Args)]
struct FillArgs {
    #[command(flatten)]
    raster: RasterArgs,

    /// Region to fill as x,y,w,h (defaults to the whole image)
    #[arg(short, long, allow_hyphen_values = true)]
    region: Option<String>,

    /// Value written to every colour band (default: a gradient)
    #[arg(long)]
    value: Option<f64>,

    /// Premultiply by this alpha band after filling
    #[arg(long)]
    premultiply: Option<usize>,

    /// Write with the random-access cursor in a scattered order
    #[arg(long)]
    scatter: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(verbose).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Scan(args) => commands::scan::run(args, cli.verbose),
        Commands::Verify(args) => commands::verify::run(args, cli.verbose),
        Commands::Fill(args) => commands::fill::run(args, cli.verbose),
    }
}
