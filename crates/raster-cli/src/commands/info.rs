//! Raster info command.
//!
//! Prints geometry, element layout, and which cursor family the factory
//! would pick for it.

use crate::InfoArgs;
use anyhow::Result;
use raster_core::TiledImage;
use raster_iter::CursorKind;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    let raster = super::build_raster(&args.raster)?;
    let layout = raster.layout();
    let grid = raster.tile_grid();
    let (cols, rows) = raster.tile_count();

    println!("{}", super::describe(&raster));
    println!("  Bounds:     {}", raster.bounds());
    println!("  Tile size:  {}x{}", grid.tile_width, grid.tile_height);
    println!("  Grid:       offset ({}, {}), {}x{} tiles", grid.x_offset, grid.y_offset, cols, rows);
    println!("  Element:    {} ({} bytes)", layout.element_type(), layout.element_type().bytes());
    println!("  Strides:    pixel {}, scanline {}", layout.pixel_stride(), layout.scanline_stride());
    println!("  Cursor:     {}", CursorKind::select(layout));

    if verbose {
        println!("  Banks:      {:?}", layout.bank_indices());
        println!("  Offsets:    {:?}", layout.band_offsets());
        let ((tx, last_tx), (ty, last_ty)) = raster.tile_range();
        println!("  Tiles:      x {}..={}, y {}..={}", tx, last_tx, ty, last_ty);
        println!("  First tile: ({}, {}) covering {}", tx, ty, grid.tile_rect(tx, ty));
    }

    Ok(())
}
