//! CLI command implementations

pub mod fill;
pub mod info;
pub mod scan;
pub mod verify;

use anyhow::{bail, Context, Result};
use raster_core::{ElementType, Rect, TiledImage, TiledRaster};
use raster_iter::RectIter;
use tracing::debug;

use crate::{LayoutArg, RasterArgs};

/// Deterministic test pattern stored in the synthetic raster.
///
/// Stays inside `0..=255` so every element type holds it exactly.
pub fn pattern(x: i32, y: i32, band: usize) -> f64 {
    (x.wrapping_mul(3) ^ y.wrapping_mul(5)).wrapping_add(band as i32 * 47).rem_euclid(256) as f64
}

/// Builds the raster described by `args`, filled with [`pattern`].
pub fn build_raster(args: &RasterArgs) -> Result<TiledRaster> {
    let bounds = Rect::new(args.x, args.y, args.width, args.height);
    let tile_height = args.tile_height.unwrap_or(args.tile_width);
    let mut raster = TiledRaster::builder(bounds)
        .tile_size(args.tile_width, tile_height)
        .grid_offset(args.grid_x.unwrap_or(args.x), args.grid_y.unwrap_or(args.y))
        .bands(args.bands)
        .element_type(ElementType::from(args.element))
        .banded(args.layout == LayoutArg::Banded)
        .build()
        .context("Failed to build raster")?;
    raster.fill_with(pattern).context("Failed to fill raster")?;
    debug!(%bounds, tiles = ?raster.tile_count(), "Synthetic raster ready");
    Ok(raster)
}

/// Parses `x,y,w,h`, or returns the image bounds when absent.
pub fn parse_region(region: Option<&str>, image: Rect) -> Result<Rect> {
    let Some(text) = region else {
        return Ok(image);
    };
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        bail!("Region must be x,y,w,h, got '{}'", text);
    }
    let x = parts[0].parse().with_context(|| format!("Invalid region x '{}'", parts[0]))?;
    let y = parts[1].parse().with_context(|| format!("Invalid region y '{}'", parts[1]))?;
    let w = parts[2].parse().with_context(|| format!("Invalid region width '{}'", parts[2]))?;
    let h = parts[3].parse().with_context(|| format!("Invalid region height '{}'", parts[3]))?;
    Ok(Rect::new(x, y, w, h))
}

/// Sums every band over a full forward scan.
pub fn scan_sums<I: RectIter + ?Sized>(it: &mut I) -> Result<(Vec<f64>, u64)> {
    let mut sums = vec![0.0; it.num_bands()];
    let mut pixels = 0u64;
    it.start_lines()?;
    while !it.finished_lines() {
        it.start_pixels()?;
        while !it.finished_pixels() {
            for (band, sum) in sums.iter_mut().enumerate() {
                *sum += it.sample_band_f64(band);
            }
            pixels += 1;
            it.next_pixel()?;
        }
        it.next_line()?;
    }
    Ok((sums, pixels))
}

/// Prints per-band sums and means.
pub fn print_sums(sums: &[f64], pixels: u64) {
    for (band, sum) in sums.iter().enumerate() {
        let mean = if pixels > 0 { sum / pixels as f64 } else { 0.0 };
        println!("  Band {band}:     sum {sum:.3}  mean {mean:.4}");
    }
}

/// Prints tile counters of `raster`.
pub fn print_stats(raster: &TiledRaster) {
    let stats = raster.stats();
    let (cols, rows) = raster.tile_count();
    println!("  Tiles:      {}x{} ({} loaded)", cols, rows, stats.loads);
    println!("  Requests:   {}", stats.requests);
    if stats.checkouts > 0 {
        println!("  Leases:     {} out, {} back", stats.checkouts, stats.releases);
    }
}

/// Describes the raster in one line.
pub fn describe(raster: &TiledRaster) -> String {
    let layout = raster.layout();
    format!(
        "{} {} x{} {}",
        raster.bounds(),
        layout.element_type(),
        layout.num_bands(),
        if layout.is_component_interleaved() { "interleaved" } else { "banded" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        let image = Rect::from_size(10, 10);
        assert_eq!(parse_region(None, image).unwrap(), image);
        assert_eq!(parse_region(Some("-2, 3,4,5"), image).unwrap(), Rect::new(-2, 3, 4, 5));
        assert!(parse_region(Some("1,2,3"), image).is_err());
        assert!(parse_region(Some("1,2,x,4"), image).is_err());
    }

    #[test]
    fn test_pattern_range() {
        for y in -20..20 {
            for x in -20..20 {
                let v = pattern(x, y, 3);
                assert!((0.0..=255.0).contains(&v));
            }
        }
    }
}
