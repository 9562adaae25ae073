//! Scan command: walk a region with one discipline and report sums.

use std::time::Instant;

use crate::{Discipline, ScanArgs};
use anyhow::{Context, Result};
use raster_core::{TiledImage, TiledRaster};
use raster_iter::fallback::{RandomIterFallback, RectIterFallback, RookIterFallback};
use raster_iter::{factory, parallel, RandomIter, RectIter, RookIter};
use tracing::{info, warn};

/// Runs the scan command.
pub fn run(args: ScanArgs, verbose: bool) -> Result<()> {
    let raster = super::build_raster(&args.raster)?;
    let region = super::parse_region(args.region.as_deref(), raster.bounds())?;
    raster.reset_requests();

    let start = Instant::now();
    let (sums, pixels, label) = if args.parallel {
        if args.discipline != Discipline::Rect || args.fallback {
            warn!("--parallel always scans with factory-selected sequential cursors");
        }
        let sums = parallel::sum_bands(&raster, region).context("Parallel scan failed")?;
        let clipped = region.intersect(&raster.bounds()).map_or(0, |r| r.area());
        (sums, clipped, format!("parallel x{}", rayon::current_num_threads()))
    } else {
        scan_one(&raster, region, args.discipline, args.fallback)?
    };
    let elapsed = start.elapsed();

    println!("{}", super::describe(&raster));
    println!("  Region:     {}", region);
    println!("  Cursor:     {}", label);
    println!("  Pixels:     {}", pixels);
    super::print_sums(&sums, pixels);
    if verbose {
        super::print_stats(&raster);
    }
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { pixels as f64 / secs / 1e6 } else { 0.0 };
    println!("  Time:       {:.3} ms ({:.1} Mpix/s)", secs * 1e3, rate);
    info!(pixels, ms = secs * 1e3, "Scan finished");
    Ok(())
}

fn scan_one(
    raster: &TiledRaster,
    region: raster_core::Rect,
    discipline: Discipline,
    fallback: bool,
) -> Result<(Vec<f64>, u64, String)> {
    let kind = if fallback {
        factory::CursorKind::Fallback
    } else {
        factory::CursorKind::select(raster.layout())
    };
    let label = format!("{:?} {}", discipline, kind).to_lowercase();
    let (sums, pixels) = match (discipline, fallback) {
        (Discipline::Rect, true) => super::scan_sums(&mut RectIterFallback::new(raster, region)?)?,
        (Discipline::Rect, false) => super::scan_sums(&mut factory::create_rect(raster, region)?)?,
        (Discipline::Rook, true) => backward_sums(&mut RookIterFallback::new(raster, region)?)?,
        (Discipline::Rook, false) => backward_sums(&mut factory::create_rook(raster, region)?)?,
        (Discipline::Random, true) => random_sums(&mut RandomIterFallback::new(raster, region)?)?,
        (Discipline::Random, false) => random_sums(&mut factory::create_random(raster, region)?)?,
    };
    Ok((sums, pixels, label))
}

fn backward_sums<I: RookIter>(it: &mut I) -> Result<(Vec<f64>, u64)> {
    let mut sums = vec![0.0; it.num_bands()];
    let mut pixels = 0u64;
    it.end_lines()?;
    while !it.finished_lines_top() {
        it.end_pixels()?;
        while !it.finished_pixels_left() {
            for (band, sum) in sums.iter_mut().enumerate() {
                *sum += it.sample_band_f64(band);
            }
            pixels += 1;
            it.prev_pixel()?;
        }
        it.prev_line()?;
    }
    Ok((sums, pixels))
}

/// Visits the region column by column, the worst order for tile reuse.
fn random_sums<I: RandomIter>(it: &mut I) -> Result<(Vec<f64>, u64)> {
    let bounds = it.bounds();
    let mut sums = vec![0.0; it.num_bands()];
    let mut px = vec![0.0; it.num_bands()];
    let mut pixels = 0u64;
    for x in bounds.x..bounds.right() {
        for y in bounds.y..bounds.bottom() {
            it.pixel_f64(x, y, &mut px)?;
            for (sum, v) in sums.iter_mut().zip(&px) {
                *sum += v;
            }
            pixels += 1;
        }
    }
    it.done()?;
    Ok((sums, pixels))
}
