//! Verify command: every cursor family must report the same samples.
//!
//! Checks, for each pixel and band of the region:
//! - the factory-selected sequential cursor against the stored pattern
//! - the fallback sequential cursor against the factory one
//! - random access and the backward scan against the forward scan

use crate::VerifyArgs;
use anyhow::{bail, Result};
use raster_core::TiledImage;
use raster_iter::fallback::RectIterFallback;
use raster_iter::{factory, RandomIter, RectIter, RookIter};
use tracing::warn;

const MAX_REPORTED: usize = 10;

/// Runs the verify command.
pub fn run(args: VerifyArgs, verbose: bool) -> Result<()> {
    let raster = super::build_raster(&args.raster)?;
    let region = super::parse_region(args.region.as_deref(), raster.bounds())?;

    let mut fast = factory::create_rect(&raster, region)?;
    let mut slow = RectIterFallback::new(&raster, region)?;
    let mut random = factory::create_random(&raster, region)?;
    let bands = fast.num_bands();

    let mut forward = Vec::with_capacity(region.area() as usize * bands);
    let mut mismatches = 0usize;
    let mut report = |what: &str, x: i32, y: i32, band: usize, got: f64, want: f64| {
        mismatches += 1;
        if mismatches <= MAX_REPORTED {
            warn!(what, x, y, band, got, want, "Sample mismatch");
        }
    };

    while !fast.finished_lines() {
        fast.start_pixels()?;
        slow.start_pixels()?;
        while !fast.finished_pixels() {
            let (x, y) = fast.position();
            for band in 0..bands {
                let v = fast.sample_band_f64(band);
                let want = super::pattern(x, y, band);
                if v != want {
                    report("pattern", x, y, band, v, want);
                }
                let s = slow.sample_band_f64(band);
                if s.to_bits() != v.to_bits() {
                    report("fallback", x, y, band, s, v);
                }
                let r = random.sample_f64(x, y, band)?;
                if r.to_bits() != v.to_bits() {
                    report("random", x, y, band, r, v);
                }
                forward.push(v);
            }
            fast.next_pixel()?;
            slow.next_pixel()?;
        }
        fast.next_line()?;
        slow.next_line()?;
    }

    let mut rook = factory::create_rook(&raster, region)?;
    let mut idx = forward.len();
    rook.end_lines()?;
    while !rook.finished_lines_top() {
        rook.end_pixels()?;
        while !rook.finished_pixels_left() {
            let (x, y) = rook.position();
            idx -= bands;
            for band in 0..bands {
                let v = rook.sample_band_f64(band);
                if v.to_bits() != forward[idx + band].to_bits() {
                    report("rook", x, y, band, v, forward[idx + band]);
                }
            }
            rook.prev_pixel()?;
        }
        rook.prev_line()?;
    }

    println!("{}", super::describe(&raster));
    println!("  Region:     {}", fast.bounds());
    println!("  Cursor:     {}", fast.kind());
    println!("  Samples:    {}", forward.len());
    if verbose {
        super::print_stats(&raster);
    }
    if mismatches > 0 {
        bail!("{} mismatching samples", mismatches);
    }
    println!("  Result:     OK");
    Ok(())
}
