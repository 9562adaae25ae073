//! Fill command: write through the writable cursors.
//!
//! Colour bands get `--value` (or the stored pattern shifted by one), the
//! alpha band given to `--premultiply` gets a horizontal ramp, and the
//! result is optionally premultiplied in place. Lease counters are printed
//! at the end; outstanding leases are an error.

use crate::FillArgs;
use anyhow::{bail, Context, Result};
use raster_core::{Rect, TiledImage};
use raster_iter::{alpha, factory, RandomIter, RectIter, WritableRandomIter, WritableRectIter};
use tracing::debug;

/// Runs the fill command.
pub fn run(args: FillArgs, verbose: bool) -> Result<()> {
    let mut raster = super::build_raster(&args.raster)?;
    let region = super::parse_region(args.region.as_deref(), raster.bounds())?;
    let bands = raster.num_bands();
    let element_type = raster.layout().element_type();
    if let Some(a) = args.premultiply {
        if a >= bands {
            bail!("Alpha band {} out of range for {} bands", a, bands);
        }
    }

    let unit = element_type.unit();
    let value_at = |x: i32, y: i32, band: usize| -> f64 {
        if Some(band) == args.premultiply {
            let t = (x - region.x) as f64 / region.width.max(2).saturating_sub(1) as f64;
            return (t.clamp(0.0, 1.0) * unit).round();
        }
        match args.value {
            Some(v) => v,
            None => super::pattern(x + 1, y, band),
        }
    };

    let mut px = vec![0.0; bands];
    if args.scatter {
        let mut it = factory::create_writable_random(&mut raster, region)?;
        let b = it.bounds();
        let area = b.area();
        // stride coprime with the area visits every pixel once
        let stride = coprime_stride(area);
        debug!(area, stride, "Scattered fill");
        let mut i = 0u64;
        for _ in 0..area {
            let x = b.x + (i % b.width as u64) as i32;
            let y = b.y + (i / b.width as u64) as i32;
            for (band, v) in px.iter_mut().enumerate() {
                *v = value_at(x, y, band);
            }
            it.set_pixel_f64(x, y, &px)?;
            i = (i + stride) % area;
        }
        it.done()?;
    } else {
        let mut it = factory::create_writable_rect(&mut raster, region)?;
        while !it.finished_lines() {
            it.start_pixels()?;
            while !it.finished_pixels() {
                let (x, y) = it.position();
                for (band, v) in px.iter_mut().enumerate() {
                    *v = value_at(x, y, band);
                }
                it.set_pixel_f64(&px);
                it.next_pixel()?;
            }
            it.next_line()?;
        }
        it.done()?;
    }

    if let Some(alpha_band) = args.premultiply {
        let mut it = factory::create_writable_rect(&mut raster, region)?;
        alpha::premultiply(&mut it, alpha_band, element_type).context("Premultiply failed")?;
    }

    let mut it = factory::create_rect(&raster, region)?;
    let (sums, pixels) = super::scan_sums(&mut it)?;
    let clipped: Rect = it.bounds();
    drop(it);

    println!("{}", super::describe(&raster));
    println!("  Region:     {}", clipped);
    println!("  Cursor:     {}", factory::CursorKind::select(raster.layout()));
    super::print_sums(&sums, pixels);
    if verbose || raster.stats().outstanding() > 0 {
        super::print_stats(&raster);
    }
    let outstanding = raster.stats().outstanding();
    if outstanding > 0 {
        bail!("{} write leases were never released", outstanding);
    }
    Ok(())
}

fn coprime_stride(n: u64) -> u64 {
    fn gcd(a: u64, b: u64) -> u64 {
        if b == 0 { a } else { gcd(b, a % b) }
    }
    let mut stride = (n / 2 + 1).max(1);
    while gcd(stride, n) != 1 {
        stride += 1;
    }
    stride
}
