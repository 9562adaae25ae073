//! Parallel processing over tile-row strips using Rayon.
//!
//! Cursors are single-threaded. To use several threads, split the bounds
//! into horizontal strips aligned to tile rows and give each thread its
//! own cursor over one strip. Strips never share a tile row, so two
//! threads never bind the same tile.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Rect, TiledRaster};
//! use raster_iter::parallel;
//!
//! let mut raster = TiledRaster::builder(Rect::from_size(100, 70))
//!     .tile_size(32, 32)
//!     .bands(2)
//!     .build()?;
//! raster.fill_with(|_, _, b| (b + 1) as f64)?;
//!
//! let sums = parallel::sum_bands(&raster, Rect::from_size(100, 70))?;
//! assert_eq!(sums, vec![7000.0, 14000.0]);
//! # Ok::<(), raster_core::Error>(())
//! ```

use rayon::prelude::*;
use raster_core::{Rect, Result, TiledImage};
use tracing::debug;

use crate::factory;
use crate::scan::resolve_bounds;
use crate::traits::RectIter;

/// Splits `bounds` into strips that follow the tile rows of `source`.
///
/// `bounds` is clipped to the image first.
///
/// # Errors
///
/// [`Error::InvalidRegion`](raster_core::Error::InvalidRegion) if `bounds`
/// misses the image.
pub fn strips<S: TiledImage + ?Sized>(source: &S, bounds: Rect) -> Result<Vec<Rect>> {
    let region = resolve_bounds(source.bounds(), bounds)?;
    let grid = source.tile_grid();
    let (_, (first, last)) = grid.tile_span(&region);
    let strips = (first..=last)
        .filter_map(|ty| {
            let (start, end) = grid.tile_y_range(ty);
            let row = Rect::new(region.x, start, region.width, (end - start + 1) as u32);
            row.intersect(&region)
        })
        .collect();
    Ok(strips)
}

/// Runs `f` on every strip of `bounds` in parallel.
///
/// Each call receives a strip rectangle and should build its own cursor
/// over it. The first error returned by any strip is propagated.
pub fn for_each_strip<S, F>(source: &S, bounds: Rect, f: F) -> Result<()>
where
    S: TiledImage + Sync + ?Sized,
    F: Fn(&S, Rect) -> Result<()> + Sync + Send,
{
    let strips = strips(source, bounds)?;
    debug!(%bounds, strips = strips.len(), threads = rayon::current_num_threads(), "Processing strips");
    strips.into_par_iter().try_for_each(|strip| f(source, strip))
}

/// Maps every strip of `bounds` in parallel, keeping strip order.
pub fn map_strips<S, T, F>(source: &S, bounds: Rect, f: F) -> Result<Vec<T>>
where
    S: TiledImage + Sync + ?Sized,
    T: Send,
    F: Fn(&S, Rect) -> Result<T> + Sync + Send,
{
    let strips = strips(source, bounds)?;
    debug!(%bounds, strips = strips.len(), threads = rayon::current_num_threads(), "Mapping strips");
    strips.into_par_iter().map(|strip| f(source, strip)).collect()
}

/// Sums every band over `bounds`, one cursor per strip.
pub fn sum_bands<S: TiledImage + Sync + ?Sized>(source: &S, bounds: Rect) -> Result<Vec<f64>> {
    let bands = source.num_bands();
    let partials = map_strips(source, bounds, |src, strip| {
        let mut sums = vec![0.0; bands];
        let mut it = factory::create_rect(src, strip)?;
        while !it.finished_lines() {
            it.start_pixels()?;
            while !it.finished_pixels() {
                for (band, sum) in sums.iter_mut().enumerate() {
                    *sum += it.sample_band_f64(band);
                }
                it.next_pixel()?;
            }
            it.next_line()?;
        }
        Ok(sums)
    })?;

    Ok(partials.into_iter().fold(vec![0.0; bands], |mut acc, part| {
        for (a, p) in acc.iter_mut().zip(part) {
            *a += p;
        }
        acc
    }))
}
