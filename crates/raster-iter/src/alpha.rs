//! Alpha premultiplication over a writable scan.
//!
//! Both functions walk the whole bounds of the cursor from the first line
//! and rewrite every colour band (every band except `alpha_band`) in
//! place. Integer elements are normalised by their unit value (255 for
//! `u8`), rounded and clamped to `0..=unit`; float elements are used as
//! stored.
//!
//! Unpremultiplying a pixel whose alpha is zero sets every colour band to
//! zero.

use raster_core::{ElementType, Error, Result};
use tracing::debug;

use crate::traits::WritableRectIter;

/// Multiplies every colour band by alpha.
pub fn premultiply<I>(it: &mut I, alpha_band: usize, element_type: ElementType) -> Result<()>
where
    I: WritableRectIter + ?Sized,
{
    coerce(it, alpha_band, element_type, |v, a| v * a)
}

/// Divides every colour band by alpha; zero alpha yields zero.
pub fn unpremultiply<I>(it: &mut I, alpha_band: usize, element_type: ElementType) -> Result<()>
where
    I: WritableRectIter + ?Sized,
{
    coerce(it, alpha_band, element_type, |v, a| if a == 0.0 { 0.0 } else { v / a })
}

fn coerce<I, F>(it: &mut I, alpha_band: usize, element_type: ElementType, op: F) -> Result<()>
where
    I: WritableRectIter + ?Sized,
    F: Fn(f64, f64) -> f64,
{
    let bands = it.num_bands();
    if alpha_band >= bands {
        return Err(Error::layout_mismatch(format!(
            "alpha band {alpha_band} out of range for {bands} bands"
        )));
    }
    let unit = element_type.unit();
    let integer = !element_type.is_float();
    debug!(bounds = %it.bounds(), alpha_band, element = %element_type, "Coercing alpha");

    it.start_lines()?;
    while !it.finished_lines() {
        it.start_pixels()?;
        while !it.finished_pixels() {
            let alpha = it.sample_band_f64(alpha_band) / unit;
            for band in (0..bands).filter(|&b| b != alpha_band) {
                let v = op(it.sample_band_f64(band), alpha);
                let v = if integer { v.round().clamp(0.0, unit) } else { v };
                it.set_sample_band_f64(band, v);
            }
            it.next_pixel()?;
        }
        it.next_line()?;
    }
    it.done()
}
