//! Write-lease accounting and tile-source interaction.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use raster_core::{ElementLayout, ElementType, Error, Rect, Tile, TiledImage, TiledRaster, WritableTiledImage};
use raster_iter::factory;
use raster_iter::fallback::RectIterFallback;
use raster_iter::interleaved::RectIterU8;
use raster_iter::writable::{WritableRandomIterFallback, WritableRandomIterU8, WritableRectIterF64};
use raster_iter::{RandomIter, RectIter, WritableRandomIter, WritableRectIter};

fn raster(banded: bool) -> TiledRaster {
    TiledRaster::builder(Rect::new(-6, -4, 20, 13))
        .tile_size(4, 3)
        .grid_offset(-8, -5)
        .bands(2)
        .banded(banded)
        .build()
        .unwrap()
}

/// Deterministic coordinate walk that keeps jumping between tiles.
fn walk(bounds: Rect, steps: usize) -> Vec<(i32, i32)> {
    let mut state = 0x2545_f491_u32;
    (0..steps)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let x = bounds.x + (state % bounds.width) as i32;
            let y = bounds.y + ((state / bounds.width) % bounds.height) as i32;
            (x, y)
        })
        .collect()
}

fn tile_switches(raster: &TiledRaster, coords: &[(i32, i32)]) -> usize {
    let grid = raster.tile_grid();
    let mut last = None;
    let mut switches = 0;
    for &(x, y) in coords {
        let tile = (grid.x_to_tile_x(x), grid.y_to_tile_y(y));
        if last != Some(tile) {
            switches += 1;
            last = Some(tile);
        }
    }
    switches
}

#[test]
fn test_random_write_lease_balance() {
    for banded in [false, true] {
        let mut r = raster(banded);
        let bounds = r.bounds();
        let coords = walk(bounds, 300);
        let expected = tile_switches(&r, &coords);
        let distinct: HashSet<_> = coords
            .iter()
            .map(|&(x, y)| (r.tile_grid().x_to_tile_x(x), r.tile_grid().y_to_tile_y(y)))
            .collect();
        // the walk revisits tiles after leaving them
        assert!(expected > distinct.len());

        {
            let mut it = factory::create_writable_random(&mut r, bounds).unwrap();
            for (i, &(x, y)) in coords.iter().enumerate() {
                it.set_pixel(x, y, &[i as i32 % 256, (x + y).rem_euclid(256)]).unwrap();
            }
            it.done().unwrap();
            it.done().unwrap();
        }

        let stats = r.stats();
        assert_eq!(stats.checkouts, expected, "banded={banded}");
        assert_eq!(stats.releases, stats.checkouts);
        assert!(distinct.iter().all(|&(tx, ty)| !r.is_leased(tx, ty)));

        let (x, y) = coords[coords.len() - 1];
        assert_eq!(r.sample_f64(x, y, 1).unwrap(), (x + y).rem_euclid(256) as f64);
    }
}

#[test]
fn test_typed_and_fallback_writers_agree() {
    let mut a = raster(false);
    let mut b = raster(false);
    let bounds = Rect::new(-5, -2, 15, 9);
    let coords = walk(bounds, 120);
    {
        let mut fast = WritableRandomIterU8::new(&mut a, bounds).unwrap();
        let mut slow = WritableRandomIterFallback::new(&mut b, bounds).unwrap();
        for (i, &(x, y)) in coords.iter().enumerate() {
            fast.set_elem(x, y, 1, i as u8).unwrap();
            slow.set_sample(x, y, 1, i as i32).unwrap();
        }
        fast.done().unwrap();
        slow.done().unwrap();
    }
    assert_eq!(a.stats().checkouts, b.stats().checkouts);
    for (x, y) in bounds.iter_coords() {
        assert_eq!(a.sample_f64(x, y, 1).unwrap(), b.sample_f64(x, y, 1).unwrap(), "({x},{y})");
    }
}

#[test]
fn test_scan_releases_on_finish() {
    let mut r = TiledRaster::builder(Rect::from_size(10, 10))
        .tile_size(4, 4)
        .element_type(ElementType::F64)
        .build()
        .unwrap();
    let bounds = r.bounds();
    {
        let mut it = WritableRectIterF64::new(&mut r, bounds).unwrap();
        while !it.finished_lines() {
            it.start_pixels().unwrap();
            while !it.finished_pixels() {
                let (x, y) = it.position();
                it.set_sample_f64((x * y) as f64);
                it.next_pixel().unwrap();
            }
            it.next_line().unwrap();
        }
        // nothing left to hand back
        it.done().unwrap();
    }
    let stats = r.stats();
    assert_eq!(stats.outstanding(), 0);
    assert_eq!(r.sample_f64(9, 7, 0).unwrap(), 63.0);
}

#[test]
fn test_read_of_leased_tile_is_refused() {
    let mut r = raster(false);
    let tile = r.checkout_tile(0, 0).unwrap();
    let err = r.tile(0, 0).unwrap_err();
    assert!(matches!(err, Error::TileCheckedOut { tile_x: 0, tile_y: 0 }));
    assert!(r.checkout_tile(0, 0).unwrap_err().is_lease_error());
    r.release_tile(0, 0, tile).unwrap();
    let refused = r
        .release_tile(0, 0, Tile::new(r.layout().allocate(4, 3), 0, 0))
        .unwrap_err();
    assert!(matches!(refused.error, Error::LeaseNotHeld { .. }));
}

#[test]
fn test_loader_tiles_and_fetch_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    // loader tiles carry a 2-pixel margin on the left
    let wide = TiledRaster::builder(Rect::from_size(8, 8))
        .tile_size(4, 4)
        .padding(2, 0)
        .loader(move |tx, ty| {
            seen.fetch_add(1, Ordering::Relaxed);
            if (tx, ty) == (1, 1) {
                return Err(Error::tile_fetch(tx, ty, "disk on fire"));
            }
            let layout = ElementLayout::interleaved(ElementType::U8, 1, 6)?;
            let mut data = layout.allocate(6, 4);
            for i in 0..24 {
                data.set_i32(0, i, tx * 10 + ty);
            }
            Ok(Tile::new(data, tx * 4 - 2, ty * 4))
        })
        .build()
        .unwrap();

    let mut it = factory::create_rect(&wide, wide.bounds()).unwrap();
    assert_eq!(it.sample(), 0);
    it.jump_pixels(5).unwrap();
    assert_eq!(it.sample(), 10);
    it.jump_lines(3).unwrap();
    assert_eq!(it.sample(), 10);
    let err = it.next_line().unwrap_err();
    assert!(matches!(err, Error::TileFetch { tile_x: 1, tile_y: 1, .. }));
    assert_eq!(calls.load(Ordering::Relaxed), 3);

    let mut random = factory::create_random(&wide, wide.bounds()).unwrap();
    assert_eq!(random.sample(0, 7, 0).unwrap(), 1);
    assert_eq!(random.sample(7, 0, 0).unwrap(), 10);
    assert_eq!(wide.stats().loads, 4);
}

/// Two 4x4 tiles side by side; the first fetch of tile column 1 fails.
fn flaky_raster() -> TiledRaster {
    let failures = Arc::new(AtomicUsize::new(1));
    TiledRaster::builder(Rect::from_size(8, 4))
        .tile_size(4, 4)
        .bands(2)
        .loader(move |tx, ty| {
            let fail = tx == 1
                && failures
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                    .is_ok();
            if fail {
                return Err(Error::tile_fetch(tx, ty, "transient"));
            }
            let layout = ElementLayout::interleaved(ElementType::U8, 2, 4)?;
            let mut data = layout.allocate(4, 4);
            for i in 0..32 {
                data.set_i32(0, i, tx * 10 + (i % 2) as i32);
            }
            Ok(Tile::new(data, tx * 4, ty * 4))
        })
        .build()
        .unwrap()
}

fn recover_after_failed_step(it: &mut dyn RectIter) {
    it.jump_pixels(3).unwrap();
    assert_eq!(it.sample_band(1), 1);

    let err = it.next_pixel().unwrap_err();
    assert!(matches!(err, Error::TileFetch { tile_x: 1, tile_y: 0, .. }));

    // back into the held tile
    it.jump_pixels(-1).unwrap();
    assert_eq!(it.position(), (3, 0));
    assert_eq!(it.sample_band(0), 0);

    it.next_pixel().unwrap();
    assert_eq!(it.sample_band(0), 10);
    assert_eq!(it.sample_band(1), 11);

    it.start_pixels().unwrap();
    assert_eq!(it.sample_band(1), 1);
}

#[test]
fn test_reposition_after_fetch_failure() {
    let r = flaky_raster();
    let mut it = RectIterFallback::new(&r, r.bounds()).unwrap();
    recover_after_failed_step(&mut it);

    let r = flaky_raster();
    let mut it = RectIterU8::new(&r, r.bounds()).unwrap();
    recover_after_failed_step(&mut it);
    assert_eq!(r.stats().loads, 3);
}
