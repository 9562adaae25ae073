//! Behavioural properties shared by every cursor family.

use raster_core::{Element, ElementType, Error, Rect, TiledImage, TiledRaster};
use raster_iter::factory::{self, CursorKind};
use raster_iter::fallback::{RandomIterFallback, RectIterFallback, RookIterFallback};
use raster_iter::interleaved::{RectIterF32, RectIterF64, RectIterInterleaved, RectIterU8, RookIterU8};
use raster_iter::{RandomIter, RectIter, RookIter};

/// One raster configuration exercised by the property tests.
#[derive(Debug, Clone, Copy)]
struct Config {
    bounds: Rect,
    tile: (u32, u32),
    grid: (i32, i32),
    padding: (u32, u32),
    bands: usize,
    element_type: ElementType,
    banded: bool,
}

fn configs() -> Vec<Config> {
    let mut out = Vec::new();
    for element_type in [ElementType::U8, ElementType::F32, ElementType::F64] {
        for banded in [false, true] {
            out.push(Config {
                bounds: Rect::from_size(9, 7),
                tile: (4, 3),
                grid: (0, 0),
                padding: (0, 0),
                bands: 3,
                element_type,
                banded,
            });
            out.push(Config {
                bounds: Rect::new(-5, -3, 11, 8),
                tile: (3, 2),
                grid: (-7, -4),
                padding: (2, 1),
                bands: 2,
                element_type,
                banded,
            });
        }
    }
    out
}

fn value(cfg: &Config, x: i32, y: i32, b: usize) -> f64 {
    let v = ((x + 40) * 7 + (y + 40) * 13 + b as i32 * 29).rem_euclid(256) as f64;
    if cfg.element_type.is_float() { v * 0.125 - 3.0 } else { v }
}

fn build(cfg: &Config) -> TiledRaster {
    let mut raster = TiledRaster::builder(cfg.bounds)
        .tile_size(cfg.tile.0, cfg.tile.1)
        .grid_offset(cfg.grid.0, cfg.grid.1)
        .padding(cfg.padding.0, cfg.padding.1)
        .bands(cfg.bands)
        .element_type(cfg.element_type)
        .banded(cfg.banded)
        .build()
        .unwrap();
    let c = *cfg;
    raster.fill_with(|x, y, b| value(&c, x, y, b)).unwrap();
    raster
}

/// Row-major `(x, y, band, sample)` sequence of a forward scan.
fn forward_samples<I: RectIter>(it: &mut I) -> Vec<(i32, i32, usize, f64)> {
    let mut out = Vec::new();
    it.start_lines().unwrap();
    while !it.finished_lines() {
        it.start_pixels().unwrap();
        while !it.finished_pixels() {
            let (x, y) = it.position();
            it.start_bands();
            while !it.finished_bands() {
                out.push((x, y, it.band(), it.sample_f64()));
                it.next_band();
            }
            it.next_pixel().unwrap();
        }
        it.next_line().unwrap();
    }
    out
}

#[test]
fn test_cross_discipline_equivalence() {
    for cfg in configs() {
        let raster = build(&cfg);
        let bounds = Rect::new(cfg.bounds.x + 1, cfg.bounds.y, cfg.bounds.width - 2, cfg.bounds.height - 1);

        let mut rect = factory::create_rect(&raster, bounds).unwrap();
        let forward = forward_samples(&mut rect);
        assert_eq!(forward.len(), bounds.area() as usize * cfg.bands, "{cfg:?}");

        let mut random = factory::create_random(&raster, bounds).unwrap();
        let mut rook = factory::create_rook(&raster, bounds).unwrap();
        let mut backward = Vec::new();
        rook.end_lines().unwrap();
        while !rook.finished_lines_top() {
            rook.end_pixels().unwrap();
            while !rook.finished_pixels_left() {
                let (x, y) = rook.position();
                rook.end_bands();
                while !rook.finished_bands_top() {
                    backward.push((x, y, rook.band(), rook.sample_f64()));
                    rook.prev_band();
                }
                rook.prev_pixel().unwrap();
            }
            rook.prev_line().unwrap();
        }
        backward.reverse();
        assert_eq!(forward, backward, "{cfg:?}");

        for &(x, y, b, v) in &forward {
            assert_eq!(random.sample_f64(x, y, b).unwrap(), v, "{cfg:?} at ({x},{y}) band {b}");
            assert_eq!(v, raster.sample_f64(x, y, b).unwrap());
        }
    }
}

#[test]
fn test_tile_boundary_transparency() {
    for cfg in configs() {
        let raster = build(&cfg);
        let mut scan = RectIterFallback::new(&raster, cfg.bounds).unwrap();
        let mut random = RandomIterFallback::new(&raster, cfg.bounds).unwrap();
        let samples = forward_samples(&mut scan);

        let grid = raster.tile_grid();
        let crossings = samples
            .windows(2)
            .filter(|w| grid.x_to_tile_x(w[0].0) != grid.x_to_tile_x(w[1].0))
            .count();
        assert!(crossings > 0);

        for (x, y, b, v) in samples {
            let expected = random.sample_f64(x, y, b).unwrap();
            assert_eq!(v.to_bits(), expected.to_bits(), "{cfg:?} at ({x},{y}) band {b}");
        }
    }
}

#[test]
fn test_scan_fetches_once_per_tile_crossing() {
    // 7 lines, each crossing 3 tile columns
    for cfg in configs().iter().filter(|c| c.bounds == Rect::from_size(9, 7)) {
        let raster = build(cfg);

        raster.reset_requests();
        let mut it = RectIterFallback::new(&raster, cfg.bounds).unwrap();
        assert_eq!(forward_samples(&mut it).len(), 9 * 7 * cfg.bands);
        assert_eq!(raster.stats().requests, 21, "fallback {cfg:?}");

        raster.reset_requests();
        let mut it = factory::create_rect(&raster, cfg.bounds).unwrap();
        assert_eq!(it.kind().is_fast_path(), !cfg.banded);
        forward_samples(&mut it);
        assert_eq!(raster.stats().requests, 21, "{} {cfg:?}", it.kind());
    }
}

#[test]
fn test_jump_idempotence() {
    for cfg in configs() {
        let raster = build(&cfg);
        let b = cfg.bounds;
        let mut it = factory::create_rook(&raster, b).unwrap();
        for line in 0..b.height as i32 {
            for start in 0..b.width as i32 {
                it.start_lines().unwrap();
                it.jump_lines(line).unwrap();
                it.start_pixels().unwrap();
                it.jump_pixels(start).unwrap();
                let pos = it.position();
                let before = it.sample_band_f64(cfg.bands - 1);
                for n in -start..(b.width as i32 - start) {
                    it.jump_pixels(n).unwrap();
                    it.jump_pixels(-n).unwrap();
                    assert_eq!(it.position(), pos);
                    assert_eq!(it.sample_band_f64(cfg.bands - 1), before, "{cfg:?} n={n}");
                }
                for n in -line..(b.height as i32 - line) {
                    it.jump_lines(n).unwrap();
                    it.jump_lines(-n).unwrap();
                    assert_eq!(it.position(), pos);
                    assert_eq!(it.sample_band_f64(cfg.bands - 1), before);
                }
            }
        }
    }
}

fn assert_parity<T: Element>(raster: &TiledRaster) {
    let bounds = raster.bounds();
    let mut fast = RectIterInterleaved::<_, T>::new(raster, bounds).unwrap();
    let mut slow = RectIterFallback::new(raster, bounds).unwrap();
    while !slow.finished_lines() {
        slow.start_pixels().unwrap();
        fast.start_pixels().unwrap();
        while !slow.finished_pixels() {
            assert_eq!(fast.position(), slow.position());
            for b in 0..slow.num_bands() {
                assert_eq!(fast.sample_band_f64(b).to_bits(), slow.sample_band_f64(b).to_bits());
                assert_eq!(fast.sample_band_f32(b).to_bits(), slow.sample_band_f32(b).to_bits());
                assert_eq!(fast.sample_band(b), slow.sample_band(b));
                assert_eq!(fast.elem_band(b).to_f64(), slow.sample_band_f64(b));
            }
            fast.next_pixel().unwrap();
            slow.next_pixel().unwrap();
        }
        assert!(fast.finished_pixels());
        fast.next_line().unwrap();
        slow.next_line().unwrap();
    }
    assert!(fast.finished_lines());
}

#[test]
fn test_fast_path_fallback_parity() {
    for cfg in configs().into_iter().filter(|c| !c.banded) {
        let raster = build(&cfg);
        assert!(CursorKind::select(raster.layout()).is_fast_path());
        match cfg.element_type {
            ElementType::U8 => assert_parity::<u8>(&raster),
            ElementType::F32 => assert_parity::<f32>(&raster),
            ElementType::F64 => assert_parity::<f64>(&raster),
        }
    }
}

#[test]
fn test_fast_path_rejects_mismatched_layouts() {
    let banded = build(&configs().into_iter().find(|c| c.banded).unwrap());
    assert!(RectIterU8::new(&banded, banded.bounds()).err().unwrap().is_layout_error());

    let f64_raster = build(&Config {
        element_type: ElementType::F64,
        banded: false,
        ..configs()[0]
    });
    let err = RectIterF32::new(&f64_raster, f64_raster.bounds()).err().unwrap();
    assert!(matches!(err, Error::ElementTypeMismatch { .. }));
    assert!(RectIterF64::new(&f64_raster, f64_raster.bounds()).is_ok());
}

fn assert_jump_fails<I: RectIter>(mut it: I, lines: i32, pixels: i32) {
    let err = if lines != 0 {
        it.jump_lines(lines).unwrap_err()
    } else {
        it.jump_pixels(pixels).unwrap_err()
    };
    assert!(err.is_bounds_error(), "lines={lines} pixels={pixels}: {err}");
}

#[test]
fn test_out_of_bounds_signalling() {
    let cfg = configs()[1];
    let raster = build(&cfg);
    let bounds = Rect::new(-3, -2, 6, 4);
    let (w, h) = (bounds.width as i32, bounds.height as i32);

    let interleaved = build(&Config {
        element_type: ElementType::U8,
        banded: false,
        ..cfg
    });

    // from the first pixel: one before the start, one after the end
    for (lines, pixels) in [(-1, 0), (h, 0), (0, -1), (0, w)] {
        assert_jump_fails(RectIterFallback::new(&raster, bounds).unwrap(), lines, pixels);
        assert_jump_fails(RookIterU8::new(&interleaved, bounds).unwrap(), lines, pixels);
    }

    // from the last pixel
    let mut rook = RookIterFallback::new(&raster, bounds).unwrap();
    rook.end_lines().unwrap();
    rook.end_pixels().unwrap();
    assert_eq!(rook.position(), (bounds.max_x(), bounds.max_y()));
    for (lines, pixels) in [(1, 0), (-h, 0), (0, 1), (0, -w)] {
        let mut it = RookIterFallback::new(&raster, bounds).unwrap();
        it.end_lines().unwrap();
        it.end_pixels().unwrap();
        assert_jump_fails(it, lines, pixels);
    }

    // the edges themselves are reachable
    let mut it = RectIterFallback::new(&raster, bounds).unwrap();
    it.jump_lines(h - 1).unwrap();
    it.jump_pixels(w - 1).unwrap();
    assert_eq!(it.position(), (bounds.max_x(), bounds.max_y()));

    let mut random = RandomIterFallback::new(&raster, bounds).unwrap();
    for (x, y) in [
        (bounds.x - 1, bounds.y),
        (bounds.right(), bounds.y),
        (bounds.x, bounds.y - 1),
        (bounds.x, bounds.bottom()),
    ] {
        assert!(matches!(random.sample(x, y, 0), Err(Error::OutOfBounds { .. })), "({x},{y})");
    }
}

#[test]
fn test_bounds_clipped_to_image() {
    let cfg = configs()[0];
    let raster = build(&cfg);
    let it = RectIterFallback::new(&raster, Rect::new(-4, 5, 100, 100)).unwrap();
    assert_eq!(it.bounds(), Rect::new(0, 5, 9, 2));
}
