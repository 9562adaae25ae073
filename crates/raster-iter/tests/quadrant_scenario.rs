//! 4x4 image in 2x2 tiles, three interleaved `u8` bands, two tiles filled.

use raster_core::{Rect, TiledImage, TiledRaster};
use raster_iter::factory::{self, CursorKind};
use raster_iter::fallback::RectIterFallback;
use raster_iter::interleaved::{RandomIterU8, RectIterU8};
use raster_iter::{RandomIter, RectIter};

fn quadrants() -> TiledRaster {
    let mut raster = TiledRaster::builder(Rect::from_size(4, 4))
        .tile_size(2, 2)
        .bands(3)
        .build()
        .unwrap();
    raster.fill_tile(0, 0, &[10.0, 20.0, 30.0]).unwrap();
    raster.fill_tile(1, 1, &[40.0, 50.0, 60.0]).unwrap();
    raster
}

fn expected(x: i32, y: i32) -> [i32; 3] {
    match (x < 2, y < 2) {
        (true, true) => [10, 20, 30],
        (false, false) => [40, 50, 60],
        _ => [0, 0, 0],
    }
}

fn scan<I: RectIter>(mut it: I) -> Vec<((i32, i32), [i32; 3])> {
    let mut out = Vec::new();
    while !it.finished_lines() {
        it.start_pixels().unwrap();
        while !it.finished_pixels() {
            let mut px = [0; 3];
            it.pixel(&mut px);
            out.push((it.position(), px));
            it.next_pixel().unwrap();
        }
        it.next_line().unwrap();
    }
    out
}

#[test]
fn test_row_major_scan_reports_quadrants() {
    let raster = quadrants();
    let bounds = raster.bounds();
    assert_eq!(CursorKind::select(raster.layout()), CursorKind::U8);

    let fast = scan(RectIterU8::new(&raster, bounds).unwrap());
    let slow = scan(RectIterFallback::new(&raster, bounds).unwrap());
    let chosen = scan(factory::create_rect(&raster, bounds).unwrap());
    assert_eq!(fast, slow);
    assert_eq!(fast, chosen);

    let order: Vec<_> = fast.iter().map(|&(pos, _)| pos).collect();
    let row_major: Vec<_> = bounds.iter_coords().collect();
    assert_eq!(order, row_major);

    let mut random = RandomIterU8::new(&raster, bounds).unwrap();
    for ((x, y), px) in fast {
        assert_eq!(px, expected(x, y), "({x},{y})");
        let mut direct = [0; 3];
        random.pixel(x, y, &mut direct).unwrap();
        assert_eq!(direct, px);
    }
}

#[test]
fn test_top_left_quadrant_needs_one_tile() {
    let raster = quadrants();
    raster.reset_requests();
    let pixels = scan(RectIterU8::new(&raster, Rect::from_size(2, 2)).unwrap());
    assert_eq!(pixels.len(), 4);
    assert!(pixels.iter().all(|&(_, px)| px == [10, 20, 30]));
    assert_eq!(raster.stats().requests, 1);
}
