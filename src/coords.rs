use serde::Serialize;

use crate::ram;

// =============================================================================
// Screen Geometry
// =============================================================================

pub const RESOLUTION_WIDTH: i32 = 256;
pub const RESOLUTION_HEIGHT: i32 = 240;
pub const SPRITE_SIZE: i32 = 16;
pub const STATUS_BAR_HEIGHT: i32 = 2 * SPRITE_SIZE;

const PAGE_WIDTH: i32 = ram::PAGE_SIZE as i32;

/// Bucket edges at every multiple of 16 from 16 up to `extent - 16`.
const fn bin_edges<const N: usize>(extent: i32) -> [i32; N] {
    assert!(N as i32 == extent / SPRITE_SIZE - 1);
    let mut edges = [0i32; N];
    let mut i = 0;
    while i < N {
        edges[i] = (i as i32 + 1) * SPRITE_SIZE;
        i += 1;
    }
    edges
}

pub const X_BIN_EDGES: [i32; 15] = bin_edges(RESOLUTION_WIDTH);
pub const Y_BIN_EDGES: [i32; 14] = bin_edges(RESOLUTION_HEIGHT);

/// Integer pixel or cell coordinate. Which space it lives in depends on the
/// function that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Compose a level-absolute X from its page and in-page byte.
pub fn level_x(page: u8, sub: u8) -> i32 {
    (page as i32) * PAGE_WIDTH + sub as i32
}

/// Which of the two tile-map pages holds pixel column `x`.
pub fn screen_page(x: i32) -> usize {
    x.div_euclid(PAGE_WIDTH).rem_euclid(ram::NUM_SCREEN_PAGES as i32) as usize
}

/// Index of the bucket `value` falls into: the count of edges `<= value`.
pub fn digitize(value: i32, edges: &[i32]) -> i32 {
    edges.partition_point(|&edge| edge <= value) as i32
}

pub fn grid_bucket(p: Point) -> Point {
    Point::new(digitize(p.x, &X_BIN_EDGES), digitize(p.y, &Y_BIN_EDGES))
}

/// Row/column of a screen pixel relative to the area below the status bar.
/// The row is negative for pixels inside the status bar.
pub fn screen_tile_cell(x: i32, y: i32) -> (i32, i32) {
    (digitize(y, &Y_BIN_EDGES) - 2, digitize(x, &X_BIN_EDGES))
}

/// RAM address of the tile under pixel (x, y), or `None` when y is above or
/// below the 13 decoded rows.
pub fn tile_address(x: i32, y: i32) -> Option<usize> {
    let page = screen_page(x);
    let sub_x = x.rem_euclid(PAGE_WIDTH) / SPRITE_SIZE;
    let sub_y = (y - STATUS_BAR_HEIGHT).div_euclid(SPRITE_SIZE);
    if !(0..ram::TILE_ROWS as i32).contains(&sub_y) {
        return None;
    }
    Some(
        ram::TILE_BASE as usize
            + page * ram::TILE_PAGE_SIZE
            + sub_y as usize * ram::TILE_COLS
            + sub_x as usize,
    )
}
