use serde::Serialize;

use crate::coords::{self, Point, SPRITE_SIZE};
use crate::error::DecodeError;
use crate::ram;
use crate::tiles::{EnemyKind, StaticTile, TileType};

// =============================================================================
// Grid Layout
// =============================================================================

pub const GRID_ROWS: usize = 15;
pub const GRID_COLS: usize = 16;
pub const STATUS_BAR_ROWS: usize = 2;

const ENEMY_OVERLAY_RADIUS: i32 = 8;
const ENEMY_OVERLAY_Y_SHIFT: i32 = 8;
const PLAYER_CELL_X_SHIFT: i32 = 12;
const PLAYER_CELL_Y_SHIFT: i32 = 16;

/// Identity stamped on every decoded enemy regardless of its type slot.
pub const DECODED_ENEMY_KIND: EnemyKind = EnemyKind::Goomba;

pub type TileGrid = [[TileType; GRID_COLS]; GRID_ROWS];

// =============================================================================
// Decoded Entities
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub raw_type: u8,
    pub level_location: Point,
    pub grid_location: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Grounded,
    Floating,
}

impl PlayerState {
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            PlayerState::Grounded
        } else {
            PlayerState::Floating
        }
    }
}

/// Everything decoded from one RAM snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct WorldState {
    pub player_level: Point,
    pub player_screen: Point,
    pub player_cell: (usize, usize),
    pub player_state: PlayerState,
    pub score: u32,
    pub enemies: Vec<Enemy>,
    pub tiles: TileGrid,
}

impl WorldState {
    pub fn decode(snapshot: &Snapshot<'_>) -> Self {
        Self::decode_with(snapshot, true)
    }

    pub fn decode_with(snapshot: &Snapshot<'_>, group_non_zero: bool) -> Self {
        Self {
            player_level: snapshot.locate_player_in_level(),
            player_screen: snapshot.locate_player_on_screen(),
            player_cell: snapshot.locate_player_grid_cell(),
            player_state: snapshot.classify_player_state(),
            score: snapshot.compute_score(),
            enemies: snapshot.locate_enemies(),
            tiles: snapshot.build_tile_grid_with(group_non_zero),
        }
    }
}

fn check_size(len: usize) -> Result<(), DecodeError> {
    if len != ram::RAM_SIZE {
        return Err(DecodeError::SnapshotSize {
            expected: ram::RAM_SIZE,
            actual: len,
        });
    }
    Ok(())
}

// =============================================================================
// Read-only Snapshot
// =============================================================================

/// Borrowed view of one 2 KiB RAM image.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    ram: &'a [u8],
}

impl<'a> Snapshot<'a> {
    pub fn new(ram: &'a [u8]) -> Result<Self, DecodeError> {
        check_size(ram.len())?;
        Ok(Self { ram })
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    pub fn locate_enemies(&self) -> Vec<Enemy> {
        let mut enemies = Vec::with_capacity(ram::MAX_ENEMIES);
        for slot in 0..ram::MAX_ENEMIES {
            if self.peek(ram::ENEMY_DRAWN[slot]) == 0 {
                continue;
            }
            let x = coords::level_x(
                self.peek(ram::ENEMY_X_PAGE[slot]),
                self.peek(ram::ENEMY_X_SCREEN[slot]),
            );
            let y = self.peek(ram::ENEMY_Y_SCREEN[slot]) as i32;
            let level_location = Point::new(x, y);
            enemies.push(Enemy {
                kind: DECODED_ENEMY_KIND,
                raw_type: self.peek(ram::ENEMY_TYPE[slot]),
                level_location,
                grid_location: coords::grid_bucket(level_location),
            });
        }
        enemies
    }

    pub fn locate_player_in_level(&self) -> Point {
        Point::new(
            coords::level_x(self.peek(ram::PLAYER_X_PAGE), self.peek(ram::PLAYER_X_SCREEN)),
            self.peek(ram::PLAYER_Y_SCREEN_OFFSET) as i32,
        )
    }

    pub fn locate_player_on_screen(&self) -> Point {
        let y_on_screen = self.peek(ram::PLAYER_Y_ON_SCREEN) as i32;
        let vertical = self.peek(ram::PLAYER_VERTICAL_SCREEN) as i32;
        Point::new(
            self.peek(ram::PLAYER_X_SCREEN_OFFSET) as i32,
            y_on_screen * vertical + SPRITE_SIZE,
        )
    }

    /// Row and column of the player, derived from the screen offset bytes
    /// rather than from the grid's own per-cell pixel positions.
    pub fn locate_player_grid_cell(&self) -> (usize, usize) {
        let y = self.peek(ram::PLAYER_Y_SCREEN_OFFSET) as i32 + PLAYER_CELL_Y_SHIFT;
        let x = self.peek(ram::PLAYER_X_SCREEN_OFFSET) as i32 + PLAYER_CELL_X_SHIFT;
        ((y / SPRITE_SIZE) as usize, (x / SPRITE_SIZE) as usize)
    }

    pub fn classify_player_state(&self) -> PlayerState {
        PlayerState::from_byte(self.peek(ram::PLAYER_STATE))
    }

    pub fn compute_score(&self) -> u32 {
        let mut multiplier = 10u32;
        let mut score = 0u32;
        for &addr in ram::SCORE_DIGITS.iter().rev() {
            score += self.peek(addr) as u32 * multiplier;
            multiplier *= 10;
        }
        score
    }

    /// Tile byte under level pixel (x, y). Off-map rows read as `Empty`; with
    /// `group_non_zero` every other nonzero byte reads as `Fake`.
    pub fn tile_at(&self, x: i32, y: i32, group_non_zero: bool) -> u8 {
        let Some(addr) = coords::tile_address(x, y) else {
            return StaticTile::Empty.byte();
        };
        let byte = self.ram[addr];
        if group_non_zero && byte != 0 {
            StaticTile::Fake.byte()
        } else {
            byte
        }
    }

    /// Raw tile byte at an offset from `origin`, shifted down one sprite.
    pub fn tile_near(&self, origin: Point, dx: i32, dy: i32) -> u8 {
        self.tile_at(origin.x + dx, origin.y + dy + SPRITE_SIZE, false)
    }

    pub fn build_tile_grid(&self) -> TileGrid {
        self.build_tile_grid_with(true)
    }

    pub fn build_tile_grid_with(&self, group_non_zero: bool) -> TileGrid {
        let x_start = self.locate_player_in_level().x - self.locate_player_on_screen().x;
        let enemies = self.locate_enemies();

        let mut grid = [[TileType::EMPTY; GRID_COLS]; GRID_ROWS];
        for (row, cells) in grid.iter_mut().enumerate().skip(STATUS_BAR_ROWS) {
            let y = row as i32 * SPRITE_SIZE;
            for (col, cell) in cells.iter_mut().enumerate() {
                let x = x_start + col as i32 * SPRITE_SIZE;
                let byte = self.tile_at(x, y, group_non_zero);
                *cell = StaticTile::recognize(byte)
                    .map(TileType::Static)
                    .unwrap_or(TileType::FAKE);
                if enemies.iter().any(|e| enemy_covers(e, x, y)) {
                    *cell = TileType::ENEMY;
                }
            }
        }

        let (row, col) = self.locate_player_grid_cell();
        if row >= STATUS_BAR_ROWS {
            if let Some(cell) = grid.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *cell = TileType::PLAYER;
            }
        }
        grid
    }
}

fn enemy_covers(enemy: &Enemy, x: i32, y: i32) -> bool {
    let ex = enemy.level_location.x;
    let ey = enemy.level_location.y + ENEMY_OVERLAY_Y_SHIFT;
    (x - ex).abs() <= ENEMY_OVERLAY_RADIUS && (y - ey).abs() <= ENEMY_OVERLAY_RADIUS
}

// =============================================================================
// Mutable Snapshot
// =============================================================================

/// Writable view over caller-owned RAM, for repositioning the player.
#[derive(Debug)]
pub struct SnapshotMut<'a> {
    ram: &'a mut [u8],
}

impl<'a> SnapshotMut<'a> {
    pub fn new(ram: &'a mut [u8]) -> Result<Self, DecodeError> {
        check_size(ram.len())?;
        Ok(Self { ram })
    }

    pub fn as_snapshot(&self) -> Snapshot<'_> {
        Snapshot { ram: &*self.ram }
    }

    pub fn poke(&mut self, addr: u16, value: u8) {
        self.ram[addr as usize] = value;
    }

    pub fn set_player_position(&mut self, x: u16, y: u8) {
        self.poke(ram::PLAYER_X_PAGE, (x / 256) as u8);
        self.poke(ram::PLAYER_X_SCREEN, (x % 256) as u8);
        self.poke(ram::PLAYER_Y_ON_SCREEN, y);
    }

    /// Moves the player and the screen offset right by `pixels`. Both the
    /// page byte and the offset byte wrap at 256.
    pub fn advance_screen_scrolling(&mut self, pixels: u16) {
        let snapshot = self.as_snapshot();
        let current_x = coords::level_x(
            snapshot.peek(ram::PLAYER_X_PAGE),
            snapshot.peek(ram::PLAYER_X_SCREEN),
        ) as u32;
        let offset = snapshot.peek(ram::PLAYER_X_SCREEN_OFFSET) as u32;

        let new_x = current_x + pixels as u32;
        self.poke(ram::PLAYER_X_PAGE, ((new_x / 256) % 256) as u8);
        self.poke(ram::PLAYER_X_SCREEN, (new_x % 256) as u8);
        self.poke(
            ram::PLAYER_X_SCREEN_OFFSET,
            ((offset + pixels as u32) % 256) as u8,
        );
    }
}
