//! Tests for decoding whole RAM snapshots.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use smb_ram_rl::coords::{X_BIN_EDGES, Y_BIN_EDGES, digitize, grid_bucket};
use smb_ram_rl::decoder::{GRID_COLS, GRID_ROWS, STATUS_BAR_ROWS};
use smb_ram_rl::ram;
use smb_ram_rl::{EnemyKind, Point, Snapshot, StaticTile, TileType, WorldState};

fn random_ram(rng: &mut SmallRng) -> Vec<u8> {
    let mut bytes = vec![0u8; ram::RAM_SIZE];
    rng.fill(bytes.as_mut_slice());
    bytes
}

// ============== Grid Shape ==============

#[test]
fn test_grid_shape_on_random_snapshots() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..200 {
        let bytes = random_ram(&mut rng);
        let snapshot = Snapshot::new(&bytes).unwrap();
        for grouped in [true, false] {
            let grid = snapshot.build_tile_grid_with(grouped);
            assert_eq!(grid.len(), GRID_ROWS);
            assert!(grid.iter().all(|row| row.len() == GRID_COLS));
            for row in &grid[..STATUS_BAR_ROWS] {
                assert!(row.iter().all(|&t| t == TileType::EMPTY));
            }
        }
    }
}

#[test]
fn test_grouped_grid_only_holds_markers() {
    let mut rng = SmallRng::seed_from_u64(11);
    for _ in 0..100 {
        let bytes = random_ram(&mut rng);
        let grid = Snapshot::new(&bytes).unwrap().build_tile_grid();
        for &tile in grid.iter().flatten() {
            assert!(
                matches!(
                    tile,
                    TileType::Static(StaticTile::Empty)
                        | TileType::Static(StaticTile::Fake)
                        | TileType::ENEMY
                        | TileType::PLAYER
                ),
                "unexpected {tile:?}"
            );
        }
    }
}

// ============== Tile Lookup ==============

#[test]
fn test_grouped_tile_at_never_returns_raw_nonzero() {
    let mut rng = SmallRng::seed_from_u64(3);
    let bytes = random_ram(&mut rng);
    let snapshot = Snapshot::new(&bytes).unwrap();
    for _ in 0..5_000 {
        let x = rng.random_range(-600..1200);
        let y = rng.random_range(-100..400);
        let grouped = snapshot.tile_at(x, y, true);
        assert!(grouped == 0 || grouped == StaticTile::Fake.byte());
        let raw = snapshot.tile_at(x, y, false);
        assert_eq!(grouped == 0, raw == 0);
    }
}

// ============== Enemies ==============

#[test]
fn test_enemy_buckets_match_digitized_location() {
    let mut rng = SmallRng::seed_from_u64(5);
    for _ in 0..200 {
        let bytes = random_ram(&mut rng);
        let enemies = Snapshot::new(&bytes).unwrap().locate_enemies();
        assert!(enemies.len() <= ram::MAX_ENEMIES);
        for enemy in &enemies {
            assert_eq!(enemy.kind, EnemyKind::Goomba);
            assert_eq!(
                enemy.grid_location,
                Point::new(
                    digitize(enemy.level_location.x, &X_BIN_EDGES),
                    digitize(enemy.level_location.y, &Y_BIN_EDGES)
                )
            );
        }
    }
}

#[test]
fn test_all_slots_drawn_yields_five_enemies() {
    let mut bytes = vec![0u8; ram::RAM_SIZE];
    for slot in 0..ram::MAX_ENEMIES {
        bytes[ram::ENEMY_DRAWN[slot] as usize] = 0xFF;
        bytes[ram::ENEMY_X_SCREEN[slot] as usize] = (slot * 40) as u8;
    }
    let enemies = Snapshot::new(&bytes).unwrap().locate_enemies();
    assert_eq!(enemies.len(), 5);
    assert_eq!(enemies[4].level_location, Point::new(160, 0));
}

#[test]
fn test_enemy_scenario_second_page() {
    let mut bytes = vec![0u8; ram::RAM_SIZE];
    bytes[ram::ENEMY_DRAWN[0] as usize] = 1;
    bytes[ram::ENEMY_X_PAGE[0] as usize] = 1;
    bytes[ram::ENEMY_X_SCREEN[0] as usize] = 16;
    bytes[ram::ENEMY_Y_SCREEN[0] as usize] = 32;
    let enemies = Snapshot::new(&bytes).unwrap().locate_enemies();
    assert_eq!(enemies[0].level_location, Point::new(272, 32));
    assert_eq!(enemies[0].grid_location, grid_bucket(Point::new(272, 32)));
}

// ============== Whole World ==============

#[test]
fn test_world_state_serializes() {
    let mut bytes = vec![0u8; ram::RAM_SIZE];
    bytes[ram::PLAYER_STATE as usize] = 1;
    bytes[ram::PLAYER_X_SCREEN_OFFSET as usize] = 64;
    bytes[ram::PLAYER_Y_SCREEN_OFFSET as usize] = 160;
    let snapshot = Snapshot::new(&bytes).unwrap();
    let world = WorldState::decode(&snapshot);

    let json = serde_json::to_value(&world).unwrap();
    assert_eq!(json["player_state"], "floating");
    assert_eq!(json["tiles"].as_array().unwrap().len(), GRID_ROWS);
    assert_eq!(
        json["tiles"][11][4],
        serde_json::json!({ "layer": "dynamic", "kind": "Mario" })
    );
}
