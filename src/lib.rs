pub mod config;
pub mod coords;
pub mod decoder;
pub mod error;
pub mod qtable;
pub mod ram;
pub mod tiles;

pub use config::{LearningConfig, QTableConfig};
pub use coords::Point;
pub use decoder::{Enemy, PlayerState, Snapshot, SnapshotMut, TileGrid, WorldState};
pub use error::{DecodeError, QTableError};
pub use qtable::{Action, DiscretizedState, QTable, TERMINAL_SENTINEL};
pub use tiles::{DynamicTile, EnemyKind, StaticTile, TileType};
