use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::QTableConfig;
use crate::error::QTableError;

pub const STATE_VARIABLES: usize = 5;
/// Slot value for "nothing within vision range".
pub const TERMINAL_SENTINEL: u8 = 16;

pub const BACKUP_PREFIX: &str = "qTable_backup_";
const BACKUP_EXTENSION: &str = "json";

// =============================================================================
// Action Space
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    Right = 0,
    Jump = 1,
}

impl Action {
    pub const COUNT: usize = 2;
    pub const ALL: [Action; Self::COUNT] = [Action::Right, Action::Jump];

    pub fn from_index(i: usize) -> Result<Self, QTableError> {
        Self::ALL
            .get(i)
            .copied()
            .ok_or(QTableError::InvalidAction(i))
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub type ActionValues = [f64; Action::COUNT];

// =============================================================================
// Discretized State
// =============================================================================

/// Five bucketed observations. `Display` produces the persisted key form,
/// e.g. `(0, 3, 16, 1, 0)`, and `FromStr` reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscretizedState(pub [u8; STATE_VARIABLES]);

impl fmt::Display for DiscretizedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

impl FromStr for DiscretizedState {
    type Err = QTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QTableError::InvalidStateKey(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let mut values = [0u8; STATE_VARIABLES];
        let mut count = 0;
        for part in inner.split(',') {
            let slot = values.get_mut(count).ok_or_else(invalid)?;
            *slot = part.trim().parse().map_err(|_| invalid())?;
            count += 1;
        }
        if count != STATE_VARIABLES {
            return Err(invalid());
        }
        Ok(DiscretizedState(values))
    }
}

// =============================================================================
// Q-Table
// =============================================================================

/// Action values for every discretized state, materialized up front.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    entries: IndexMap<DiscretizedState, ActionValues>,
}

type RawTable = IndexMap<String, IndexMap<String, f64>>;

impl QTable {
    /// Every combination of slot values, each action valued at zero.
    pub fn initialize(config: &QTableConfig) -> Result<Self, QTableError> {
        config.validate()?;
        let values = config.state_values();
        let mut entries = IndexMap::with_capacity(config.expected_entries());
        let mut digits = [0usize; STATE_VARIABLES];

        'product: loop {
            entries.insert(
                DiscretizedState(digits.map(|d| values[d])),
                [0.0; Action::COUNT],
            );
            let mut pos = STATE_VARIABLES;
            loop {
                if pos == 0 {
                    break 'product;
                }
                pos -= 1;
                digits[pos] += 1;
                if digits[pos] < values.len() {
                    break;
                }
                digits[pos] = 0;
            }
        }

        debug!("Initialized Q-table with {} states", entries.len());
        Ok(Self { entries })
    }

    /// Reads a saved table, starting fresh when the file is missing, empty or
    /// not a valid table. Other I/O failures are returned so a trained table
    /// is never replaced by zeros.
    pub fn load<P: AsRef<Path>>(path: P, config: &QTableConfig) -> Result<Self, QTableError> {
        config.validate()?;
        let path = path.as_ref();
        match Self::read(path) {
            Ok(entries) if !entries.is_empty() => {
                if entries.len() != config.expected_entries() {
                    warn!(
                        "Q-table {} has {} states, expected {} for vision range {}",
                        path.display(),
                        entries.len(),
                        config.expected_entries(),
                        config.vision_range
                    );
                }
                info!("Loaded Q-table from {}", path.display());
                Ok(Self { entries })
            }
            Ok(_) => {
                warn!(
                    "Q-table file {} was empty, creating new one",
                    path.display()
                );
                Self::initialize(config)
            }
            Err(QTableError::Io { path, source })
                if !matches!(source.kind(), ErrorKind::NotFound | ErrorKind::InvalidData) =>
            {
                Err(QTableError::Io { path, source })
            }
            Err(err) => {
                warn!("Could not load Q-table ({err}), creating new one");
                Self::initialize(config)
            }
        }
    }

    fn read(path: &Path) -> Result<IndexMap<DiscretizedState, ActionValues>, QTableError> {
        let contents = fs::read_to_string(path).map_err(|e| QTableError::io(path, e))?;
        if contents.trim().is_empty() {
            return Ok(IndexMap::new());
        }
        let raw: RawTable = serde_json::from_str(&contents)?;

        let mut entries = IndexMap::with_capacity(raw.len());
        for (key, slots) in raw {
            let state: DiscretizedState = key.parse()?;
            if slots.len() != Action::COUNT {
                return Err(QTableError::MalformedEntry(key));
            }
            let mut values = [0.0; Action::COUNT];
            for (i, value) in values.iter_mut().enumerate() {
                *value = *slots
                    .get(i.to_string().as_str())
                    .ok_or_else(|| QTableError::MalformedEntry(key.clone()))?;
            }
            entries.insert(state, values);
        }
        Ok(entries)
    }

    /// Writes the whole table to `path`, replacing any previous content.
    /// The data goes to a sibling temp file first and is renamed into place.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), QTableError> {
        let path = path.as_ref();
        let tmp = temp_path(path);
        let file = File::create(&tmp).map_err(|e| QTableError::io(&tmp, e))?;
        self.write_or_remove(file, &tmp)?;
        fs::rename(&tmp, path).map_err(|e| QTableError::io(path, e))?;
        info!("Saved Q-table to {}", path.display());
        Ok(())
    }

    /// Writes a copy into `dir` under the lowest free `qTable_backup_<N>.json`.
    pub fn backup<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, QTableError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| QTableError::io(dir, e))?;
        let mut taken = backup_indices(dir)?;

        let mut index = 0u64;
        loop {
            while taken.contains(&index) {
                index += 1;
            }
            let path = dir.join(backup_file_name(index));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    self.write_or_remove(file, &path)?;
                    info!("Backed up Q-table to {}", path.display());
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} appeared concurrently, trying next", path.display());
                    taken.insert(index);
                }
                Err(err) => return Err(QTableError::io(path, err)),
            }
        }
    }

    /// Writes the table into `file`, deleting `path` if anything fails.
    fn write_or_remove(&self, file: File, path: &Path) -> Result<(), QTableError> {
        let result = self.write_to(file, path);
        if result.is_err() {
            let _ = fs::remove_file(path);
        }
        result
    }

    fn write_to(&self, file: File, path: &Path) -> Result<(), QTableError> {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|e| QTableError::io(path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| QTableError::io(path, e))
    }

    /// One-step temporal-difference update of `(state, action)`; returns the
    /// new value. Both states must already be in the table.
    pub fn update(
        &mut self,
        state: &DiscretizedState,
        next_state: &DiscretizedState,
        action: Action,
        gamma: f64,
        alpha: f64,
        reward: f64,
    ) -> Result<f64, QTableError> {
        let next_max = self
            .values(next_state)?
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let slots = self
            .entries
            .get_mut(state)
            .ok_or_else(|| QTableError::UnknownState(state.to_string()))?;

        let current = slots[action.index()];
        let new_value = current + alpha * (reward + gamma * next_max - current);
        slots[action.index()] = new_value;
        Ok(new_value)
    }

    pub fn values(&self, state: &DiscretizedState) -> Result<&ActionValues, QTableError> {
        self.entries
            .get(state)
            .ok_or_else(|| QTableError::UnknownState(state.to_string()))
    }

    /// Highest-valued action; ties go to the lower index.
    pub fn best_action(&self, state: &DiscretizedState) -> Result<Action, QTableError> {
        let values = self.values(state)?;
        let mut best = Action::ALL[0];
        for action in Action::ALL.into_iter().skip(1) {
            if values[action.index()] > values[best.index()] {
                best = action;
            }
        }
        Ok(best)
    }

    pub fn contains(&self, state: &DiscretizedState) -> bool {
        self.entries.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DiscretizedState, &ActionValues)> {
        self.entries.iter()
    }
}

struct ActionSlots<'a>(&'a ActionValues);

impl Serialize for ActionSlots<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, value) in self.0.iter().enumerate() {
            map.serialize_entry(&i.to_string(), value)?;
        }
        map.end()
    }
}

impl Serialize for QTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (state, values) in &self.entries {
            map.serialize_entry(&state.to_string(), &ActionSlots(values))?;
        }
        map.end()
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

pub fn backup_file_name(index: u64) -> String {
    format!("{BACKUP_PREFIX}{index}.{BACKUP_EXTENSION}")
}

fn backup_indices(dir: &Path) -> Result<BTreeSet<u64>, QTableError> {
    let mut taken = BTreeSet::new();
    for entry in fs::read_dir(dir).map_err(|e| QTableError::io(dir, e))? {
        let entry = entry.map_err(|e| QTableError::io(dir, e))?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_prefix(BACKUP_PREFIX))
            .and_then(|n| n.strip_suffix(BACKUP_EXTENSION))
            .and_then(|n| n.strip_suffix('.'))
            .and_then(|n| n.parse::<u64>().ok().filter(|i| i.to_string() == n));
        if let Some(index) = index {
            taken.insert(index);
        }
    }
    Ok(taken)
}
