//! Hero lookup
//!
//! The dashboard asks a `HeroSource` for the current attributes of a hero.
//! `SnapshotSource` serves them from a JSON-lines export, one hero per line.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::DatasetError;
use crate::logic::features::HeroRecord;

pub trait HeroSource: Send + Sync {
    fn hero(&self, id: u64) -> Result<HeroRecord, DatasetError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    heroes: HashMap<u64, HeroRecord>,
}

impl SnapshotSource {
    pub fn from_records(records: impl IntoIterator<Item = HeroRecord>) -> Self {
        Self {
            heroes: records.into_iter().map(|h| (h.id, h)).collect(),
        }
    }

    /// Read a JSON-lines snapshot; blank lines are skipped, later duplicates win
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let reader = BufReader::new(File::open(path)?);
        let mut heroes = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let hero: HeroRecord =
                serde_json::from_str(&line).map_err(|source| DatasetError::Json { line: i + 1, source })?;
            heroes.insert(hero.id, hero);
        }

        log::info!("Loaded {} heroes from {}", heroes.len(), path.display());
        Ok(Self { heroes })
    }

    /// Write heroes as JSON lines, sorted by id
    pub fn write(&self, path: &Path) -> Result<(), DatasetError> {
        let mut writer = BufWriter::new(File::create(path)?);
        let mut ids: Vec<&u64> = self.heroes.keys().collect();
        ids.sort();
        for id in ids {
            let json = serde_json::to_string(&self.heroes[id])
                .map_err(|source| DatasetError::Json { line: 0, source })?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl HeroSource for SnapshotSource {
    fn hero(&self, id: u64) -> Result<HeroRecord, DatasetError> {
        self.heroes.get(&id).cloned().ok_or(DatasetError::UnknownHero(id))
    }

    fn len(&self) -> usize {
        self.heroes.len()
    }
}
