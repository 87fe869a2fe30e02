//! Output file naming.

use crate::error::{EstimationError, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Suffix of the statistics table file.
pub const STATS_SUFFIX: &str = "_stats.tsv";
/// Extension of the plot file.
pub const PLOT_EXTENSION: &str = "svg";

/// Turns entity identifiers into file stems.
///
/// Every character that is neither a word character nor whitespace becomes
/// `_`, so `sp|P12345|ALBU_HUMAN` is written as `sp_P12345_ALBU_HUMAN`.
#[derive(Debug, Clone)]
pub struct StemSanitizer {
    pattern: Regex,
}

impl StemSanitizer {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r"[^\w\s]")
            .map_err(|e| EstimationError::InvalidParameter(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// File stem for an entity.
    pub fn stem(&self, entity: &str) -> String {
        self.pattern.replace_all(entity, "_").into_owned()
    }

    /// Plot and stats paths for an entity inside `output_dir`.
    pub fn output_paths(&self, output_dir: &Path, entity: &str) -> OutputPaths {
        OutputPaths::new(output_dir, &self.stem(entity))
    }

    /// Groups of distinct entities that map to the same stem.
    ///
    /// Only stems shared by two or more entities are returned.
    pub fn collisions<'a, I>(&self, entities: I) -> Vec<(String, Vec<String>)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_stem: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entity in entities {
            let ids = by_stem.entry(self.stem(entity)).or_default();
            if !ids.iter().any(|id| id == entity) {
                ids.push(entity.to_string());
            }
        }
        by_stem.into_iter().filter(|(_, ids)| ids.len() > 1).collect()
    }

    /// Unique file stem for every distinct entity.
    ///
    /// Entities are visited in sorted order. The first entity with a given
    /// stem keeps it; later ones get `<stem>_2`, `<stem>_3`, ..., skipping
    /// any stem that another entity produces on its own.
    pub fn assign_stems<'a, I>(&self, entities: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: BTreeSet<&str> = entities.into_iter().collect();
        let natural: Vec<(&str, String)> = ids.into_iter().map(|id| (id, self.stem(id))).collect();
        let mut reserved: BTreeSet<String> = natural.iter().map(|(_, stem)| stem.clone()).collect();
        let mut claimed: BTreeSet<String> = BTreeSet::new();

        let mut stems = BTreeMap::new();
        for (id, stem) in natural {
            let unique = if claimed.insert(stem.clone()) {
                stem
            } else {
                let mut n = 2;
                loop {
                    let candidate = format!("{}_{}", stem, n);
                    if reserved.insert(candidate.clone()) {
                        claimed.insert(candidate.clone());
                        break candidate;
                    }
                    n += 1;
                }
            };
            stems.insert(id.to_string(), unique);
        }
        stems
    }
}

/// Sanitize a single entity identifier into a file stem.
pub fn sanitize_file_stem(entity: &str) -> Result<String> {
    Ok(StemSanitizer::new()?.stem(entity))
}

/// Files written for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub plot: PathBuf,
    pub stats: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, stem: &str) -> Self {
        Self {
            plot: output_dir.join(format!("{}.{}", stem, PLOT_EXTENSION)),
            stats: output_dir.join(format!("{}{}", stem, STATS_SUFFIX)),
        }
    }
}
