use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Error;

/// Average wingspan per species, in meters.
///
/// Read from `name: centimeters` lines; names are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WingspanTable {
    spans: HashMap<String, f32>,
}

impl WingspanTable {
    /// Parses the text format, skipping (and logging) lines it cannot read.
    pub fn parse(src: &str) -> Self {
        let mut spans = HashMap::new();

        for (lineno, line) in src.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((name, value)) = line.split_once(':') else {
                warn!(target: "wingspan", "line {}: expected `name: centimeters`, got {line:?}", lineno + 1);
                continue;
            };

            match value.trim().parse::<f32>() {
                Ok(cm) => {
                    spans.insert(name.trim().to_lowercase(), cm / 100.0);
                }
                Err(err) => {
                    warn!(target: "wingspan", "line {}: could not parse wingspan for {}: {err}", lineno + 1, name.trim());
                }
            }
        }

        Self { spans }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path.as_ref())?;
        let table = Self::parse(&src);
        info!(target: "wingspan", "loaded {} wingspans from {}", table.len(), path.as_ref().display());

        Ok(table)
    }

    /// Like [`Self::load`], but a missing or unreadable file gives an empty table.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(table) => table,
            Err(err) => {
                warn!(target: "wingspan", "{}: {err}, distance estimation disabled", path.as_ref().display());
                Self::default()
            }
        }
    }

    pub fn insert<S: AsRef<str>>(&mut self, species: S, meters: f32) {
        self.spans.insert(species.as_ref().to_lowercase(), meters);
    }

    #[inline]
    pub fn get(&self, species: &str) -> Option<f32> {
        self.spans.get(&species.to_lowercase()).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
