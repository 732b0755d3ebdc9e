use std::{collections::BTreeMap, fmt::Debug, fs, path::Path};

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::{api::solcast::Forecasts, prelude::*};

/// Last successful forecast responses, per site.
#[derive(Default, Serialize, Deserialize)]
pub struct Cache {
    #[serde(default)]
    pub sites: BTreeMap<String, Entry>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Entry {
    pub fetched_at: DateTime<Local>,
    pub forecasts: Forecasts,
}

impl Entry {
    pub fn is_fresh(&self, now: DateTime<Local>, ttl: TimeDelta) -> bool {
        now - self.fetched_at < ttl
    }
}

impl Cache {
    /// Read the cache, falling back to an empty one if it is missing or unreadable.
    #[instrument(name = "Reading the cache…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Self {
        Self::read_fallibly_from(path.as_ref()).unwrap_or_else(|error| {
            error!("failed to read the cache: {error:#}");
            Self::default()
        })
    }

    fn read_fallibly_from(path: &Path) -> Result<Self> {
        if path.is_file() {
            Ok(toml::from_str(&fs::read_to_string(path)?)?)
        } else {
            Ok(Self::default())
        }
    }

    #[instrument(skip(self), name = "Writing the cache…")]
    pub fn write_to<P: AsRef<Path> + Debug>(&self, path: P) {
        if let Err(error) = self.write_fallibly_to(path.as_ref()) {
            error!("failed to write the cache: {error:#}");
        }
    }

    fn write_fallibly_to(&self, path: &Path) -> Result {
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}
