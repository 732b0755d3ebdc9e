//! Obtaining the merged solar forecast, either live from Solcast or from pre-recorded responses.

mod cache;

use std::{fs, path::PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta};
use itertools::Itertools;

use self::cache::{Cache, Entry};
use crate::{
    api::solcast::{self, Estimate, Forecasts},
    core::series::ForecastSeries,
    prelude::*,
};

#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Get the forecast of all the configured sites merged into a single series.
    async fn get_series(&self) -> Result<ForecastSeries>;
}

/// Fetches the site forecasts from Solcast, reusing the cached responses while they are fresh.
#[derive(bon::Builder)]
pub struct LiveSource {
    api: solcast::Api,
    site_ids: Vec<String>,
    cache_path: PathBuf,
    ttl: TimeDelta,
    estimate: Estimate,
    now: DateTime<Local>,
}

#[async_trait]
impl ForecastSource for LiveSource {
    #[instrument(skip_all, name = "Getting the live forecast…", fields(n_sites = self.site_ids.len()))]
    async fn get_series(&self) -> Result<ForecastSeries> {
        ensure!(!self.site_ids.is_empty(), "at least one forecast site is required");
        let mut cache = Cache::read_from(&self.cache_path);
        let result = self.get_all_forecasts(&mut cache).await;
        cache.write_to(&self.cache_path);
        let all_forecasts = result?;
        let series = all_forecasts.iter().map(|forecasts| forecasts.to_series(self.estimate));
        Ok(ForecastSeries::try_merge(series)?)
    }
}

impl LiveSource {
    async fn get_all_forecasts(&self, cache: &mut Cache) -> Result<Vec<Forecasts>> {
        let mut all_forecasts = Vec::with_capacity(self.site_ids.len());
        for site_id in self.site_ids.iter().unique() {
            all_forecasts.push(self.get_forecasts(cache, site_id).await?);
        }
        Ok(all_forecasts)
    }

    async fn get_forecasts(&self, cache: &mut Cache, site_id: &str) -> Result<Forecasts> {
        if let Some(entry) = cache.sites.get(site_id)
            && entry.is_fresh(self.now, self.ttl)
        {
            info!(site_id, fetched_at = %entry.fetched_at, "using the cached forecast");
            return Ok(entry.forecasts.clone());
        }
        match self.api.get_forecasts(site_id).await {
            Ok(forecasts) => {
                let entry = Entry { fetched_at: self.now, forecasts: forecasts.clone() };
                cache.sites.insert(site_id.to_owned(), entry);
                Ok(forecasts)
            }
            Err(error) => {
                let Some(entry) = cache.sites.get(site_id) else {
                    return Err(error.context(format!("no forecast available for site `{site_id}`")));
                };
                warn!(
                    site_id,
                    fetched_at = %entry.fetched_at,
                    "failed to fetch the forecast, using the stale one: {error:#}",
                );
                Ok(entry.forecasts.clone())
            }
        }
    }
}

/// Reads pre-recorded Solcast responses instead of calling the API.
pub struct FileSource {
    paths: Vec<PathBuf>,
    estimate: Estimate,
}

impl FileSource {
    pub const fn new(paths: Vec<PathBuf>, estimate: Estimate) -> Self {
        Self { paths, estimate }
    }
}

#[async_trait]
impl ForecastSource for FileSource {
    #[instrument(skip_all, name = "Reading the forecast files…", fields(n_files = self.paths.len()))]
    async fn get_series(&self) -> Result<ForecastSeries> {
        ensure!(!self.paths.is_empty(), "at least one forecast file is required");
        let series = self
            .paths
            .iter()
            .map(|path| -> Result<ForecastSeries> {
                let body = fs::read_to_string(path)
                    .with_context(|| format!("failed to read `{}`", path.display()))?;
                let forecasts: Forecasts = serde_json::from_str(&body)
                    .with_context(|| format!("failed to parse `{}`", path.display()))?;
                info!(path = %path.display(), n_forecasts = forecasts.forecasts.len(), "read");
                Ok(forecasts.to_series(self.estimate))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ForecastSeries::try_merge(series)?)
    }
}
