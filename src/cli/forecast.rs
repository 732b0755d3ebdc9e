use std::path::PathBuf;

use chrono::{DateTime, Local, TimeDelta, Timelike};
use clap::Parser;
use reqwest::Url;

use crate::{
    api::solcast::{self, Estimate},
    cli::SystemArgs,
    core::excess::ExcessProfile,
    forecast::{FileSource, ForecastSource, LiveSource},
    prelude::*,
    tables::build_forecast_table,
};

#[must_use]
#[derive(Parser)]
pub struct ForecastArgs {
    /// Solcast rooftop site IDs, the forecasts get summed up.
    #[clap(long = "solcast-site-ids", env = "SOLCAST_SITE_IDS", value_delimiter = ',')]
    pub site_ids: Vec<String>,

    #[clap(long = "solcast-api-key", env = "SOLCAST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[clap(
        id = "solcast_base_url",
        long = "solcast-api-base-url",
        env = "SOLCAST_API_BASE_URL",
        default_value = solcast::Api::DEFAULT_BASE_URL,
    )]
    pub base_url: Url,

    /// Forecast percentile to plan against.
    #[clap(long = "forecast-estimate", env = "FORECAST_ESTIMATE", default_value = "p90")]
    pub estimate: Estimate,

    #[clap(long = "forecast-cache-path", env = "FORECAST_CACHE_PATH", default_value = "solcast-cache.toml")]
    pub cache_path: PathBuf,

    /// Cached site forecasts younger than this are reused instead of calling the API.
    #[clap(long = "forecast-cache-ttl", env = "FORECAST_CACHE_TTL", default_value = "4h")]
    pub cache_ttl: humantime::Duration,

    /// Read pre-recorded Solcast responses instead of calling the API, may be repeated.
    #[clap(long = "forecast-file", env = "FORECAST_FILES", value_delimiter = ',')]
    pub files: Vec<PathBuf>,
}

impl ForecastArgs {
    pub fn source(&self, now: DateTime<Local>) -> Result<Box<dyn ForecastSource>> {
        if !self.files.is_empty() {
            return Ok(Box::new(FileSource::new(self.files.clone(), self.estimate)));
        }
        let api_key = self
            .api_key
            .as_deref()
            .context("Solcast API key is required unless forecast files are given")?;
        ensure!(!self.site_ids.is_empty(), "at least one Solcast site ID is required");
        let ttl = TimeDelta::from_std(self.cache_ttl.into()).context("cache TTL is too large")?;
        let source = LiveSource::builder()
            .api(solcast::Api::try_new(api_key, self.base_url.clone())?)
            .site_ids(self.site_ids.clone())
            .cache_path(self.cache_path.clone())
            .ttl(ttl)
            .estimate(self.estimate)
            .now(now)
            .build();
        Ok(Box::new(source))
    }
}

#[derive(Parser)]
pub struct ShowForecastArgs {
    #[clap(flatten)]
    pub forecast: ForecastArgs,

    #[clap(flatten)]
    pub system: SystemArgs,
}

#[instrument(skip_all)]
pub async fn show_forecast(args: &ShowForecastArgs) -> Result {
    let parameters = args.system.parameters()?;
    let now = Local::now();
    let now = now.with_nanosecond(0).unwrap_or(now);

    let series = args.forecast.source(now)?.get_series().await?;
    series.validate()?;
    info!(len = series.len(), "fetched the forecast");

    let profile = ExcessProfile::new(&series, parameters.inverter_capacity_dc());
    let window = profile.next_window(now).map(|window| window.interval());
    println!("{}", build_forecast_table(&series, &parameters, window));
    Ok(())
}
