use chrono::{DateTime, Local, TimeDelta};
use reqwest::{
    Client,
    ClientBuilder,
    Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};

use crate::{
    core::series::{ForecastPoint, ForecastSeries},
    prelude::*,
    quantity::{interval::Interval, power::Kilowatts},
};

/// Solcast rooftop site forecast client.
pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.solcast.com.au";

    /// Forecast horizon to request, enough to cover the rest of today and the whole of tomorrow.
    const HORIZON_HOURS: &'static str = "48";

    pub fn try_new(api_key: &str, base_url: Url) -> Result<Self> {
        let headers = HeaderMap::from_iter([(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {api_key}"))?,
        )]);
        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base_url })
    }

    #[instrument(skip_all, name = "Fetching the site forecast…", fields(site_id = site_id))]
    pub async fn get_forecasts(&self, site_id: &str) -> Result<Forecasts> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .push("rooftop_sites")
            .push(site_id)
            .push("forecasts");
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("hours", Self::HORIZON_HOURS);
        let forecasts: Forecasts =
            self.client.get(url).send().await?.error_for_status()?.json().await?;
        info!(n_forecasts = forecasts.forecasts.len(), "fetched");
        Ok(forecasts)
    }
}

/// Which of the forecast percentiles to plan against.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Estimate {
    /// Pessimistic, 10th percentile.
    P10,

    /// Median.
    P50,

    /// Optimistic, 90th percentile.
    P90,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Forecasts {
    pub forecasts: Vec<Forecast>,
}

impl Forecasts {
    /// Convert into a series, keeping the response order.
    pub fn to_series(&self, estimate: Estimate) -> ForecastSeries {
        self.forecasts
            .iter()
            .map(|forecast| ForecastPoint::new(forecast.interval(), forecast.estimate(estimate)))
            .collect::<Vec<_>>()
            .into()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub period_end: DateTime<Local>,

    pub period: Period,

    #[serde(rename = "pv_estimate")]
    pub p50: Kilowatts,

    #[serde(rename = "pv_estimate10")]
    pub p10: Kilowatts,

    #[serde(rename = "pv_estimate90")]
    pub p90: Kilowatts,
}

impl Forecast {
    pub fn interval(&self) -> Interval {
        Interval::new(self.period_end - self.period.time_delta(), self.period_end)
    }

    /// Selected estimate, negative values are treated as no generation.
    pub fn estimate(&self, estimate: Estimate) -> Kilowatts {
        let power = match estimate {
            Estimate::P10 => self.p10,
            Estimate::P50 => self.p50,
            Estimate::P90 => self.p90,
        };
        power.max(Kilowatts::ZERO)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "PT5M")]
    FiveMinutes,

    #[serde(rename = "PT10M")]
    TenMinutes,

    #[serde(rename = "PT15M")]
    FifteenMinutes,

    #[serde(rename = "PT30M")]
    HalfHour,

    #[serde(rename = "PT60M")]
    Hour,
}

impl Period {
    pub fn time_delta(self) -> TimeDelta {
        match self {
            Self::FiveMinutes => TimeDelta::minutes(5),
            Self::TenMinutes => TimeDelta::minutes(10),
            Self::FifteenMinutes => TimeDelta::minutes(15),
            Self::HalfHour => TimeDelta::minutes(30),
            Self::Hour => TimeDelta::hours(1),
        }
    }
}
