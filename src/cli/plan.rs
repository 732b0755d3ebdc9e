use chrono::{DateTime, Local, Timelike};
use clap::Parser;

use crate::{
    cli::{ForecastArgs, HomeAssistantArgs, SystemArgs},
    core::planner::Planner,
    prelude::*,
    publisher::{PublishReport, Publisher},
    tables::{build_forecast_table, build_schedule_table},
};

#[derive(Parser)]
pub struct PlanArgs {
    /// Do not push the schedule to Home Assistant (dry run).
    #[clap(long)]
    pub scout: bool,

    #[clap(flatten)]
    pub system: SystemArgs,

    #[clap(flatten)]
    pub forecast: ForecastArgs,

    #[clap(flatten)]
    pub home_assistant: HomeAssistantArgs,
}

#[instrument(skip_all)]
pub async fn plan(args: &PlanArgs) -> Result {
    let now = Local::now();
    let now = now.with_nanosecond(0).unwrap_or(now);
    run(args, now).await?;
    Ok(())
}

/// Plan against the forecast as seen at `now`, returning the publishing report if anything was published.
async fn run(args: &PlanArgs, now: DateTime<Local>) -> Result<Option<PublishReport>> {
    let parameters = args.system.parameters()?;
    let home_assistant = if args.scout {
        None
    } else {
        Some(args.home_assistant.connection.try_new_client()?)
    };

    let series = args.forecast.source(now)?.get_series().await?;
    info!(len = series.len(), "fetched the forecast");

    let plan = Planner::builder().series(&series).parameters(&parameters).now(now).plan()?;
    println!(
        "{}",
        build_forecast_table(&series, &parameters, plan.as_ref().map(|plan| plan.window))
    );
    let Some(plan) = plan else {
        info!("no upcoming excess, nothing to schedule");
        return Ok(None);
    };
    println!("{}", build_schedule_table(&plan, &parameters));

    let Some(api) = home_assistant else {
        return Ok(None);
    };
    let report = Publisher::new(&api, &args.home_assistant.entities).publish(&plan.schedule).await;
    if report.n_failed == 0 {
        info!(report.n_written, "published the schedule");
    } else {
        warn!(report.n_written, report.n_failed, "published the schedule partially");
    }
    Ok(Some(report))
}
