mod forecast;
mod home_assistant;
mod plan;
mod system;

use clap::{Parser, Subcommand};

pub use self::{
    forecast::{ForecastArgs, ShowForecastArgs, show_forecast},
    home_assistant::{HomeAssistantArgs, HomeAssistantEntityArgs},
    plan::{PlanArgs, plan},
    system::SystemArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: fetch the forecast, plan the schedule, and push it to Home Assistant.
    #[clap(name = "plan")]
    Plan(Box<PlanArgs>),

    /// Print the merged forecast along with the excess energy.
    #[clap(name = "forecast")]
    Forecast(Box<ShowForecastArgs>),
}
