use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{parameters::SystemParameters, planner::Plan, series::ForecastSeries},
    quantity::{energy::KilowattHours, interval::Interval},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_forecast_table(
    series: &ForecastSeries,
    parameters: &SystemParameters,
    window: Option<Interval>,
) -> Table {
    let inverter_capacity = parameters.inverter_capacity_dc();
    let mut table = new_table();
    table.set_header(vec!["Date", "Start", "End", "Power", "Excess", "Total"]);
    let mut total = KilowattHours::ZERO;
    for point in series.iter() {
        let excess = point.excess_energy(inverter_capacity);
        let in_window = window.is_some_and(|window| window.contains(point.interval.start));
        total = if in_window { total + excess } else { KilowattHours::ZERO };
        table.add_row(vec![
            Cell::new(point.interval.start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(point.interval.start.format("%H:%M")),
            Cell::new(point.interval.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(point.power).set_alignment(CellAlignment::Right).fg(
                if point.power > inverter_capacity { Color::DarkYellow } else { Color::Reset },
            ),
            Cell::new(excess).set_alignment(CellAlignment::Right).fg(
                if excess > KilowattHours::ZERO { Color::Red } else { Color::Green },
            ),
            if in_window {
                Cell::new(total).set_alignment(CellAlignment::Right)
            } else {
                Cell::new("")
            },
        ]);
    }
    table
}

pub fn build_schedule_table(plan: &Plan, parameters: &SystemParameters) -> Table {
    let schedule = &plan.schedule;
    let mut table = new_table();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        Cell::new("Excess window"),
        Cell::new(format!(
            "{} – {}",
            plan.window.start.format("%b %d %H:%M"),
            plan.window.end.format("%H:%M"),
        )),
    ]);
    table.add_row(vec![
        Cell::new("Window excess").add_attribute(Attribute::Dim),
        Cell::new(plan.window_excess).set_alignment(CellAlignment::Right).fg(
            if plan.window_excess > plan.headroom { Color::Red } else { Color::Green },
        ),
    ]);
    table.add_row(vec![
        Cell::new("Headroom").add_attribute(Attribute::Dim),
        Cell::new(plan.headroom).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Discharge start"),
        Cell::new(schedule.discharge_start.format("%b %d %H:%M")).fg(Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Discharge target"),
        Cell::new(schedule.discharge_target).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Max reserve start"),
        Cell::new(schedule.recovery_start.format("%b %d %H:%M")).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Max reserve target"),
        Cell::new(schedule.recovery_target).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Clean backup start"),
        Cell::new(schedule.clean_backup_start().format("%b %d %H:%M")),
    ]);
    table.add_row(vec![
        Cell::new("Target max").add_attribute(Attribute::Dim),
        Cell::new(parameters.target_max()).set_alignment(CellAlignment::Right),
    ]);
    table
}
