pub mod excess;
pub mod parameters;
pub mod planner;
pub mod schedule;
pub mod series;
