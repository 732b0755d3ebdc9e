#[macro_use]
mod macros;

pub mod energy;
pub mod interval;
pub mod percent;
pub mod power;
