//! Battery and inverter CLI arguments.

use clap::Parser;

use crate::{
    core::parameters::{ParameterError, SystemParameters},
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts},
};

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct SystemArgs {
    /// Inverter DC-to-AC conversion capacity in kilowatts.
    #[clap(long = "inverter-capacity-dc-kilowatts", default_value = "8.3", env = "INVERTER_CAPACITY_DC_KILOWATTS")]
    pub inverter_capacity_dc: Kilowatts,

    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "battery-capacity-kilowatt-hours", default_value = "17.1", env = "BATTERY_CAPACITY_KILOWATT_HOURS")]
    pub battery_capacity: KilowattHours,

    /// Reserve to restore for the outage protection.
    #[clap(long = "min-reserve-percent", default_value = "10", env = "MIN_RESERVE_PERCENT")]
    pub min_reserve: Percent,

    /// State of charge that the battery may be charged up to.
    #[clap(long = "target-max-percent", default_value = "95", env = "TARGET_MAX_PERCENT")]
    pub target_max: Percent,

    /// Margin subtracted from the minimum reserve when discharging.
    #[clap(long = "charge-buffer-percent", default_value = "10", env = "CHARGE_BUFFER_PERCENT")]
    pub charge_buffer: Percent,
}

impl SystemArgs {
    pub fn parameters(self) -> Result<SystemParameters, ParameterError> {
        SystemParameters::builder()
            .inverter_capacity_dc(self.inverter_capacity_dc)
            .battery_capacity(self.battery_capacity)
            .min_reserve(self.min_reserve)
            .target_max(self.target_max)
            .charge_buffer(self.charge_buffer)
            .build()
    }
}
