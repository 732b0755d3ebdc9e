use bon::bon;

use crate::quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts};

#[derive(Debug, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParameterError {
    #[display("{name} must be a positive number, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[display("{name} must be within 0–100 %, got {value}")]
    PercentOutOfRange { name: &'static str, value: Percent },

    #[display("target maximum ({target_max}) must be above the minimum reserve ({min_reserve})")]
    TargetMaxNotAboveMinReserve { target_max: Percent, min_reserve: Percent },

    #[display("charge buffer must be a non-negative number, got {value}")]
    InvalidChargeBuffer { value: Percent },
}

/// Validated battery and inverter configuration for a single planning run.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SystemParameters {
    inverter_capacity_dc: Kilowatts,
    battery_capacity: KilowattHours,
    min_reserve: Percent,
    target_max: Percent,
    charge_buffer: Percent,
}

#[bon]
impl SystemParameters {
    #[builder]
    pub fn new(
        inverter_capacity_dc: Kilowatts,
        battery_capacity: KilowattHours,
        min_reserve: Percent,
        target_max: Percent,
        charge_buffer: Percent,
    ) -> Result<Self, ParameterError> {
        Self::ensure_positive("inverter DC capacity", inverter_capacity_dc.0)?;
        Self::ensure_positive("battery capacity", battery_capacity.0)?;
        Self::ensure_percent("minimum reserve", min_reserve)?;
        Self::ensure_percent("target maximum", target_max)?;
        if target_max <= min_reserve {
            return Err(ParameterError::TargetMaxNotAboveMinReserve { target_max, min_reserve });
        }
        if !charge_buffer.0.is_finite() || charge_buffer < Percent::ZERO {
            return Err(ParameterError::InvalidChargeBuffer { value: charge_buffer });
        }
        Ok(Self { inverter_capacity_dc, battery_capacity, min_reserve, target_max, charge_buffer })
    }

    fn ensure_positive(name: &'static str, value: f64) -> Result<(), ParameterError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ParameterError::NonPositive { name, value })
        }
    }

    fn ensure_percent(name: &'static str, value: Percent) -> Result<(), ParameterError> {
        if value.is_valid() { Ok(()) } else { Err(ParameterError::PercentOutOfRange { name, value }) }
    }

    pub const fn inverter_capacity_dc(&self) -> Kilowatts {
        self.inverter_capacity_dc
    }

    pub const fn battery_capacity(&self) -> KilowattHours {
        self.battery_capacity
    }

    pub const fn min_reserve(&self) -> Percent {
        self.min_reserve
    }

    pub const fn target_max(&self) -> Percent {
        self.target_max
    }

    pub const fn charge_buffer(&self) -> Percent {
        self.charge_buffer
    }

    /// The reserve to discharge down to: the minimum reserve less the charge buffer.
    pub fn discharge_target(&self) -> Percent {
        (self.min_reserve - self.charge_buffer).clamp(Percent::ZERO, Percent::HUNDRED)
    }

    /// Energy the battery can absorb while charging from the discharge target up to the target maximum.
    pub fn headroom(&self) -> KilowattHours {
        (self.battery_capacity * (self.target_max - self.discharge_target())).max(KilowattHours::ZERO)
    }
}
