use std::ops::{Div, Mul};

use crate::quantity::percent::Percent;

quantity!(KilowattHours, suffix: "kWh", precision: 2);

impl Mul<Percent> for KilowattHours {
    type Output = Self;

    fn mul(self, percent: Percent) -> Self::Output {
        self * percent.to_proportion()
    }
}

impl Div<Self> for KilowattHours {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_mul_percent() {
        assert_abs_diff_eq!((KilowattHours(17.1) * Percent(90.0)).0, 15.39, epsilon = 1e-9);
    }
}
