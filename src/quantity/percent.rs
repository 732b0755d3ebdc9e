quantity!(Percent, suffix: "%", precision: 1);

impl Percent {
    pub const HUNDRED: Self = Self(100.0);

    pub const fn to_proportion(self) -> f64 {
        0.01 * self.0
    }

    /// Check that the value lies within `0..=100`.
    pub fn is_valid(self) -> bool {
        (Self::ZERO..=Self::HUNDRED).contains(&self)
    }
}
