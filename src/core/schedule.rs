use chrono::{DateTime, Local};

use crate::quantity::percent::Percent;

/// When to let the battery drain towards the discharge target, and when to raise the reserve again.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub discharge_start: DateTime<Local>,
    pub discharge_target: Percent,
    pub recovery_start: DateTime<Local>,
    pub recovery_target: Percent,
}

impl Schedule {
    /// Clean backup mode resumes together with the recovery.
    pub const fn clean_backup_start(&self) -> DateTime<Local> {
        self.recovery_start
    }
}
