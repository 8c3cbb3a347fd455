use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session lengths the user can pick from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SessionDuration {
    Test,
    FifteenMin,
    ThirtyMin,
    OneHour,
    TwoHours,
}

impl SessionDuration {
    pub const ALL: [SessionDuration; 5] = [
        SessionDuration::Test,
        SessionDuration::FifteenMin,
        SessionDuration::ThirtyMin,
        SessionDuration::OneHour,
        SessionDuration::TwoHours,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SessionDuration::Test => "5 seconds",
            SessionDuration::FifteenMin => "15 minutes",
            SessionDuration::ThirtyMin => "30 minutes",
            SessionDuration::OneHour => "1 hour",
            SessionDuration::TwoHours => "2 hours",
        }
    }

    pub fn total_ms(self) -> u64 {
        match self {
            SessionDuration::Test => 5_000,
            SessionDuration::FifteenMin => 15 * 60 * 1_000,
            SessionDuration::ThirtyMin => 30 * 60 * 1_000,
            SessionDuration::OneHour => 60 * 60 * 1_000,
            SessionDuration::TwoHours => 2 * 60 * 60 * 1_000,
        }
    }

    pub fn total(self) -> Duration {
        Duration::from_millis(self.total_ms())
    }
}
