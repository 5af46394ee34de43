//! Engine tunables.
//!
//! Defaults encode the planning policy: a short fixed buffer between tasks,
//! longer recovery gaps after long tasks, a cap on continuous work, and a
//! protected midday break. Callers may load overrides with
//! [`EngineConfig::load_from_file`]; the engine itself never touches the
//! filesystem.
//!
//! Precedence (lowest to highest):
//! 1. Programmatic defaults
//! 2. YAML file
//! 3. Environment variables (`UDAYPLAN_` prefix)

use std::path::Path;

use chrono::{Duration, NaiveTime};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for every minute-valued tunable: one day.
pub const MAX_TUNABLE_MINUTES: i64 = 24 * 60;

/// Upper bound for the selective-mode look-ahead: one year.
pub const MAX_LOOKAHEAD_DAYS: i64 = 366;

/// Scheduling policy knobs shared by the synthesizer and the mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed buffer inserted after each placement in full-pool mode (minutes).
    pub buffer_minutes: i64,
    /// Tasks at least this long need the long recovery gap (minutes).
    pub long_task_minutes: i64,
    /// Gap required after a long task (minutes).
    pub long_task_gap_minutes: i64,
    /// Gap required after a shorter task in selective mode (minutes).
    pub short_task_gap_minutes: i64,
    /// Longest run of continuous work before a qualifying gap (minutes).
    pub max_continuous_minutes: i64,
    /// Start of the band that must hold the midday break.
    pub midday_start: NaiveTime,
    /// End of the midday band (exclusive).
    pub midday_end: NaiveTime,
    /// Length of the reserved midday break (minutes).
    pub midday_break_minutes: i64,
    /// How many days past the target day a deadline may fall and still be
    /// admitted in selective mode.
    pub lookahead_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: 10,
            long_task_minutes: 90,
            long_task_gap_minutes: 30,
            short_task_gap_minutes: 15,
            max_continuous_minutes: 120,
            midday_start: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            midday_end: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
            midday_break_minutes: 60,
            lookahead_days: 1,
        }
    }
}

impl EngineConfig {
    /// Figment stack: defaults, then the YAML file, then `UDAYPLAN_*` env vars.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("UDAYPLAN_"))
    }

    /// Loads and validates configuration from a YAML file plus environment.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates ranges after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(5..=10).contains(&self.buffer_minutes) {
            return Err(ConfigError::InvalidBuffer(self.buffer_minutes));
        }

        for (field, value) in [
            ("long_task_minutes", self.long_task_minutes),
            ("long_task_gap_minutes", self.long_task_gap_minutes),
            ("short_task_gap_minutes", self.short_task_gap_minutes),
            ("max_continuous_minutes", self.max_continuous_minutes),
            ("midday_break_minutes", self.midday_break_minutes),
        ] {
            if value <= 0 {
                return Err(ConfigError::NonPositive { field, value });
            }
            if value > MAX_TUNABLE_MINUTES {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    max: MAX_TUNABLE_MINUTES,
                });
            }
        }

        if self.lookahead_days < 0 {
            return Err(ConfigError::NonPositive {
                field: "lookahead_days",
                value: self.lookahead_days,
            });
        }
        if self.lookahead_days > MAX_LOOKAHEAD_DAYS {
            return Err(ConfigError::OutOfRange {
                field: "lookahead_days",
                value: self.lookahead_days,
                max: MAX_LOOKAHEAD_DAYS,
            });
        }

        let band = self.midday_end.signed_duration_since(self.midday_start);
        if band < Duration::minutes(self.midday_break_minutes) {
            return Err(ConfigError::InvalidMiddayBand {
                start: self.midday_start,
                end: self.midday_end,
                minutes: self.midday_break_minutes,
            });
        }

        Ok(())
    }

    /// Gap that must follow a task of the given length.
    ///
    /// `selective` switches the short-task gap from the fixed buffer to the
    /// burnout minimum.
    pub fn gap_after(&self, task_minutes: i64, selective: bool) -> Duration {
        let minutes = if task_minutes >= self.long_task_minutes {
            self.long_task_gap_minutes
        } else if selective {
            self.short_task_gap_minutes
        } else {
            self.buffer_minutes
        };
        Duration::minutes(minutes)
    }

    /// Reserved midday break as a time-of-day interval.
    pub fn midday_reserve(&self) -> (NaiveTime, NaiveTime) {
        let end = self.midday_start + Duration::minutes(self.midday_break_minutes);
        (self.midday_start, end)
    }
}
