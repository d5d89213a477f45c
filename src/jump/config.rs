use serde::Deserialize;
use std::fmt;

use crate::jump::jump_errors::JumpError;

/// What to keep when the working buffer outgrows `compaction_factor * interpolation_span` samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactionPolicy {
    /// Keep the most recent `interpolation_span` samples
    #[default]
    KeepNewest,
    /// Keep the oldest `interpolation_span` samples and drop the fresh ones.
    /// Only useful to replay sessions recorded with the legacy counter.
    KeepOldest,
}

/// Tunables of the jump detector. Defaults describe an adult filmed at a regular frame rate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JumpDetectorConfig {
    /// Assumed real height of the person (meters). Defines pixel-to-meter scale. Default is 1.7
    pub man_height_m: f64,
    /// Free fall acceleration (m/s^2). Default is 9.81
    pub earth_gravity: f64,
    /// Allowed deviation from `-earth_gravity` as a fraction of it. Default is 0.5
    pub acceleration_error_ratio: f64,
    /// Span of the velocity/acceleration EWMA (in 1ms samples). Height is smoothed with a half of it. Default is 100
    pub interpolation_span: usize,
    /// Gap between jumps (ms) which breaks the streak. Default is 800
    pub max_ms_between_jumps: i64,
    /// Minimal number of buffered observations to run detection. Default is 4
    pub min_frames: usize,
    /// Backward shift of the acceleration curve (in 1ms samples). Default is 20
    pub acceleration_shift: usize,
    /// Minimal height of a jump as a fraction of the person's height. Default is 0.1
    pub min_jump_height_ratio: f64,
    /// Buffer is compacted once it holds more than `compaction_factor * interpolation_span` samples. Default is 4
    pub compaction_factor: usize,
    pub compaction: CompactionPolicy,
    /// Longest time (ms) covered by the working buffer. Older observations are dropped. Default is 20000
    pub max_window_ms: i64,
}

impl Default for JumpDetectorConfig {
    fn default() -> Self {
        JumpDetectorConfig {
            man_height_m: 1.7,
            earth_gravity: 9.81,
            acceleration_error_ratio: 0.5,
            interpolation_span: 100,
            max_ms_between_jumps: 800,
            min_frames: 4,
            acceleration_shift: 20,
            min_jump_height_ratio: 0.1,
            compaction_factor: 4,
            compaction: CompactionPolicy::KeepNewest,
            max_window_ms: 20_000,
        }
    }
}

impl JumpDetectorConfig {
    /// Parses configuration from TOML. Missing keys take default values.
    ///
    /// Basic usage:
    ///
    /// ```
    /// use jump_counter::jump::{CompactionPolicy, JumpDetectorConfig};
    /// let cfg = JumpDetectorConfig::from_toml_str(r#"
    ///     max_ms_between_jumps = 1000
    ///     compaction = "keep_oldest"
    /// "#).unwrap();
    /// assert_eq!(cfg.max_ms_between_jumps, 1000);
    /// assert_eq!(cfg.compaction, CompactionPolicy::KeepOldest);
    /// assert_eq!(cfg.min_frames, 4);
    /// ```
    pub fn from_toml_str(txt: &str) -> Result<Self, JumpError> {
        let cfg: JumpDetectorConfig = toml::from_str(txt)?;
        cfg.validate()?;
        Ok(cfg)
    }
    pub fn validate(&self) -> Result<(), JumpError> {
        if !(self.man_height_m.is_finite() && self.man_height_m > 0.0) {
            return Err(JumpError::BadConfig(format!(
                "man_height_m should be positive, got {}",
                self.man_height_m
            )));
        }
        if !(self.earth_gravity.is_finite() && self.earth_gravity > 0.0) {
            return Err(JumpError::BadConfig(format!(
                "earth_gravity should be positive, got {}",
                self.earth_gravity
            )));
        }
        if !(self.acceleration_error_ratio.is_finite() && self.acceleration_error_ratio > 0.0) {
            return Err(JumpError::BadConfig(format!(
                "acceleration_error_ratio should be positive, got {}",
                self.acceleration_error_ratio
            )));
        }
        if !self.min_jump_height_ratio.is_finite() || self.min_jump_height_ratio < 0.0 {
            return Err(JumpError::BadConfig(format!(
                "min_jump_height_ratio should be non-negative, got {}",
                self.min_jump_height_ratio
            )));
        }
        if self.interpolation_span < 2 {
            return Err(JumpError::BadConfig(format!(
                "interpolation_span should be at least 2, got {}",
                self.interpolation_span
            )));
        }
        // Local maximum needs a neighbour on each side
        if self.min_frames < 3 {
            return Err(JumpError::BadConfig(format!(
                "min_frames should be at least 3, got {}",
                self.min_frames
            )));
        }
        if self.compaction_factor < 1 {
            return Err(JumpError::BadConfig(
                "compaction_factor should be at least 1".to_string(),
            ));
        }
        if self.max_ms_between_jumps < 0 {
            return Err(JumpError::BadConfig(format!(
                "max_ms_between_jumps should be non-negative, got {}",
                self.max_ms_between_jumps
            )));
        }
        if self.max_window_ms < 1 {
            return Err(JumpError::BadConfig(format!(
                "max_window_ms should be positive, got {}",
                self.max_window_ms
            )));
        }
        Ok(())
    }
    /// Buffer length which triggers compaction
    pub fn compaction_threshold(&self) -> usize {
        self.compaction_factor * self.interpolation_span
    }
    /// Longest 1 ms grid the pipeline builds: both ends of the window are included
    pub fn max_grid_len(&self) -> usize {
        usize::try_from(self.max_window_ms)
            .map(|n| n.saturating_add(1))
            .unwrap_or(0)
    }
    pub fn height_span(&self) -> f64 {
        0.5 * self.interpolation_span as f64
    }
    pub fn acceleration_error(&self) -> f64 {
        self.acceleration_error_ratio * self.earth_gravity
    }
}

impl fmt::Display for JumpDetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Person height: {} m\n\tGravity: {} +/- {} m/s^2\n\tInterpolation span: {}\n\tMax gap between jumps: {} ms\n\tCompaction: {:?} after {} samples\n\tWindow: {} ms",
            self.man_height_m,
            self.earth_gravity,
            self.acceleration_error(),
            self.interpolation_span,
            self.max_ms_between_jumps,
            self.compaction,
            self.compaction_threshold(),
            self.max_window_ms
        )
    }
}
