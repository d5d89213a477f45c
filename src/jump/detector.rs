use std::fmt;
use uuid::Uuid;

use crate::jump::archive::Archive;
use crate::jump::config::{CompactionPolicy, JumpDetectorConfig};
use crate::jump::jump_errors::{JumpError, NonMonotonicTimestamp};
use crate::jump::pipeline::detect_jump;
use crate::utils::{BBox, Observation};

/// Counts jumps of a single tracked person from per-frame bounding boxes.
///
/// Calls must be serialized by the owner and come in non-decreasing timestamp order.
pub struct JumpDetector {
    cfg: JumpDetectorConfig,
    session_id: Uuid,
    // Working buffer: pruned after each jump and compacted when it grows too long
    observations: Vec<Observation>,
    // Everything observed since the last reset
    archive: Archive,
    count: usize,
    last_jump_timestamp: Option<i64>,
}

impl JumpDetector {
    /// Creates default instance of JumpDetector
    ///
    /// Basic usage:
    ///
    /// ```
    /// use jump_counter::jump::JumpDetector;
    /// let detector = JumpDetector::default();
    /// assert_eq!(detector.get_count(), 0);
    /// ```
    pub fn default() -> Self {
        JumpDetector::with_config(JumpDetectorConfig::default())
    }
    /// Creates new instance of JumpDetector with validated configuration
    ///
    /// Basic usage:
    ///
    /// ```
    /// use jump_counter::jump::{JumpDetector, JumpDetectorConfig};
    /// let cfg = JumpDetectorConfig {
    ///     max_ms_between_jumps: 1000,
    ///     ..JumpDetectorConfig::default()
    /// };
    /// let detector = JumpDetector::new(cfg).unwrap();
    /// assert_eq!(detector.get_config().max_ms_between_jumps, 1000);
    /// ```
    pub fn new(cfg: JumpDetectorConfig) -> Result<Self, JumpError> {
        cfg.validate()?;
        Ok(JumpDetector::with_config(cfg))
    }
    fn with_config(cfg: JumpDetectorConfig) -> Self {
        let session_id = Uuid::new_v4();
        JumpDetector {
            observations: Vec::with_capacity(cfg.compaction_threshold() + 1),
            cfg,
            session_id,
            archive: Archive::new(session_id),
            count: 0,
            last_jump_timestamp: None,
        }
    }
    pub fn get_config(&self) -> &JumpDetectorConfig {
        &self.cfg
    }
    pub fn get_count(&self) -> usize {
        self.count
    }
    pub fn get_last_jump_timestamp(&self) -> Option<i64> {
        self.last_jump_timestamp
    }
    pub fn get_session_id(&self) -> Uuid {
        self.session_id
    }
    pub fn get_archive(&self) -> &Archive {
        &self.archive
    }
    pub fn get_observations(&self) -> &[Observation] {
        &self.observations
    }
    pub fn working_len(&self) -> usize {
        self.observations.len()
    }
    /// Forgets everything observed so far and starts a new session
    pub fn reset(&mut self) {
        self.session_id = Uuid::new_v4();
        self.observations.clear();
        self.archive.restart(self.session_id);
        self.count = 0;
        self.last_jump_timestamp = None;
    }
    /// Ends the session and hands over everything it has observed
    pub fn finish(self) -> Archive {
        self.archive
    }
    /// Registers detection (or its absence) of a person at given moment and returns current jump count.
    ///
    /// `None` means the person was not detected in this frame: nothing changes.
    /// Change of the box height is treated as another person and resets the session.
    ///
    /// Observations with degenerate box or timestamp lower than the previous one are rejected
    /// without changing the state.
    ///
    /// Basic usage:
    ///
    /// ```
    /// use jump_counter::jump::JumpDetector;
    /// use jump_counter::utils::BBox;
    /// let mut detector = JumpDetector::default();
    /// let count = detector.observe(Some(BBox::new(100.0, 200.0, 60.0, 170.0)), 0).unwrap();
    /// assert_eq!(count, 0);
    /// let count = detector.observe(None, 33).unwrap();
    /// assert_eq!(count, 0);
    /// ```
    pub fn observe(&mut self, bbox: Option<BBox>, timestamp_ms: i64) -> Result<usize, JumpError> {
        let bbox = match bbox {
            Some(b) => b,
            None => return Ok(self.count),
        };
        if !bbox.is_valid() {
            log::warn!(
                "Rejecting box {:?} at {} ms: it can not define a scale",
                bbox,
                timestamp_ms
            );
            return Err(JumpError::DegenerateBox(format!(
                "box {:?} at {} ms",
                bbox, timestamp_ms
            )));
        }
        // Legacy compaction may drop the newest samples, so the archive knows the latest moment
        if let Some(last) = self.archive.last() {
            if timestamp_ms < last.timestamp_ms {
                log::warn!(
                    "Rejecting box at {} ms: previous one was at {} ms",
                    timestamp_ms,
                    last.timestamp_ms
                );
                return Err(JumpError::from(NonMonotonicTimestamp {
                    previous: last.timestamp_ms,
                    current: timestamp_ms,
                }));
            }
        }
        let last_height = self.observations.last().map(|o| o.bbox.height);
        if let Some(last_height) = last_height {
            if bbox.height != last_height {
                log::debug!(
                    "Box height changed from {} to {} at {} ms. Resetting session {} with {} jumps",
                    last_height,
                    bbox.height,
                    timestamp_ms,
                    self.session_id,
                    self.count
                );
                self.reset();
            }
        }

        self.drop_outside_window(timestamp_ms);

        let observation = Observation::new(bbox, timestamp_ms);
        self.observations.push(observation);
        self.archive.push(observation);

        if self.observations.len() < self.cfg.min_frames {
            return Ok(self.count);
        }

        if self.observations.len() > self.cfg.compaction_threshold() {
            self.compact();
        }

        if detect_jump(&self.observations, &self.cfg) {
            self.register_jump(timestamp_ms);
        } else {
            log::trace!(
                "No jump at {} ms over {} observations",
                timestamp_ms,
                self.observations.len()
            );
        }
        Ok(self.count)
    }
    fn drop_outside_window(&mut self, timestamp_ms: i64) {
        let max_window_ms = self.cfg.max_window_ms;
        // Buffer is ordered by time: everything after the first fresh observation is fresh too
        let keep_from = self
            .observations
            .iter()
            .position(|o| match timestamp_ms.checked_sub(o.timestamp_ms) {
                Some(age) => age <= max_window_ms,
                None => false,
            })
            .unwrap_or(self.observations.len());
        if keep_from > 0 {
            log::debug!(
                "Dropping {} observations older than {} ms before {} ms",
                keep_from,
                max_window_ms,
                timestamp_ms
            );
            self.observations.drain(..keep_from);
        }
    }
    fn compact(&mut self) {
        let span = self.cfg.interpolation_span;
        log::debug!(
            "Compacting {} observations down to {} ({:?})",
            self.observations.len(),
            span,
            self.cfg.compaction
        );
        match self.cfg.compaction {
            CompactionPolicy::KeepNewest => {
                let excess = self.observations.len().saturating_sub(span);
                self.observations.drain(..excess);
            }
            CompactionPolicy::KeepOldest => {
                self.observations.truncate(span);
            }
        }
    }
    fn register_jump(&mut self, timestamp_ms: i64) {
        if let Some(last) = self.last_jump_timestamp {
            let since_last = timestamp_ms.saturating_sub(last);
            if since_last > self.cfg.max_ms_between_jumps {
                log::debug!(
                    "{} ms since previous jump: starting a new streak after {} jumps",
                    since_last,
                    self.count
                );
                self.count = 0;
            }
        }
        self.count += 1;
        self.last_jump_timestamp = Some(timestamp_ms);
        // Keep only the freshest observations so the same jump is not counted twice
        let excess = self.observations.len().saturating_sub(self.cfg.min_frames);
        self.observations.drain(..excess);
        log::info!(
            "Jump #{} at {} ms (session {})",
            self.count,
            timestamp_ms,
            self.session_id
        );
    }
}

impl fmt::Display for JumpDetector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Session: {}\n\tJumps: {}\n\t{}",
            self.session_id, self.count, self.cfg
        )
    }
}
