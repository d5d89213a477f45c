use itertools::{izip, Itertools};

use crate::jump::config::JumpDetectorConfig;
use crate::jump::series::{ewm_mean, resample_linear, scaled_diff, shift_backward};
use crate::utils::Observation;

// Milliseconds in a second
const MILLI: f64 = 1000.0;

/// Vertical motion of the person on a uniform 1 ms clock starting at the oldest observation.
/// Height is in meters (up is positive), velocity in m/s, acceleration in m/s^2.
#[derive(Debug, Clone)]
pub struct JumpSignals {
    pub start_ms: i64,
    pub smoothed: Vec<Option<f64>>,
    pub velocity: Vec<Option<f64>>,
    /// Already shifted backward by `acceleration_shift` samples
    pub acceleration: Vec<Option<f64>>,
    /// Estimated height of the person (meters)
    pub person_height: f64,
}

impl JumpSignals {
    pub fn len(&self) -> usize {
        self.smoothed.len()
    }
    pub fn is_empty(&self) -> bool {
        self.smoothed.is_empty()
    }
    pub fn min_height(&self) -> Option<f64> {
        self.smoothed.iter().flatten().copied().reduce(f64::min)
    }
    /// Grid indices where free fall, local maximum and height threshold hold simultaneously
    pub fn jump_indices(&self, cfg: &JumpDetectorConfig) -> Vec<usize> {
        let min_height = match self.min_height() {
            Some(v) => v,
            None => return vec![],
        };
        let min_jump_height = cfg.min_jump_height_ratio * self.person_height;
        let acceleration_error = cfg.acceleration_error();
        izip!(
            self.smoothed.iter().tuple_windows::<(_, _, _)>(),
            self.acceleration.iter().skip(1)
        )
        .enumerate()
        .filter_map(|(i, ((prev, cur, next), acc))| {
            let (prev, cur, next, acc) = ((*prev)?, (*cur)?, (*next)?, (*acc)?);
            let freefall = (acc + cfg.earth_gravity).abs() < acceleration_error;
            let local_maximum = prev < cur && next <= cur;
            let high_enough = cur - min_height > min_jump_height;
            if freefall && local_maximum && high_enough {
                Some(i + 1)
            } else {
                None
            }
        })
        .collect()
    }
}

/// Converts buffered observations into smoothed height, velocity and acceleration curves.
///
/// Returns `None` when there are fewer than `min_frames` observations, the oldest box can not
/// define a scale or observations span more than `max_window_ms`. Observations should be ordered by timestamp.
pub fn compute_signals(observations: &[Observation], cfg: &JumpDetectorConfig) -> Option<JumpSignals> {
    if observations.len() < cfg.min_frames {
        return None;
    }
    let first = observations.first()?;
    if !first.bbox.is_valid() {
        return None;
    }
    // Any height change resets the session, so the oldest box is as good a reference as the newest
    let reference_height = first.bbox.height;
    let m_to_p_ratio = cfg.man_height_m / reference_height;

    let heights: Vec<(i64, f64)> = observations
        .iter()
        .map(|o| (o.timestamp_ms, -o.bbox.y * m_to_p_ratio))
        .collect();
    let interpolated = resample_linear(&heights, cfg.max_grid_len());
    if interpolated.is_empty() {
        // Observations span more than `max_window_ms`
        return None;
    }
    let interpolated: Vec<Option<f64>> = interpolated.into_iter().map(Some).collect();

    let span = cfg.interpolation_span as f64;
    let smoothed = ewm_mean(&interpolated, cfg.height_span());
    let velocity = ewm_mean(&scaled_diff(&smoothed, MILLI), span);
    let acceleration = ewm_mean(&scaled_diff(&velocity, MILLI), span);
    let acceleration = shift_backward(&acceleration, cfg.acceleration_shift);

    Some(JumpSignals {
        start_ms: first.timestamp_ms,
        smoothed,
        velocity,
        acceleration,
        person_height: m_to_p_ratio * reference_height,
    })
}

/// Checks whether buffered observations contain a jump: a local maximum of height,
/// high enough above the lowest point, reached while acceleration is close to free fall.
///
/// Basic usage:
///
/// ```
/// use jump_counter::jump::{detect_jump, JumpDetectorConfig};
/// use jump_counter::utils::{BBox, Observation};
/// let cfg = JumpDetectorConfig::default();
/// let standing: Vec<Observation> = (0..10)
///     .map(|i| Observation::new(BBox::new(100.0, 200.0, 60.0, 170.0), i * 33))
///     .collect();
/// assert!(!detect_jump(&standing, &cfg));
/// ```
pub fn detect_jump(observations: &[Observation], cfg: &JumpDetectorConfig) -> bool {
    match compute_signals(observations, cfg) {
        Some(signals) => !signals.jump_indices(cfg).is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jump::test_data::{get_jumps_data, get_noise_data, PERSON_BOX_HEIGHT};
    use crate::utils::BBox;

    #[test]
    fn test_not_enough_frames() {
        let cfg = JumpDetectorConfig::default();
        let observations = get_jumps_data(&[330], 3);
        assert!(compute_signals(&observations, &cfg).is_none());
        assert!(!detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_signals_shape() {
        let cfg = JumpDetectorConfig::default();
        let observations = get_jumps_data(&[], 4);
        let signals = compute_signals(&observations, &cfg).unwrap();
        // 0, 33, 66, 99 ms
        assert_eq!(signals.len(), 100);
        assert_eq!(signals.start_ms, 0);
        assert!(signals.smoothed.iter().all(|v| v.is_some()));
        assert_eq!(signals.velocity[0], None);
        assert!(signals.velocity[1].is_some());
        assert!(signals.acceleration[0].is_some());
        // Tail without a source after backward shift
        assert!(signals.acceleration[80..].iter().all(|v| v.is_none()));
        assert!(signals.acceleration[79].is_some());
        assert!((signals.person_height - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_standing_person() {
        let cfg = JumpDetectorConfig::default();
        let observations = get_jumps_data(&[], 40);
        let signals = compute_signals(&observations, &cfg).unwrap();
        assert!(signals.jump_indices(&cfg).is_empty());
        assert!(!detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_single_jump() {
        let cfg = JumpDetectorConfig::default();
        // Flight from 330 ms to 830 ms: whole jump is in the buffer
        let observations = get_jumps_data(&[330], 40);
        assert!(detect_jump(&observations, &cfg));
        let signals = compute_signals(&observations, &cfg).unwrap();
        let indices = signals.jump_indices(&cfg);
        assert!(!indices.is_empty());
        for idx in indices {
            // Peak of the flight is at 580 ms, smoothing delays it a bit
            assert!(idx > 580 && idx < 700, "unexpected peak index {}", idx);
            let acc = signals.acceleration[idx].unwrap();
            assert!((acc + cfg.earth_gravity).abs() < cfg.acceleration_error());
        }
    }

    #[test]
    fn test_jump_requires_free_fall() {
        // Same trajectory, but gravity of another planet
        let cfg = JumpDetectorConfig {
            earth_gravity: 30.0,
            acceleration_error_ratio: 0.1,
            ..JumpDetectorConfig::default()
        };
        let observations = get_jumps_data(&[330], 40);
        assert!(!detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_jump_requires_height() {
        let cfg = JumpDetectorConfig {
            min_jump_height_ratio: 0.5,
            ..JumpDetectorConfig::default()
        };
        let observations = get_jumps_data(&[330], 40);
        assert!(!detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_noise_is_not_a_jump() {
        let cfg = JumpDetectorConfig::default();
        let observations = get_noise_data(200);
        assert!(!detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_window_too_wide() {
        // 40 frames cover 1287 ms
        let cfg = JumpDetectorConfig {
            max_window_ms: 1_000,
            ..JumpDetectorConfig::default()
        };
        let observations = get_jumps_data(&[330], 40);
        assert!(compute_signals(&observations, &cfg).is_none());
        assert!(!detect_jump(&observations, &cfg));
        let cfg = JumpDetectorConfig {
            max_window_ms: 1_287,
            ..JumpDetectorConfig::default()
        };
        assert!(detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_timestamps_far_apart() {
        let cfg = JumpDetectorConfig::default();
        let bbox = BBox::new(100.0, 200.0, 60.0, PERSON_BOX_HEIGHT);
        let mut observations: Vec<Observation> = (0..3)
            .map(|k| Observation::new(bbox, i64::MIN / 2 + k))
            .collect();
        observations.push(Observation::new(bbox, i64::MAX / 2 + 10));
        assert!(compute_signals(&observations, &cfg).is_none());
        assert!(!detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_duplicate_timestamps() {
        let cfg = JumpDetectorConfig::default();
        let bbox = BBox::new(100.0, 200.0, 60.0, PERSON_BOX_HEIGHT);
        let observations: Vec<Observation> = (0..6).map(|_| Observation::new(bbox, 1_000)).collect();
        let signals = compute_signals(&observations, &cfg).unwrap();
        assert_eq!(signals.len(), 1);
        assert!(!detect_jump(&observations, &cfg));
    }

    #[test]
    fn test_degenerate_reference_box() {
        let cfg = JumpDetectorConfig::default();
        let observations: Vec<Observation> = (0..6)
            .map(|i| Observation::new(BBox::new(100.0, 200.0, 60.0, 0.0), i * 33))
            .collect();
        assert!(compute_signals(&observations, &cfg).is_none());
        assert!(!detect_jump(&observations, &cfg));
    }
}
