//! Synthetic observations of a person filmed at ~30 fps

use crate::utils::{BBox, Observation};

pub const FRAME_MS: i64 = 33;
pub const PERSON_BOX_HEIGHT: f64 = 170.0;
pub const FLIGHT_MS: i64 = 500;
const EARTH_GRAVITY: f64 = 9.81;
// 170 px person is 1.7 m tall
const PIXELS_PER_METER: f64 = 100.0;
const STANDING_Y: f64 = 200.0;

/// Height (meters) above the ground of a ballistic jump which takes off at `start_ms`
pub fn jump_height_at(t_ms: i64, start_ms: i64, flight_ms: i64) -> f64 {
    let t = (t_ms - start_ms) as f64 / 1000.0;
    let flight = flight_ms as f64 / 1000.0;
    if t < 0.0 || t > flight {
        return 0.0;
    }
    let v0 = EARTH_GRAVITY * flight / 2.0;
    v0 * t - 0.5 * EARTH_GRAVITY * t * t
}

pub fn person_box(y: f64) -> BBox {
    BBox::new(100.0, y, 60.0, PERSON_BOX_HEIGHT)
}

/// Standing person which jumps at given moments. Frames start at 0 ms.
pub fn get_jumps_data(jump_starts_ms: &[i64], n_frames: i64) -> Vec<Observation> {
    (0..n_frames)
        .map(|k| {
            let t = k * FRAME_MS;
            let h: f64 = jump_starts_ms
                .iter()
                .map(|start| jump_height_at(t, *start, FLIGHT_MS))
                .sum();
            Observation::new(person_box(STANDING_Y - h * PIXELS_PER_METER), t)
        })
        .collect()
}

/// Standing person swaying by 1% of its height
pub fn get_noise_data(n_frames: i64) -> Vec<Observation> {
    (0..n_frames)
        .map(|k| {
            let y = STANDING_Y + 0.01 * PERSON_BOX_HEIGHT * (k as f64 * 0.7).sin();
            Observation::new(person_box(y), k * FRAME_MS)
        })
        .collect()
}
