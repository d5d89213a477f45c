//! Counting jumps of a person from bounding boxes produced by an object detector.
//!
//! Each frame yields a box (or nothing) and a timestamp. Vertical motion of the box is
//! resampled to a 1 ms clock, smoothed and differentiated; a jump is a local maximum of height
//! reached in free fall.
//!
//! ```
//! use jump_counter::jump::JumpDetector;
//! use jump_counter::utils::BBox;
//!
//! let mut detector = JumpDetector::default();
//! for i in 0..10 {
//!     let count = detector.observe(Some(BBox::new(100.0, 200.0, 60.0, 170.0)), i * 33).unwrap();
//!     assert_eq!(count, 0);
//! }
//! let archive = detector.finish();
//! assert_eq!(archive.len(), 10);
//! ```
pub mod jump;
pub mod utils;
