//! Export contents of `jump` folder
mod archive;
mod config;
mod detector;
mod jump_errors;
mod pipeline;
pub mod series;
#[cfg(test)]
mod test_data;

pub use self::{
    archive::*,
    config::*,
    detector::*,
    jump_errors::*,
    pipeline::*,
};
