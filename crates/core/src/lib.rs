#![forbid(unsafe_code)]

pub mod duration;
pub mod model;
pub mod time;

pub use duration::{format_duration, remaining_time};
pub use time::Clock;
