#![forbid(unsafe_code)]

pub mod model;
pub mod options;
pub mod sampler;
pub mod scoring;
pub mod time;

pub use time::Clock;
