pub mod config;
pub mod util;

pub const NS_PER_US: f64 = 1000.0;
