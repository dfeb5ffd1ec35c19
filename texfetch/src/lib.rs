pub mod device;
pub mod host;
pub mod math;
