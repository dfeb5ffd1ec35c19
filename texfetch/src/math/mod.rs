pub mod bspline;

pub use bspline::*;
