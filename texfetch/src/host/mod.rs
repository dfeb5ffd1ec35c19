pub mod emulator;
pub mod error;
pub mod object;

pub use emulator::*;
pub use error::*;
pub use object::*;
