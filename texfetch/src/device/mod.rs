pub mod dispatch;
pub mod texel;
pub mod texture;

pub use dispatch::*;
pub use texel::*;
pub use texture::*;
