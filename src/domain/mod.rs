pub mod integration;
pub mod offer;
pub mod order;
pub mod user;

pub use integration::*;
pub use offer::*;
pub use order::*;
pub use user::*;
