pub mod hub;
pub mod registry;

pub use hub::*;
pub use registry::*;
