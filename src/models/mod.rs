pub mod diagnostics;
pub mod error;
pub mod execute;
pub mod health;
pub mod interview;
pub mod messages;
pub mod note;
pub mod room;

pub use diagnostics::*;
pub use error::*;
pub use execute::*;
pub use health::*;
pub use interview::*;
pub use messages::*;
pub use note::*;
pub use room::*;
