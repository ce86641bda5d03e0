pub mod components;
pub mod context;
pub mod traits;

pub use components::*;
pub use context::*;
pub use traits::*;
