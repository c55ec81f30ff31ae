// HTTP routes
pub mod extract;
pub mod health;
pub mod hello;

pub use extract::*;
pub use health::*;
pub use hello::*;
