pub mod account;
pub mod session;

pub use account::*;
pub use session::*;
