pub mod catalog;
pub mod round;
pub mod session;
pub mod store;

// Re-export main components
pub use catalog::*;
pub use round::*;
pub use session::*;
pub use store::*;
