pub mod resolve;
pub mod traits;
pub mod windows;
