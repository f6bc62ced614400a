pub mod app;
pub mod backend;
pub mod cli;
pub mod domain;
pub mod error;
pub mod logging;
pub mod verify;
