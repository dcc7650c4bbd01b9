pub mod app;
pub mod config;
pub mod control;
pub mod hooks;
pub mod metadata;
pub mod session;
pub mod shared;
