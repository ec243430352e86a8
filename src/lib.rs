pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod roster;
pub mod service;
pub mod shutdown;
pub mod source;
