// Library exports for the warden process supervisor

pub mod breaker;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod keepalive;
pub mod memory;
pub mod process;
