pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dom;
pub mod domain;
pub mod dtos;
pub mod errors;
pub mod metrics;
pub mod notifier;
pub mod reservations;
pub mod state;
