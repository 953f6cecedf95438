pub mod audit;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod ui;
pub mod validation;
pub mod workflow;
