pub mod analysis;
pub mod app;
pub mod catalog;
pub mod client;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod guard;
pub mod output;
