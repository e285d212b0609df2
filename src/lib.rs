pub mod api;
pub mod chain;
pub mod config;
pub mod contract;
pub mod error;
pub mod request;
pub mod rules;
pub mod wallet;
