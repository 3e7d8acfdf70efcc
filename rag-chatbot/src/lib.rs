pub mod config;
pub mod dtos;
pub mod envelope;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod startup;
