pub mod config;
pub mod equality;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod reconcile;
pub mod utils;
