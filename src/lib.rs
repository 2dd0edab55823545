pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod listings;
pub mod llm;
pub mod models;
pub mod reference;
pub mod routes;
pub mod vin;

pub mod chat_workflow;
pub use app::{create_app, init_tracing};
