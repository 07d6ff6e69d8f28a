pub mod aggregate;
pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod money;
pub mod routes;
pub mod schema;
pub mod service;
pub mod store;
