pub mod api;
pub mod config;
pub mod routes;
pub mod session;
pub mod types;
pub mod ui;
pub mod views;
