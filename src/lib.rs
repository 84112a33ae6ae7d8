#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "Domain types, usecases, repositories, authentication and HTTP routes of the"]
#![doc = "task API. The binary (`main.rs`) only loads configuration and wires the"]
#![doc = "selected repositories into an actix-web server."]

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;
pub mod usecases;

pub use error::AppError;
pub use state::AppState;
