#![doc = "The `taskguard` library crate."]
#![doc = ""]
#![doc = "Task management REST API with bcrypt password hashing, signed bearer tokens,"]
#![doc = "an authentication gate, role-based authorization and pluggable record stores."]
#![doc = "The binary (`main.rs`) wires configuration, stores and routes together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
