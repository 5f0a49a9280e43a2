pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod response;
pub mod services;

pub use db::connect;
