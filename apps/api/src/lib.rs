//! Resume records, template rendering and document export, plus the HTTP
//! service that exposes them.

pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod projection;
pub mod render;
pub mod resumes;
pub mod routes;
pub mod schema;
pub mod state;
