// Stored resumes and the HTTP handlers over the schema, render and export layers.
// Storage sits behind the `ResumeStore` trait so handlers never see SQL.

pub mod handlers;
pub mod service;
pub mod store;

pub use store::{PgResumeStore, ResumeStore};
