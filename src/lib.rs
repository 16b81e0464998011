//! BusyBee SMS: school management backend.
//!
//! Students and guardians, classes and timetables, attendance and grades,
//! fee invoices with proof-of-payment verification, parent/teacher messaging,
//! admissions and reports, served as a JSON API on Actix Web.
//!
//! # Layout
//! - `cache`: in-process object cache (Moka)
//! - `config`: layered configuration
//! - `entity`: SeaORM entities
//! - `errors`: crate error type
//! - `middlewares`: authentication, role, permission and rate-limit gates
//! - `models`: domain types, requests and responses
//! - `routes`: HTTP handlers and route tables
//! - `runtime`: startup and shutdown
//! - `services`: business logic
//! - `storage`: persistence (SeaORM)
//! - `utils`: shared helpers

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
