//! Business models shared by storage, services and routes.
//!
//! Each domain keeps its persisted shapes in `entities`, inbound payloads in
//! `requests` and outbound payloads in `responses`.

pub mod academics;
pub mod auth;
pub mod comms;
pub mod common;
pub mod finance;
pub mod people;
pub mod rbac;
pub mod registrar;
pub mod reports;
pub mod system;
pub mod users;

pub use common::{ApiResponse, ErrorCode, PaginatedResponse, PaginationInfo, PaginationQuery};
