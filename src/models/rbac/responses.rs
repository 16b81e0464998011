use serde::Serialize;

use super::entities::{Permission, Role, RoleAssignment};

#[derive(Debug, Serialize)]
pub struct PermissionListResponse {
    pub items: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub items: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct AssignmentListResponse {
    pub items: Vec<RoleAssignment>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub assignment: RoleAssignment,
    pub created: bool,
}
