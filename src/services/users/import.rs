//! Bulk account creation from a CSV upload.
//!
//! Columns: `username, email, first_name, last_name, password, role`. Rows that
//! fail validation are reported and skipped; rows whose username or email is
//! already taken are skipped so a file can be uploaded twice.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use tracing::{info, warn};

use super::UserService;
use crate::errors::Result;
use crate::models::users::entities::{PreferredLanguage, UserRole};
use crate::models::users::requests::NewUser;
use crate::models::users::responses::{ImportRowError, UserImportResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::system::DynamicConfig;
use crate::storage::Storage;
use crate::utils::csv_import::{CsvTable, parse_csv, read_file_from_multipart};
use crate::utils::password::hash_password_blocking;
use crate::utils::validate::{validate_email, validate_password_simple, validate_username};

const REQUIRED_COLUMNS: &[&str] = &["username", "email", "password", "role"];

#[derive(Debug, Clone, PartialEq)]
struct ImportRow {
    row_num: usize,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
    role: UserRole,
}

/// Validates every row; good rows come back in file order.
fn validate_rows(table: &CsvTable) -> (Vec<ImportRow>, Vec<ImportRowError>) {
    let mut valid = Vec::new();
    let mut errors = table.errors.clone();

    for row in &table.rows {
        let username = table.get(row, "username");
        let email = table.get(row, "email").to_lowercase();
        let password = table.get(row, "password");
        let role = table.get(row, "role");

        let mut row_errors = Vec::new();
        if let Err(msg) = validate_username(username) {
            row_errors.push(ImportRowError::new(row.row_num, "username", msg));
        }
        if let Err(msg) = validate_email(&email) {
            row_errors.push(ImportRowError::new(row.row_num, "email", msg));
        }
        if let Err(msg) = validate_password_simple(password) {
            row_errors.push(ImportRowError::new(row.row_num, "password", msg));
        }
        let parsed_role = role.parse::<UserRole>();
        if parsed_role.is_err() {
            row_errors.push(ImportRowError::new(
                row.row_num,
                "role",
                format!("Invalid role '{role}'. Expected one of: {}", UserRole::choices()),
            ));
        }

        match parsed_role {
            Ok(role) if row_errors.is_empty() => valid.push(ImportRow {
                row_num: row.row_num,
                username: username.to_string(),
                email,
                first_name: table.get(row, "first_name").to_string(),
                last_name: table.get(row, "last_name").to_string(),
                password: password.to_string(),
                role,
            }),
            _ => errors.append(&mut row_errors),
        }
    }

    (valid, errors)
}

pub async fn import_users(
    service: &UserService,
    mut payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let max_size = DynamicConfig::upload_max_size().await;
    let (file_bytes, file_name) = match read_file_from_multipart(&mut payload, max_size).await {
        Ok(result) => result,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileUploadFailed,
                format!("Failed to read file: {e}"),
            )));
        }
    };

    let table = match parse_csv(&file_bytes, REQUIRED_COLUMNS) {
        Ok(table) => table,
        Err(e) => {
            return Ok(
                HttpResponse::BadRequest().json(ApiResponse::error_empty(e.error_code(), e.message()))
            );
        }
    };

    let storage = service.get_storage(request);
    let response = import_table(storage.as_ref(), &table).await?;
    info!(
        "User import from {}: {} created, {} skipped",
        file_name, response.created, response.skipped
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Import finished")))
}

/// Creates the accounts of a parsed file. Taken usernames or emails, including
/// ones claimed earlier in the same file, are skipped.
async fn import_table(storage: &dyn Storage, table: &CsvTable) -> Result<UserImportResponse> {
    let (valid_rows, mut errors) = validate_rows(table);

    let usernames: Vec<String> = valid_rows.iter().map(|r| r.username.clone()).collect();
    let emails: Vec<String> = valid_rows.iter().map(|r| r.email.clone()).collect();
    let mut taken_usernames: HashSet<String> =
        storage.check_usernames_exist(&usernames).await?.into_iter().collect();
    let mut taken_emails: HashSet<String> =
        storage.check_emails_exist(&emails).await?.into_iter().collect();

    let mut response = UserImportResponse {
        total: table.total_rows(),
        ..Default::default()
    };

    for row in valid_rows {
        if taken_usernames.contains(&row.username) || taken_emails.contains(&row.email) {
            response.skipped += 1;
            continue;
        }

        let password_hash = match hash_password_blocking(row.password).await {
            Ok(hash) => hash,
            Err(e) => {
                errors.push(ImportRowError::new(row.row_num, "password", e.message()));
                continue;
            }
        };

        let new_user = NewUser {
            username: row.username.clone(),
            email: row.email.clone(),
            password_hash,
            role: row.role,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: None,
            preferred_language: PreferredLanguage::English,
            staff_code: None,
        };

        match storage.create_user(new_user).await {
            Ok(_) => {
                response.created += 1;
                taken_usernames.insert(row.username);
                taken_emails.insert(row.email);
            }
            Err(e) => {
                warn!("Import row {} failed: {}", row.row_num, e);
                errors.push(ImportRowError::new(row.row_num, "", e.message()));
            }
        }
    }

    // Rows with errors count as skipped too.
    let failed_rows: HashSet<usize> = errors.iter().map(|e| e.row).collect();
    response.skipped += failed_rows.len();
    response.errors = errors;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::entities::perms;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[test]
    fn test_row_validation() {
        let csv = b"Username,Email,First_Name,Last_Name,Password,Role\n\
tmoyo,T.Moyo@School.zw,Tendai,Moyo,Chalk2025x,teacher\n\
x,bad,,,short,janitor\n\
rncube,rncube@school.zw,Rudo,Ncube,Chalk2025x,PARENT\n";
        let table = parse_csv(csv, REQUIRED_COLUMNS).unwrap();
        let (valid, errors) = validate_rows(&table);

        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].email, "t.moyo@school.zw");
        assert_eq!(valid[0].role, UserRole::Teacher);
        assert_eq!(valid[1].role, UserRole::Parent);
        assert_eq!(valid[1].first_name, "Rudo");

        let bad_fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(bad_fields, ["username", "email", "password", "role"]);
        assert!(errors.iter().all(|e| e.row == 3));
    }

    #[tokio::test]
    async fn test_second_upload_creates_nothing() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let csv = b"username,email,first_name,last_name,password,role\n\
tmoyo,tmoyo@school.zw,Tendai,Moyo,Chalk2025x,teacher\n\
rncube,rncube@school.zw,Rudo,Ncube,Chalk2025x,parent\n\
tmoyo,other@school.zw,Tendai,Moyo,Chalk2025x,teacher\n\
x,bad,,,short,janitor\n";
        let table = parse_csv(csv, REQUIRED_COLUMNS).unwrap();

        let first = import_table(&storage, &table).await.unwrap();
        assert_eq!(first.total, 4);
        assert_eq!(first.created, 2);
        // In-file duplicate plus the invalid row.
        assert_eq!(first.skipped, 2);
        assert!(first.errors.iter().all(|e| e.row == 5));

        let teacher = storage
            .get_user_by_username("tmoyo")
            .await
            .unwrap()
            .unwrap();
        assert!(
            storage
                .user_has_permission(teacher.id, perms::VIEW_STUDENT)
                .await
                .unwrap()
        );

        let second = import_table(&storage, &table).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, second.total);
    }
}
