//! Bulk admission from a CSV upload.
//!
//! Columns: `student_id, first_name, last_name, date_of_birth, grade,
//! class_group, academic_year, parent_username, parent_email`. Each row is
//! written in its own transaction; a failing row is reported and skipped.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::RegistrarService;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::entities::EnrollmentOutcome,
    people::entities::normalize_student_code,
    registrar::{
        entities::{AdmissionRow, AdmissionRowOutcome, ParentSpec},
        responses::BulkAdmissionResponse,
    },
    users::{entities::UserRole, responses::ImportRowError},
};
use crate::services::system::DynamicConfig;
use crate::storage::Storage;
use crate::utils::csv_import::{CsvTable, parse_csv, read_file_from_multipart};
use crate::utils::dates::parse_flexible_date;
use crate::utils::password::hash_password_blocking;
use crate::utils::random_code::generate_password;
use crate::utils::validate::{
    validate_email, validate_required, validate_student_code, validate_username,
};

const REQUIRED_COLUMNS: &[&str] = &["student_id", "first_name", "last_name", "date_of_birth"];

/// Validates every row; good rows come back in file order.
fn validate_rows(table: &CsvTable) -> (Vec<AdmissionRow>, Vec<ImportRowError>) {
    let mut valid = Vec::new();
    let mut errors = table.errors.clone();

    for row in &table.rows {
        let mut row_errors = Vec::new();

        let code = table.get(row, "student_id");
        if let Err(msg) = validate_student_code(code) {
            row_errors.push(ImportRowError::new(row.row_num, "student_id", msg));
        }
        for field in ["first_name", "last_name"] {
            if let Err(msg) = validate_required(table.get(row, field), field, 100) {
                row_errors.push(ImportRowError::new(row.row_num, field, msg));
            }
        }
        let raw_dob = table.get(row, "date_of_birth");
        let date_of_birth = parse_flexible_date(raw_dob);
        if date_of_birth.is_none() {
            row_errors.push(ImportRowError::new(
                row.row_num,
                "date_of_birth",
                format!("Invalid date '{raw_dob}'. Use YYYY-MM-DD or DD/MM/YYYY"),
            ));
        }

        match date_of_birth {
            Some(date_of_birth) if row_errors.is_empty() => valid.push(AdmissionRow {
                row: row.row_num,
                student_code: normalize_student_code(code),
                first_name: table.get(row, "first_name").to_string(),
                last_name: table.get(row, "last_name").to_string(),
                date_of_birth,
                grade: table.get(row, "grade").to_string(),
                class_group: table.get(row, "class_group").to_string(),
                academic_year: table.get(row, "academic_year").to_string(),
                parent_username: table.get(row, "parent_username").to_string(),
                parent_email: table.get(row, "parent_email").to_lowercase(),
            }),
            _ => errors.append(&mut row_errors),
        }
    }

    (valid, errors)
}

/// Existing account by username, then by email; a new parent account when
/// both are given and neither matches.
async fn resolve_parent(
    storage: &dyn Storage,
    row: &AdmissionRow,
) -> Result<std::result::Result<ParentSpec, ImportRowError>> {
    let username = row.parent_username.as_str();
    let email = row.parent_email.as_str();
    if username.is_empty() && email.is_empty() {
        return Ok(Ok(ParentSpec::None));
    }

    let mut existing = None;
    if !username.is_empty() {
        existing = storage.get_user_by_username(username).await?;
    }
    if existing.is_none() && !email.is_empty() {
        existing = storage.get_user_by_email(email).await?;
    }
    if let Some(user) = existing {
        if user.role != UserRole::Parent {
            return Ok(Err(ImportRowError::new(
                row.row,
                "parent_username",
                format!("Account '{}' is not a parent account", user.username),
            )));
        }
        return Ok(Ok(ParentSpec::Existing(user.id)));
    }

    if username.is_empty() || email.is_empty() {
        return Ok(Ok(ParentSpec::None));
    }
    if let Err(msg) = validate_username(username) {
        return Ok(Err(ImportRowError::new(row.row, "parent_username", msg)));
    }
    if let Err(msg) = validate_email(email) {
        return Ok(Err(ImportRowError::new(row.row, "parent_email", msg)));
    }

    let password_hash = hash_password_blocking(generate_password()).await?;
    Ok(Ok(ParentSpec::Create {
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
    }))
}

fn tally(response: &mut BulkAdmissionResponse, outcome: &AdmissionRowOutcome) {
    if outcome.student_created {
        response.students_created += 1;
    } else {
        response.students_existing += 1;
    }
    match outcome.enrollment {
        Some(EnrollmentOutcome::Created) => response.enrollments_created += 1,
        Some(EnrollmentOutcome::Moved) => response.enrollments_updated += 1,
        Some(EnrollmentOutcome::Unchanged) | None => {}
    }
    if outcome.parent_created {
        response.parents_created += 1;
    }
    if outcome.parent_linked {
        response.parents_linked += 1;
    }
}

pub async fn bulk_admission(
    service: &RegistrarService,
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
    let response = admit_rows(storage.as_ref(), &table).await;
    info!(
        "Bulk admission from {}: {} students created, {} existing, {} skipped",
        file_name, response.students_created, response.students_existing, response.skipped
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Import finished")))
}

/// Imports every valid row. Any failure is recorded against its row and the
/// import moves on.
async fn admit_rows(storage: &dyn Storage, table: &CsvTable) -> BulkAdmissionResponse {
    let (rows, mut errors) = validate_rows(table);
    let mut response = BulkAdmissionResponse {
        total_rows: table.total_rows(),
        skipped: table.total_rows() - rows.len(),
        ..Default::default()
    };

    for row in rows {
        let row_num = row.row;
        let parent = match resolve_parent(storage, &row).await {
            Ok(Ok(parent)) => parent,
            Ok(Err(error)) => {
                errors.push(error);
                response.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!("Parent lookup for admission row {} failed: {}", row_num, e);
                errors.push(ImportRowError::new(row_num, "parent_username", e.message()));
                response.skipped += 1;
                continue;
            }
        };

        match storage.import_admission_row(row, parent).await {
            Ok(outcome) => tally(&mut response, &outcome),
            Err(e) => {
                warn!("Admission row {} failed: {}", row_num, e);
                errors.push(ImportRowError::new(row_num, "", e.message()));
                response.skipped += 1;
            }
        }
    }

    response.errors = errors;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use chrono::NaiveDate;
    use sea_orm::ConnectionTrait;

    #[test]
    fn test_row_validation() {
        let csv = b"Student_ID,First_Name,Last_Name,Date_Of_Birth,Grade,Class_Group,Academic_Year,Parent_Username,Parent_Email\n\
bb-100,Tariro,Dube,2016-04-09,Grade 3,3A,2025,ndube,N.Dube@Example.com\n\
BB101,Kuda,Moyo,09/04/2016,,,,,\n\
bad code,,Moyo,yesterday,,,,,\n";
        let table = parse_csv(csv, REQUIRED_COLUMNS).unwrap();
        let (rows, errors) = validate_rows(&table);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].student_code, "BB-100");
        assert_eq!(rows[0].parent_email, "n.dube@example.com");
        assert_eq!(rows[1].date_of_birth, NaiveDate::from_ymd_opt(2016, 4, 9).unwrap());

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["student_id", "first_name", "date_of_birth"]);
        assert!(errors.iter().all(|e| e.row == 4));
    }

    #[test]
    fn test_tally() {
        let mut response = BulkAdmissionResponse::default();
        tally(
            &mut response,
            &AdmissionRowOutcome {
                student_created: true,
                enrollment: Some(EnrollmentOutcome::Created),
                parent_created: true,
                parent_linked: true,
            },
        );
        tally(
            &mut response,
            &AdmissionRowOutcome {
                student_created: false,
                enrollment: Some(EnrollmentOutcome::Moved),
                parent_created: false,
                parent_linked: false,
            },
        );
        assert_eq!(response.students_created, 1);
        assert_eq!(response.students_existing, 1);
        assert_eq!(response.enrollments_created, 1);
        assert_eq!(response.enrollments_updated, 1);
        assert_eq!(response.parents_created, 1);
        assert_eq!(response.parents_linked, 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_only_skips_its_row() {
        let storage = SeaOrmStorage::new_in_memory().await;
        // Parent lookups now fail at the database.
        storage
            .db
            .execute_unprepared("ALTER TABLE users RENAME TO users_archived")
            .await
            .unwrap();

        let csv = b"student_id,first_name,last_name,date_of_birth,parent_username,parent_email\n\
BB200,Tariro,Dube,2016-04-09,ndube,ndube@example.com\n\
BB201,Kuda,Moyo,2016-05-01,,\n";
        let table = parse_csv(csv, REQUIRED_COLUMNS).unwrap();
        let response = admit_rows(&storage, &table).await;

        assert_eq!(response.total_rows, 2);
        assert_eq!(response.students_created, 1);
        assert_eq!(response.skipped, 1);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].row, 2);
        assert_eq!(response.errors[0].field, "parent_username");
        assert!(storage.get_student_by_code("BB201").await.unwrap().is_some());
    }
}
