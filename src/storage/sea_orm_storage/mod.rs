//! SeaORM storage backend.
//!
//! One implementation for SQLite, PostgreSQL and MySQL. Each domain lives in
//! its own file as `*_impl` methods; the `Storage` impl below only delegates.

mod academics;
mod comms;
mod finance;
mod joins;
mod people;
mod rbac;
mod registrar;
mod settings;
pub(crate) mod users;

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{BusyBeeError, Result};

#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

/// Wraps a database error with context.
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(DbErr) -> BusyBeeError {
    move |e| BusyBeeError::database_operation(format!("{context}: {e}"))
}

/// Like [`db_err`], but unique constraint violations become conflicts.
pub(crate) fn write_err(context: &'static str) -> impl FnOnce(DbErr) -> BusyBeeError {
    move |e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            BusyBeeError::conflict(format!("{context}: duplicate value ({detail})"))
        }
        _ => BusyBeeError::database_operation(format!("{context}: {e}")),
    }
}

pub(crate) fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

impl SeaOrmStorage {
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| BusyBeeError::database_operation(format!("Migration failed: {e}")))?;

        info!("SeaORM storage ready, database: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite with WAL and tuned pragmas.
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| BusyBeeError::database_config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                BusyBeeError::database_connection(format!("SQLite connection failed: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// PostgreSQL, MySQL and friends.
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| BusyBeeError::database_connection(format!("Cannot connect to database: {e}")))
    }

    /// Infers the backend from the URL; bare `.db`/`.sqlite` paths mean SQLite.
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(BusyBeeError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite://, postgres://, mysql://, or a .db/.sqlite file path"
            )))
        }
    }

    /// Fresh migrated in-memory database for tests.
    #[cfg(test)]
    pub(crate) async fn new_in_memory() -> Self {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("in-memory sqlite");
        Migrator::up(&db, None).await.expect("migrations");
        Self { db }
    }
}

use crate::models::{
    academics::{
        entities::{
            AssessmentDetail, AttendanceCounts, AttendanceRow, AttendanceStatus, ClassGroupDetail,
            EnrollmentDetail, EnrollmentOutcome, Grade, GradeRow, RosterEntry, Subject,
            TimetableEntryDetail,
        },
        requests::{AttendanceMark, GradeUpsert, NewAssessment, NewTimetableEntry, TimetableFilter},
    },
    comms::{
        entities::{
            BehaviourRecord, InboxRow, InboxScope, Message, MessageRow, NotificationLog,
            NotificationPreference, NotificationStatus, PerformanceNote, Thread,
        },
        requests::{NewNotification, UpdatePreferencesRequest},
    },
    finance::{
        entities::{
            FeeStructure, FinanceStats, InvoiceRow, InvoiceSnapshot, InvoiceStatus, Payment,
            PaymentOutcome, PaymentProof, ProofQueueRow, ReminderTarget, VerifyOutcome,
        },
        requests::{NewInvoice, NewPayment, NewProof, VerifyProofRequest},
    },
    people::{
        entities::{GuardianSummary, Student, StudentStatus},
        requests::{CreateStudentRequest, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    rbac::{
        entities::{Permission, Role, RoleAssignment},
        requests::UpdateRoleRequest,
    },
    registrar::{
        entities::{
            AdmissionApplication, AdmissionRow, AdmissionRowOutcome, AdmitOutcome, AdmitPlan,
            ApplicationCounts, ApplicationStatus, ParentSpec,
        },
        requests::CreateApplicationRequest,
    },
    system::{
        entities::{AcademicYear, SettingValueType, SystemSetting},
        requests::CreateAcademicYearRequest,
    },
    users::{
        entities::{User, UserRole},
        requests::{NewUser, UserChanges, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::{DateRange, Storage};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        self.update_user_impl(id, changes).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn accept_terms(&self, id: i64) -> Result<Option<User>> {
        self.accept_terms_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn count_users_by_roles(&self, roles: &[UserRole]) -> Result<u64> {
        self.count_users_by_roles_impl(roles).await
    }

    async fn check_usernames_exist(&self, usernames: &[String]) -> Result<Vec<String>> {
        self.check_usernames_exist_impl(usernames).await
    }

    async fn check_emails_exist(&self, emails: &[String]) -> Result<Vec<String>> {
        self.check_emails_exist_impl(emails).await
    }

    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>> {
        self.list_all_settings_impl().await
    }

    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>> {
        self.get_setting_by_key_impl(key).await
    }

    async fn update_setting(&self, key: &str, value: &str, user_id: i64) -> Result<SystemSetting> {
        self.update_setting_impl(key, value, user_id).await
    }

    async fn ensure_setting(
        &self,
        key: &str,
        value: &str,
        value_type: SettingValueType,
        description: &str,
    ) -> Result<bool> {
        self.ensure_setting_impl(key, value, value_type, description).await
    }

    async fn list_academic_years(&self) -> Result<Vec<AcademicYear>> {
        self.list_academic_years_impl().await
    }

    async fn get_academic_year(&self, id: i64) -> Result<Option<AcademicYear>> {
        self.get_academic_year_impl(id).await
    }

    async fn get_academic_year_by_name(&self, name: &str) -> Result<Option<AcademicYear>> {
        self.get_academic_year_by_name_impl(name).await
    }

    async fn get_current_academic_year(&self) -> Result<Option<AcademicYear>> {
        self.get_current_academic_year_impl().await
    }

    async fn create_academic_year(&self, req: CreateAcademicYearRequest) -> Result<AcademicYear> {
        self.create_academic_year_impl(req).await
    }

    async fn set_current_academic_year(&self, id: i64) -> Result<Option<AcademicYear>> {
        self.set_current_academic_year_impl(id).await
    }

    async fn list_students_with_pagination(
        &self,
        page: u64,
        size: u64,
        search: Option<String>,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(page, size, search).await
    }

    async fn list_students_ordered(
        &self,
        search: Option<String>,
        limit: u64,
    ) -> Result<Vec<Student>> {
        self.list_students_ordered_impl(search, limit).await
    }

    async fn count_students(&self, status: Option<StudentStatus>) -> Result<u64> {
        self.count_students_impl(status).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_code(&self, code: &str) -> Result<Option<Student>> {
        self.get_student_by_code_impl(code).await
    }

    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(req).await
    }

    async fn update_student(&self, id: i64, req: UpdateStudentRequest) -> Result<Option<Student>> {
        self.update_student_impl(id, req).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    async fn list_guardians(&self, student_id: i64) -> Result<Vec<GuardianSummary>> {
        self.list_guardians_impl(student_id).await
    }

    async fn add_guardian(&self, student_id: i64, user_id: i64) -> Result<bool> {
        self.add_guardian_impl(student_id, user_id).await
    }

    async fn remove_guardian(&self, student_id: i64, user_id: i64) -> Result<bool> {
        self.remove_guardian_impl(student_id, user_id).await
    }

    async fn is_guardian(&self, user_id: i64, student_id: i64) -> Result<bool> {
        self.is_guardian_impl(user_id, student_id).await
    }

    async fn list_children(&self, parent_id: i64) -> Result<Vec<Student>> {
        self.list_children_impl(parent_id).await
    }

    async fn find_student_for_link(
        &self,
        code: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<Student>> {
        self.find_student_for_link_impl(code, last_name, date_of_birth).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.list_subjects_impl().await
    }

    async fn get_subject(&self, id: i64) -> Result<Option<Subject>> {
        self.get_subject_impl(id).await
    }

    async fn create_subject(&self, code: &str, name: &str) -> Result<Subject> {
        self.create_subject_impl(code, name).await
    }

    async fn count_subjects(&self) -> Result<u64> {
        self.count_subjects_impl().await
    }

    async fn list_class_groups(
        &self,
        academic_year_id: Option<i64>,
    ) -> Result<Vec<ClassGroupDetail>> {
        self.list_class_groups_impl(academic_year_id).await
    }

    async fn get_class_group(&self, id: i64) -> Result<Option<ClassGroupDetail>> {
        self.get_class_group_impl(id).await
    }

    async fn create_class_group(
        &self,
        name: &str,
        grade_level: &str,
        academic_year_id: i64,
    ) -> Result<ClassGroupDetail> {
        self.create_class_group_impl(name, grade_level, academic_year_id).await
    }

    async fn list_roster(&self, class_group_id: i64) -> Result<Vec<RosterEntry>> {
        self.list_roster_impl(class_group_id).await
    }

    async fn enroll_student(
        &self,
        student_id: i64,
        class_group_id: i64,
    ) -> Result<(EnrollmentDetail, EnrollmentOutcome)> {
        self.enroll_student_impl(student_id, class_group_id).await
    }

    async fn delete_enrollment(&self, id: i64) -> Result<bool> {
        self.delete_enrollment_impl(id).await
    }

    async fn get_current_enrollment(&self, student_id: i64) -> Result<Option<EnrollmentDetail>> {
        self.get_current_enrollment_impl(student_id).await
    }

    async fn current_enrollments(
        &self,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, EnrollmentDetail>> {
        self.current_enrollments_impl(student_ids).await
    }

    async fn create_timetable_entry(
        &self,
        entry: NewTimetableEntry,
    ) -> Result<TimetableEntryDetail> {
        self.create_timetable_entry_impl(entry).await
    }

    async fn delete_timetable_entry(&self, id: i64) -> Result<bool> {
        self.delete_timetable_entry_impl(id).await
    }

    async fn list_timetable(&self, filter: TimetableFilter) -> Result<Vec<TimetableEntryDetail>> {
        self.list_timetable_impl(filter).await
    }

    async fn teacher_class_groups(&self, teacher_id: i64) -> Result<Vec<ClassGroupDetail>> {
        self.teacher_class_groups_impl(teacher_id).await
    }

    async fn teacher_teaches_class(&self, teacher_id: i64, class_group_id: i64) -> Result<bool> {
        self.teacher_teaches_class_impl(teacher_id, class_group_id).await
    }

    async fn attendance_for_class_date(
        &self,
        class_group_id: i64,
        date: NaiveDate,
    ) -> Result<HashMap<i64, AttendanceStatus>> {
        self.attendance_for_class_date_impl(class_group_id, date).await
    }

    async fn mark_attendance(
        &self,
        class_group_id: i64,
        date: NaiveDate,
        marks: Vec<AttendanceMark>,
        recorded_by: i64,
    ) -> Result<usize> {
        self.mark_attendance_impl(class_group_id, date, marks, recorded_by).await
    }

    async fn list_attendance(
        &self,
        student_ids: &[i64],
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<AttendanceRow>> {
        self.list_attendance_impl(student_ids, range, limit).await
    }

    async fn attendance_counts_since(
        &self,
        student_ids: &[i64],
        since: NaiveDate,
    ) -> Result<HashMap<i64, AttendanceCounts>> {
        self.attendance_counts_since_impl(student_ids, since).await
    }

    async fn attendance_summary_since(&self, since: NaiveDate) -> Result<AttendanceCounts> {
        self.attendance_summary_since_impl(since).await
    }

    async fn recent_absences(&self, since: NaiveDate, limit: u64) -> Result<Vec<AttendanceRow>> {
        self.recent_absences_impl(since, limit).await
    }

    async fn list_teacher_assessments(
        &self,
        teacher_id: i64,
        search: Option<String>,
        limit: u64,
    ) -> Result<Vec<AssessmentDetail>> {
        self.list_teacher_assessments_impl(teacher_id, search, limit).await
    }

    async fn get_assessment(&self, id: i64) -> Result<Option<AssessmentDetail>> {
        self.get_assessment_impl(id).await
    }

    async fn create_assessment(&self, assessment: NewAssessment) -> Result<AssessmentDetail> {
        self.create_assessment_impl(assessment).await
    }

    async fn grades_for_assessment(&self, assessment_id: i64) -> Result<HashMap<i64, Grade>> {
        self.grades_for_assessment_impl(assessment_id).await
    }

    async fn upsert_grades(&self, assessment_id: i64, grades: Vec<GradeUpsert>) -> Result<usize> {
        self.upsert_grades_impl(assessment_id, grades).await
    }

    async fn list_grades(
        &self,
        student_ids: &[i64],
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<GradeRow>> {
        self.list_grades_impl(student_ids, range, limit).await
    }

    async fn list_fee_structures(&self) -> Result<Vec<FeeStructure>> {
        self.list_fee_structures_impl().await
    }

    async fn get_fee_structure(&self, id: i64) -> Result<Option<FeeStructure>> {
        self.get_fee_structure_impl(id).await
    }

    async fn create_fee_structure(
        &self,
        name: &str,
        grade: &str,
        amount: crate::utils::Money,
    ) -> Result<FeeStructure> {
        self.create_fee_structure_impl(name, grade, amount).await
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceRow> {
        self.create_invoice_impl(invoice).await
    }

    async fn get_invoice(&self, id: i64) -> Result<Option<InvoiceRow>> {
        self.get_invoice_impl(id).await
    }

    async fn list_invoices(
        &self,
        student_ids: Option<&[i64]>,
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<InvoiceRow>> {
        self.list_invoices_impl(student_ids, range, limit).await
    }

    async fn count_invoices(&self, student_ids: Option<&[i64]>) -> Result<u64> {
        self.count_invoices_impl(student_ids).await
    }

    async fn list_payments(&self, invoice_id: i64) -> Result<Vec<Payment>> {
        self.list_payments_impl(invoice_id).await
    }

    async fn list_student_payments(
        &self,
        student_id: i64,
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<Payment>> {
        self.list_student_payments_impl(student_id, range, limit).await
    }

    async fn list_proofs(&self, invoice_id: i64) -> Result<Vec<PaymentProof>> {
        self.list_proofs_impl(invoice_id).await
    }

    async fn get_proof(&self, id: i64) -> Result<Option<PaymentProof>> {
        self.get_proof_impl(id).await
    }

    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentOutcome> {
        self.record_payment_impl(payment).await
    }

    async fn create_proof(&self, proof: NewProof) -> Result<(PaymentProof, InvoiceStatus)> {
        self.create_proof_impl(proof).await
    }

    async fn proof_queue(&self, search: Option<String>, limit: u64) -> Result<Vec<ProofQueueRow>> {
        self.proof_queue_impl(search, limit).await
    }

    async fn verify_proof(
        &self,
        proof_id: i64,
        req: VerifyProofRequest,
        verifier_id: i64,
        today: NaiveDate,
    ) -> Result<VerifyOutcome> {
        self.verify_proof_impl(proof_id, req, verifier_id, today).await
    }

    async fn reminder_targets(&self, cutoff: NaiveDate) -> Result<Vec<ReminderTarget>> {
        self.reminder_targets_impl(cutoff).await
    }

    async fn latest_invoice_snapshots(
        &self,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, InvoiceSnapshot>> {
        self.latest_invoice_snapshots_impl(student_ids).await
    }

    async fn finance_stats(&self, today: NaiveDate) -> Result<FinanceStats> {
        self.finance_stats_impl(today).await
    }

    async fn list_inbox(
        &self,
        viewer_id: i64,
        scope: InboxScope,
        search: Option<String>,
    ) -> Result<Vec<InboxRow>> {
        self.list_inbox_impl(viewer_id, scope, search).await
    }

    async fn get_inbox_row(&self, thread_id: i64, viewer_id: i64) -> Result<Option<InboxRow>> {
        self.get_inbox_row_impl(thread_id, viewer_id).await
    }

    async fn get_thread(&self, id: i64) -> Result<Option<Thread>> {
        self.get_thread_impl(id).await
    }

    async fn get_or_create_thread(
        &self,
        student_id: i64,
        teacher_id: i64,
        parent_id: i64,
    ) -> Result<(Thread, bool)> {
        self.get_or_create_thread_impl(student_id, teacher_id, parent_id).await
    }

    async fn list_messages(&self, thread_id: i64) -> Result<Vec<MessageRow>> {
        self.list_messages_impl(thread_id).await
    }

    async fn create_message(&self, thread_id: i64, sender_id: i64, body: &str) -> Result<Message> {
        self.create_message_impl(thread_id, sender_id, body).await
    }

    async fn mark_thread_read(&self, thread_id: i64, user_id: i64) -> Result<()> {
        self.mark_thread_read_impl(thread_id, user_id).await
    }

    async fn count_threads(&self, scope: InboxScope) -> Result<u64> {
        self.count_threads_impl(scope).await
    }

    async fn count_messages_sent(&self, user_id: i64) -> Result<u64> {
        self.count_messages_sent_impl(user_id).await
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<NotificationLog> {
        self.create_notification_impl(notification).await
    }

    async fn update_notification_status(
        &self,
        id: i64,
        status: NotificationStatus,
        error: Option<String>,
    ) -> Result<()> {
        self.update_notification_status_impl(id, status, error).await
    }

    async fn list_recent_notifications(&self, limit: u64) -> Result<Vec<NotificationLog>> {
        self.list_recent_notifications_impl(limit).await
    }

    async fn get_or_create_preference(&self, user_id: i64) -> Result<NotificationPreference> {
        self.get_or_create_preference_impl(user_id).await
    }

    async fn update_preference(
        &self,
        user_id: i64,
        req: UpdatePreferencesRequest,
    ) -> Result<NotificationPreference> {
        self.update_preference_impl(user_id, req).await
    }

    async fn create_performance_note(
        &self,
        student_id: i64,
        teacher_id: i64,
        term_month: NaiveDate,
        summary: &str,
    ) -> Result<PerformanceNote> {
        self.create_performance_note_impl(student_id, teacher_id, term_month, summary).await
    }

    async fn create_behaviour_record(
        &self,
        student_id: i64,
        teacher_id: i64,
        occurred_on: NaiveDate,
        note: &str,
    ) -> Result<BehaviourRecord> {
        self.create_behaviour_record_impl(student_id, teacher_id, occurred_on, note).await
    }

    async fn list_performance_notes(
        &self,
        student_id: i64,
        month: Option<NaiveDate>,
    ) -> Result<Vec<PerformanceNote>> {
        self.list_performance_notes_impl(student_id, month).await
    }

    async fn list_behaviour_records(
        &self,
        student_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<BehaviourRecord>> {
        self.list_behaviour_records_impl(student_id, range).await
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        self.list_permissions_impl().await
    }

    async fn create_permission(&self, code: &str, name: &str) -> Result<Permission> {
        self.create_permission_impl(code, name).await
    }

    async fn ensure_permission(&self, code: &str, name: &str) -> Result<Permission> {
        self.ensure_permission_impl(code, name).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        self.list_roles_impl().await
    }

    async fn get_role(&self, id: i64) -> Result<Option<Role>> {
        self.get_role_impl(id).await
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.get_role_by_name_impl(name).await
    }

    async fn create_role(&self, name: &str, description: &str, codes: &[String]) -> Result<Role> {
        self.create_role_impl(name, description, codes).await
    }

    async fn update_role(&self, id: i64, req: UpdateRoleRequest) -> Result<Option<Role>> {
        self.update_role_impl(id, req).await
    }

    async fn delete_role(&self, id: i64) -> Result<bool> {
        self.delete_role_impl(id).await
    }

    async fn list_assignments(&self, limit: u64) -> Result<Vec<RoleAssignment>> {
        self.list_assignments_impl(limit).await
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<(RoleAssignment, bool)> {
        self.assign_role_impl(user_id, role_id).await
    }

    async fn revoke_assignment(&self, id: i64) -> Result<bool> {
        self.revoke_assignment_impl(id).await
    }

    async fn user_has_permission(&self, user_id: i64, code: &str) -> Result<bool> {
        self.user_has_permission_impl(user_id, code).await
    }

    async fn list_applications(
        &self,
        search: Option<String>,
        status: Option<ApplicationStatus>,
        limit: u64,
    ) -> Result<Vec<AdmissionApplication>> {
        self.list_applications_impl(search, status, limit).await
    }

    async fn get_application(&self, id: i64) -> Result<Option<AdmissionApplication>> {
        self.get_application_impl(id).await
    }

    async fn create_application(
        &self,
        req: CreateApplicationRequest,
    ) -> Result<AdmissionApplication> {
        self.create_application_impl(req).await
    }

    async fn update_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<AdmissionApplication>> {
        self.update_application_status_impl(id, status).await
    }

    async fn admit_application(&self, plan: AdmitPlan) -> Result<AdmitOutcome> {
        self.admit_application_impl(plan).await
    }

    async fn import_admission_row(
        &self,
        row: AdmissionRow,
        parent: ParentSpec,
    ) -> Result<AdmissionRowOutcome> {
        self.import_admission_row_impl(row, parent).await
    }

    async fn application_counts(&self) -> Result<ApplicationCounts> {
        self.application_counts_impl().await
    }
}
