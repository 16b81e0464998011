use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

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

use crate::errors::Result;

pub mod sea_orm_storage;

/// Inclusive date window.
pub type DateRange = (NaiveDate, NaiveDate);

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Users
    /// Inserts the account; teacher accounts also receive the Teacher role.
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn accept_terms(&self, id: i64) -> Result<Option<User>>;
    async fn count_users(&self) -> Result<u64>;
    async fn count_users_by_roles(&self, roles: &[UserRole]) -> Result<u64>;
    /// Returns the subset of `usernames` already taken.
    async fn check_usernames_exist(&self, usernames: &[String]) -> Result<Vec<String>>;
    /// Returns the subset of `emails` already taken.
    async fn check_emails_exist(&self, emails: &[String]) -> Result<Vec<String>>;

    // System settings and academic years
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>>;
    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>>;
    async fn update_setting(&self, key: &str, value: &str, user_id: i64) -> Result<SystemSetting>;
    /// Inserts the setting unless the key exists. Returns whether it was inserted.
    async fn ensure_setting(
        &self,
        key: &str,
        value: &str,
        value_type: SettingValueType,
        description: &str,
    ) -> Result<bool>;
    async fn list_academic_years(&self) -> Result<Vec<AcademicYear>>;
    async fn get_academic_year(&self, id: i64) -> Result<Option<AcademicYear>>;
    async fn get_academic_year_by_name(&self, name: &str) -> Result<Option<AcademicYear>>;
    async fn get_current_academic_year(&self) -> Result<Option<AcademicYear>>;
    async fn create_academic_year(&self, req: CreateAcademicYearRequest) -> Result<AcademicYear>;
    async fn set_current_academic_year(&self, id: i64) -> Result<Option<AcademicYear>>;

    // People
    async fn list_students_with_pagination(
        &self,
        page: u64,
        size: u64,
        search: Option<String>,
    ) -> Result<StudentListResponse>;
    /// Students ordered by last then first name.
    async fn list_students_ordered(&self, search: Option<String>, limit: u64)
    -> Result<Vec<Student>>;
    async fn count_students(&self, status: Option<StudentStatus>) -> Result<u64>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_code(&self, code: &str) -> Result<Option<Student>>;
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student>;
    async fn update_student(&self, id: i64, req: UpdateStudentRequest) -> Result<Option<Student>>;
    async fn delete_student(&self, id: i64) -> Result<bool>;
    async fn list_guardians(&self, student_id: i64) -> Result<Vec<GuardianSummary>>;
    /// Returns false when the link already existed.
    async fn add_guardian(&self, student_id: i64, user_id: i64) -> Result<bool>;
    async fn remove_guardian(&self, student_id: i64, user_id: i64) -> Result<bool>;
    async fn is_guardian(&self, user_id: i64, student_id: i64) -> Result<bool>;
    async fn list_children(&self, parent_id: i64) -> Result<Vec<Student>>;
    /// Exact match on code, last name and date of birth; code and name ignore case.
    async fn find_student_for_link(
        &self,
        code: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<Student>>;

    // Academics: subjects, classes, enrollments
    async fn list_subjects(&self) -> Result<Vec<Subject>>;
    async fn get_subject(&self, id: i64) -> Result<Option<Subject>>;
    async fn create_subject(&self, code: &str, name: &str) -> Result<Subject>;
    async fn count_subjects(&self) -> Result<u64>;
    async fn list_class_groups(&self, academic_year_id: Option<i64>)
    -> Result<Vec<ClassGroupDetail>>;
    async fn get_class_group(&self, id: i64) -> Result<Option<ClassGroupDetail>>;
    async fn create_class_group(
        &self,
        name: &str,
        grade_level: &str,
        academic_year_id: i64,
    ) -> Result<ClassGroupDetail>;
    async fn list_roster(&self, class_group_id: i64) -> Result<Vec<RosterEntry>>;
    async fn enroll_student(
        &self,
        student_id: i64,
        class_group_id: i64,
    ) -> Result<(EnrollmentDetail, EnrollmentOutcome)>;
    async fn delete_enrollment(&self, id: i64) -> Result<bool>;
    /// Enrollment in the current academic year, else the latest one.
    async fn get_current_enrollment(&self, student_id: i64) -> Result<Option<EnrollmentDetail>>;
    async fn current_enrollments(
        &self,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, EnrollmentDetail>>;

    // Academics: timetable
    async fn create_timetable_entry(&self, entry: NewTimetableEntry)
    -> Result<TimetableEntryDetail>;
    async fn delete_timetable_entry(&self, id: i64) -> Result<bool>;
    async fn list_timetable(&self, filter: TimetableFilter) -> Result<Vec<TimetableEntryDetail>>;
    /// Distinct class groups a teacher has timetable entries for.
    async fn teacher_class_groups(&self, teacher_id: i64) -> Result<Vec<ClassGroupDetail>>;
    async fn teacher_teaches_class(&self, teacher_id: i64, class_group_id: i64) -> Result<bool>;

    // Academics: attendance
    async fn attendance_for_class_date(
        &self,
        class_group_id: i64,
        date: NaiveDate,
    ) -> Result<HashMap<i64, AttendanceStatus>>;
    /// Upserts every mark in one transaction.
    async fn mark_attendance(
        &self,
        class_group_id: i64,
        date: NaiveDate,
        marks: Vec<AttendanceMark>,
        recorded_by: i64,
    ) -> Result<usize>;
    /// Newest first.
    async fn list_attendance(
        &self,
        student_ids: &[i64],
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<AttendanceRow>>;
    async fn attendance_counts_since(
        &self,
        student_ids: &[i64],
        since: NaiveDate,
    ) -> Result<HashMap<i64, AttendanceCounts>>;
    async fn attendance_summary_since(&self, since: NaiveDate) -> Result<AttendanceCounts>;
    async fn recent_absences(&self, since: NaiveDate, limit: u64) -> Result<Vec<AttendanceRow>>;

    // Academics: assessments and grades
    async fn list_teacher_assessments(
        &self,
        teacher_id: i64,
        search: Option<String>,
        limit: u64,
    ) -> Result<Vec<AssessmentDetail>>;
    async fn get_assessment(&self, id: i64) -> Result<Option<AssessmentDetail>>;
    async fn create_assessment(&self, assessment: NewAssessment) -> Result<AssessmentDetail>;
    async fn grades_for_assessment(&self, assessment_id: i64) -> Result<HashMap<i64, Grade>>;
    /// Upserts every grade in one transaction.
    async fn upsert_grades(&self, assessment_id: i64, grades: Vec<GradeUpsert>) -> Result<usize>;
    /// Newest assessment date first.
    async fn list_grades(
        &self,
        student_ids: &[i64],
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<GradeRow>>;

    // Finance
    async fn list_fee_structures(&self) -> Result<Vec<FeeStructure>>;
    async fn get_fee_structure(&self, id: i64) -> Result<Option<FeeStructure>>;
    async fn create_fee_structure(
        &self,
        name: &str,
        grade: &str,
        amount: crate::utils::Money,
    ) -> Result<FeeStructure>;
    async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceRow>;
    async fn get_invoice(&self, id: i64) -> Result<Option<InvoiceRow>>;
    /// Newest first; `None` lists every student.
    async fn list_invoices(
        &self,
        student_ids: Option<&[i64]>,
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<InvoiceRow>>;
    async fn count_invoices(&self, student_ids: Option<&[i64]>) -> Result<u64>;
    async fn list_payments(&self, invoice_id: i64) -> Result<Vec<Payment>>;
    async fn list_student_payments(
        &self,
        student_id: i64,
        range: Option<DateRange>,
        limit: u64,
    ) -> Result<Vec<Payment>>;
    async fn list_proofs(&self, invoice_id: i64) -> Result<Vec<PaymentProof>>;
    async fn get_proof(&self, id: i64) -> Result<Option<PaymentProof>>;
    /// Inserts the payment and recomputes the invoice status.
    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentOutcome>;
    /// Stores the proof and moves the invoice to pending verification.
    async fn create_proof(&self, proof: NewProof) -> Result<(PaymentProof, InvoiceStatus)>;
    async fn proof_queue(&self, search: Option<String>, limit: u64) -> Result<Vec<ProofQueueRow>>;
    async fn verify_proof(
        &self,
        proof_id: i64,
        req: VerifyProofRequest,
        verifier_id: i64,
        today: NaiveDate,
    ) -> Result<VerifyOutcome>;
    async fn reminder_targets(&self, cutoff: NaiveDate) -> Result<Vec<ReminderTarget>>;
    async fn latest_invoice_snapshots(
        &self,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, InvoiceSnapshot>>;
    async fn finance_stats(&self, today: NaiveDate) -> Result<FinanceStats>;

    // Comms
    async fn list_inbox(
        &self,
        viewer_id: i64,
        scope: InboxScope,
        search: Option<String>,
    ) -> Result<Vec<InboxRow>>;
    async fn get_inbox_row(&self, thread_id: i64, viewer_id: i64) -> Result<Option<InboxRow>>;
    async fn get_thread(&self, id: i64) -> Result<Option<Thread>>;
    /// Returns the thread and whether it was created.
    async fn get_or_create_thread(
        &self,
        student_id: i64,
        teacher_id: i64,
        parent_id: i64,
    ) -> Result<(Thread, bool)>;
    /// Oldest first.
    async fn list_messages(&self, thread_id: i64) -> Result<Vec<MessageRow>>;
    /// Inserts the message, bumps the thread and marks it read for the sender.
    async fn create_message(&self, thread_id: i64, sender_id: i64, body: &str) -> Result<Message>;
    async fn mark_thread_read(&self, thread_id: i64, user_id: i64) -> Result<()>;
    async fn count_threads(&self, scope: InboxScope) -> Result<u64>;
    async fn count_messages_sent(&self, user_id: i64) -> Result<u64>;
    async fn create_notification(&self, notification: NewNotification)
    -> Result<NotificationLog>;
    async fn update_notification_status(
        &self,
        id: i64,
        status: NotificationStatus,
        error: Option<String>,
    ) -> Result<()>;
    async fn list_recent_notifications(&self, limit: u64) -> Result<Vec<NotificationLog>>;
    async fn get_or_create_preference(&self, user_id: i64) -> Result<NotificationPreference>;
    async fn update_preference(
        &self,
        user_id: i64,
        req: UpdatePreferencesRequest,
    ) -> Result<NotificationPreference>;
    async fn create_performance_note(
        &self,
        student_id: i64,
        teacher_id: i64,
        term_month: NaiveDate,
        summary: &str,
    ) -> Result<PerformanceNote>;
    async fn create_behaviour_record(
        &self,
        student_id: i64,
        teacher_id: i64,
        occurred_on: NaiveDate,
        note: &str,
    ) -> Result<BehaviourRecord>;
    /// Newest first; `month` is the first day of a month.
    async fn list_performance_notes(
        &self,
        student_id: i64,
        month: Option<NaiveDate>,
    ) -> Result<Vec<PerformanceNote>>;
    /// Newest first.
    async fn list_behaviour_records(
        &self,
        student_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<BehaviourRecord>>;

    // RBAC
    async fn list_permissions(&self) -> Result<Vec<Permission>>;
    async fn create_permission(&self, code: &str, name: &str) -> Result<Permission>;
    /// Get-or-create by code.
    async fn ensure_permission(&self, code: &str, name: &str) -> Result<Permission>;
    async fn list_roles(&self) -> Result<Vec<Role>>;
    async fn get_role(&self, id: i64) -> Result<Option<Role>>;
    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>>;
    async fn create_role(&self, name: &str, description: &str, codes: &[String]) -> Result<Role>;
    async fn update_role(&self, id: i64, req: UpdateRoleRequest) -> Result<Option<Role>>;
    async fn delete_role(&self, id: i64) -> Result<bool>;
    /// Ordered by username then role name.
    async fn list_assignments(&self, limit: u64) -> Result<Vec<RoleAssignment>>;
    /// Get-or-create; the flag tells whether a row was inserted.
    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<(RoleAssignment, bool)>;
    async fn revoke_assignment(&self, id: i64) -> Result<bool>;
    async fn user_has_permission(&self, user_id: i64, code: &str) -> Result<bool>;

    // Registrar
    /// Newest first.
    async fn list_applications(
        &self,
        search: Option<String>,
        status: Option<ApplicationStatus>,
        limit: u64,
    ) -> Result<Vec<AdmissionApplication>>;
    async fn get_application(&self, id: i64) -> Result<Option<AdmissionApplication>>;
    async fn create_application(&self, req: CreateApplicationRequest)
    -> Result<AdmissionApplication>;
    async fn update_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<AdmissionApplication>>;
    /// Student, enrollment, guardian link and application update in one transaction.
    async fn admit_application(&self, plan: AdmitPlan) -> Result<AdmitOutcome>;
    /// One bulk admission row in one transaction.
    async fn import_admission_row(
        &self,
        row: AdmissionRow,
        parent: ParentSpec,
    ) -> Result<AdmissionRowOutcome>;
    async fn application_counts(&self) -> Result<ApplicationCounts>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
