//! Short aliases for the entities

pub use super::academic_years::Entity as AcademicYears;
pub use super::admission_applications::Entity as AdmissionApplications;
pub use super::assessments::Entity as Assessments;
pub use super::attendance_records::Entity as AttendanceRecords;
pub use super::behaviour_records::Entity as BehaviourRecords;
pub use super::class_groups::Entity as ClassGroups;
pub use super::enrollments::Entity as Enrollments;
pub use super::fee_invoices::Entity as FeeInvoices;
pub use super::fee_structures::Entity as FeeStructures;
pub use super::grades::Entity as Grades;
pub use super::messages::Entity as Messages;
pub use super::notification_logs::Entity as NotificationLogs;
pub use super::notification_preferences::Entity as NotificationPreferences;
pub use super::payment_proofs::Entity as PaymentProofs;
pub use super::payments::Entity as Payments;
pub use super::performance_notes::Entity as PerformanceNotes;
pub use super::permissions::Entity as Permissions;
pub use super::role_permissions::Entity as RolePermissions;
pub use super::roles::Entity as Roles;
pub use super::student_guardians::Entity as StudentGuardians;
pub use super::students::Entity as Students;
pub use super::subjects::Entity as Subjects;
pub use super::system_settings::Entity as SystemSettings;
pub use super::thread_read_states::Entity as ThreadReadStates;
pub use super::threads::Entity as Threads;
pub use super::timetable_entries::Entity as TimetableEntries;
pub use super::user_roles::Entity as UserRoles;
pub use super::users::Entity as Users;
