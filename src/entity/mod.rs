//! SeaORM entity definitions
//!
//! These map tables one to one and stay separate from the business types in
//! `models`. The storage layer reads and writes them, then converts to models.

pub mod prelude;

pub mod academic_years;
pub mod admission_applications;
pub mod assessments;
pub mod attendance_records;
pub mod behaviour_records;
pub mod class_groups;
pub mod enrollments;
pub mod fee_invoices;
pub mod fee_structures;
pub mod grades;
pub mod messages;
pub mod notification_logs;
pub mod notification_preferences;
pub mod payment_proofs;
pub mod payments;
pub mod performance_notes;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod student_guardians;
pub mod students;
pub mod subjects;
pub mod system_settings;
pub mod thread_read_states;
pub mod threads;
pub mod timetable_entries;
pub mod user_roles;
pub mod users;
