pub(crate) mod access;
pub mod academics;
pub mod auth;
pub mod comms;
pub mod finance;
pub mod people;
pub mod rbac;
pub mod registrar;
pub mod reports;
pub mod system;
pub mod users;

pub use academics::AcademicsService;
pub use auth::AuthService;
pub use comms::CommsService;
pub use finance::FinanceService;
pub use people::PeopleService;
pub use rbac::RbacService;
pub use registrar::RegistrarService;
pub use reports::ReportsService;
pub use system::SystemService;
pub use users::UserService;
