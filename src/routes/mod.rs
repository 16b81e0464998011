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

pub use academics::configure_academics_routes;
pub use auth::configure_auth_routes;
pub use comms::configure_comms_routes;
pub use finance::configure_finance_routes;
pub use people::configure_people_routes;
pub use rbac::configure_rbac_routes;
pub use registrar::configure_registrar_routes;
pub use reports::configure_reports_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// Mounts every API scope.
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    configure_auth_routes(cfg);
    configure_user_routes(cfg);
    configure_system_routes(cfg);
    configure_people_routes(cfg);
    configure_academics_routes(cfg);
    configure_finance_routes(cfg);
    configure_comms_routes(cfg);
    configure_rbac_routes(cfg);
    configure_registrar_routes(cfg);
    configure_reports_routes(cfg);
}
