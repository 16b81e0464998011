pub mod csv_import;
pub mod dates;
pub mod extractor;
pub mod file_magic;
pub mod jwt;
pub mod money;
pub mod parameter_error_handler;
pub mod password;
pub mod pdf;
pub mod random_code;
pub mod sql;
pub mod validate;

pub use extractor::{SafeIDI64, SafeSettingKey, SafeStudentIdI64};
pub use file_magic::validate_magic_bytes;
pub use money::Money;
pub use parameter_error_handler::{json_error_handler, path_error_handler, query_error_handler};
pub use sql::search_term;
