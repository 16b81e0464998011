use serde::{Deserialize, Serialize};

/// Numeric codes carried in every API response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Success = 0,

    // General
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // Auth
    AuthFailed = 2000,
    RoleMismatch = 2001,
    RoleRequired = 2002,
    TermsNotAccepted = 2003,
    AccountInactive = 2004,

    // Users
    UserNameInvalid = 2100,
    UserEmailInvalid = 2101,
    UserPasswordInvalid = 2102,
    UserAlreadyExists = 2103,
    UserNotFound = 2104,
    CanNotDeleteCurrentUser = 2105,

    // People / academics
    StudentNotFound = 3000,
    StudentAlreadyExists = 3001,
    StudentNotLinked = 3002,
    ClassGroupNotFound = 3100,
    NotAssignedToClass = 3101,
    AssessmentNotFound = 3102,
    GradeInvalid = 3103,

    // Finance
    InvoiceNotFound = 4000,
    ProofNotFound = 4001,
    ProofAlreadyVerified = 4002,
    FeeStructureNotFound = 4003,

    // Comms
    ThreadNotFound = 5000,

    // Registrar
    ApplicationNotFound = 6000,
    ApplicationStatusInvalid = 6001,

    // Files / import
    FileUploadFailed = 7000,
    FileTypeNotAllowed = 7001,
    FileSizeExceeded = 7002,
    FileNotFound = 7003,
    MultifileUploadNotAllowed = 7004,
    ImportFileMissingColumn = 7100,
    ImportFileParseFailed = 7101,
    ImportFileDataInvalid = 7102,
}
