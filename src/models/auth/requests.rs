use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: String,
    /// Role picked on the login form; must match the account.
    pub role: Option<String>,
    #[serde(default)]
    pub remember_me: bool,
}
