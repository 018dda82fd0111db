/// A stored account.
///
/// `password_hash` is an argon2 PHC string for internal accounts and a
/// random placeholder for accounts provisioned through SSO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: String,
}
