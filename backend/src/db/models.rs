use sqlx::FromRow;

/// A stored account. Deliberately not `Serialize`: responses go through
/// dedicated view types so the password hash can never leak.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
