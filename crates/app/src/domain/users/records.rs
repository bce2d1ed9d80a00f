//! User Records

use jiff::Timestamp;

use crate::ids::TypedId;

/// User (tenant) id
pub type UserId = TypedId<UserRecord>;

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Stable numeric identity.
    pub id: UserId,

    /// Whether this is the administrative user provisioned on first start.
    pub superuser: bool,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Set while the user is disabled; every token of a disabled user is rejected.
    pub disabled_at: Option<Timestamp>,
}

impl UserRecord {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.disabled_at.is_none()
    }
}
