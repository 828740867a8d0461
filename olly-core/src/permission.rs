//! Administrative capability check.

/// The user behind a request and whether they hold administrative rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub is_admin: bool,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin,
        }
    }

    pub fn member(user_id: impl Into<String>) -> Self {
        Self::new(user_id, false)
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, true)
    }
}

/// Rejection for a caller without administrative rights.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{user_id} is not an administrator")]
pub struct PermissionDenied {
    pub user_id: String,
}

/// Gate for administrative operations.
pub fn require_admin(caller: &Caller) -> Result<(), PermissionDenied> {
    if caller.is_admin {
        Ok(())
    } else {
        tracing::debug!(user_id = %caller.user_id, "Administrative operation denied");
        Err(PermissionDenied {
            user_id: caller.user_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes() {
        assert!(require_admin(&Caller::admin("root")).is_ok());
    }

    #[test]
    fn member_is_denied() {
        let err = require_admin(&Caller::member("bob")).unwrap_err();
        assert_eq!(err.user_id, "bob");
        assert_eq!(err.to_string(), "bob is not an administrator");
    }
}
