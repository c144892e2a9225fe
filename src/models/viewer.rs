//! Viewer identity
//!
//! Every visibility and ownership decision takes the viewer explicitly as a
//! parameter instead of reading an ambient "current user". Handlers build a
//! `Viewer` from the (optional) authenticated session and pass it down.

/// The actor making the current request, authenticated or anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// No authenticated session
    Anonymous,
    /// Authenticated user with the given id
    User(i64),
}

impl Viewer {
    /// Build a viewer from an optional authenticated user id
    pub fn from_user_id(user_id: Option<i64>) -> Self {
        match user_id {
            Some(id) => Viewer::User(id),
            None => Viewer::Anonymous,
        }
    }

    /// The authenticated user id, if any
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Viewer::User(id) => Some(*id),
            Viewer::Anonymous => None,
        }
    }

    /// Whether this viewer is the authenticated user with the given id.
    ///
    /// Anonymous viewers match nobody.
    pub fn is_user(&self, id: i64) -> bool {
        matches!(self, Viewer::User(uid) if *uid == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_id() {
        assert_eq!(Viewer::from_user_id(Some(7)), Viewer::User(7));
        assert_eq!(Viewer::from_user_id(None), Viewer::Anonymous);
    }

    #[test]
    fn test_user_id() {
        assert_eq!(Viewer::User(3).user_id(), Some(3));
        assert_eq!(Viewer::Anonymous.user_id(), None);
    }

    #[test]
    fn test_is_user() {
        assert!(Viewer::User(5).is_user(5));
        assert!(!Viewer::User(5).is_user(6));
        assert!(!Viewer::Anonymous.is_user(5));
    }
}
