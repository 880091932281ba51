//! Authorization guards.

use std::collections::HashSet;

/// Decides whether a document may be edited.
///
/// Asked once before a document is read and again before it is written.
pub trait Guard: Send + Sync {
    /// Whether `id` may be edited.
    fn can_edit(&self, id: &str) -> bool;
}

impl<F> Guard for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn can_edit(&self, id: &str) -> bool {
        self(id)
    }
}

/// Allows every document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Guard for AllowAll {
    fn can_edit(&self, _id: &str) -> bool {
        true
    }
}

/// Allows a fixed set of document ids.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    ids: HashSet<String>,
}

impl AllowList {
    /// Create an allow-list.
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Guard for AllowList {
    fn can_edit(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.can_edit("anything"));
    }

    #[test]
    fn test_allow_list() {
        let guard = AllowList::new(["home.txt", "about.txt"]);

        assert!(guard.can_edit("home.txt"));
        assert!(!guard.can_edit("secret.txt"));
        assert!(!AllowList::default().can_edit("home.txt"));
    }

    #[test]
    fn test_closure_guard() {
        let guard = |id: &str| id.starts_with("public/");

        assert!(guard.can_edit("public/home"));
        assert!(!guard.can_edit("private/home"));
    }
}
