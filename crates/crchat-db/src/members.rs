use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use tracing::info;

use crchat_types::models::NewAction;

use crate::document::{Backend, Document};
use crate::error::{Result, StoreError};

/// Persisted as `password -> login`.
///
/// This mapping direction is kept for compatibility with existing member
/// documents. It stores passwords in plaintext and makes two logins sharing a
/// password impossible: the later sign-up overwrites the earlier entry.
pub type MemberMap = BTreeMap<String, String>;

/// Registered chat members.
pub struct Members {
    doc: Document<MemberMap>,
    /// Logins registered by this process. Not rebuilt from the document, so
    /// uniqueness only holds for sign-ups since startup.
    logins: Mutex<HashSet<String>>,
}

impl Members {
    pub fn open(backend: impl Backend + 'static) -> Result<Self> {
        Ok(Self {
            doc: Document::open(backend, MemberMap::new())?,
            logins: Mutex::new(HashSet::new()),
        })
    }

    pub fn is_login_used(&self, login: &str) -> Result<bool> {
        Ok(self.lock_logins()?.contains(login))
    }

    /// True if `password` is registered to exactly `login`.
    pub fn auth(&self, login: &str, password: &str) -> Result<bool> {
        let members = self.doc.load()?;
        if members.get(password).is_some_and(|found| found == login) {
            info!("Auth member with login {}: successful", login);
            return Ok(true);
        }
        info!("Auth: member {} was not found", login);
        Ok(false)
    }

    /// Register the sign-up's login under its password (`item.content`).
    ///
    /// Returns `false`, without touching the document, if the login was
    /// already registered by this process.
    pub fn add(&self, item: &NewAction) -> Result<bool> {
        let mut logins = self.lock_logins()?;
        if logins.contains(&item.login) {
            return Ok(false);
        }

        self.doc.transact(|members| {
            members.insert(item.content.clone(), item.login.clone());
            Ok(())
        })?;
        logins.insert(item.login.clone());

        info!("Member with login {} registered", item.login);
        Ok(true)
    }

    pub fn get(&self) -> Result<MemberMap> {
        self.doc.load()
    }

    pub fn get_serialized(&self) -> Result<String> {
        self.doc.load_raw()
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.doc.load()?.len())
    }

    fn lock_logins(&self) -> Result<std::sync::MutexGuard<'_, HashSet<String>>> {
        self.logins
            .lock()
            .map_err(|_| StoreError::LockPoisoned(format!("{} logins", self.doc.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryBackend;

    #[test]
    fn sign_up_then_auth() {
        let backend = MemoryBackend::new("members");
        let members = Members::open(backend.clone()).unwrap();

        assert!(!members.is_login_used("alice").unwrap());
        assert!(members.add(&NewAction::sign_up("alice", "p1")).unwrap());
        assert!(members.is_login_used("alice").unwrap());

        assert!(members.auth("alice", "p1").unwrap());
        assert!(!members.auth("alice", "wrong").unwrap());
        assert!(!members.auth("bob", "p1").unwrap());
        assert_eq!(backend.bytes().as_deref(), Some(&br#"{"p1":"alice"}"#[..]));
    }

    #[test]
    fn duplicate_login_is_refused_without_growing_document() {
        let members = Members::open(MemoryBackend::new("members")).unwrap();
        assert!(members.add(&NewAction::sign_up("alice", "p1")).unwrap());
        assert!(!members.add(&NewAction::sign_up("alice", "p2")).unwrap());
        assert_eq!(members.size().unwrap(), 1);
        assert!(!members.auth("alice", "p2").unwrap());
    }

    #[test]
    fn shared_password_overwrites_earlier_member() {
        let members = Members::open(MemoryBackend::new("members")).unwrap();
        members.add(&NewAction::sign_up("alice", "same")).unwrap();
        members.add(&NewAction::sign_up("bob", "same")).unwrap();

        assert_eq!(members.size().unwrap(), 1);
        assert!(members.auth("bob", "same").unwrap());
        assert!(!members.auth("alice", "same").unwrap());
    }

    #[test]
    fn logins_are_not_recovered_from_document() {
        let backend = MemoryBackend::with_contents("members", r#"{"p1":"alice"}"#);
        let members = Members::open(backend).unwrap();
        assert!(members.auth("alice", "p1").unwrap());
        assert!(!members.is_login_used("alice").unwrap());
    }
}
