//! In-memory user collection backed by a flat file.
//!
//! Ids come from a counter owned by the service, seeded from the highest
//! id on disk. Removing a user never frees its id for reuse, unlike
//! handing out "current collection size" as the next id.

use crate::core::collection::{load_records, save_records};
use crate::core::store::StoreOptions;
use crate::domain::model::{FieldIssue, User, ROLE_USER};
use crate::utils::error::{CatalogError, Result};
use std::path::{Path, PathBuf};

/// Not safe for concurrent mutation; wrap in a mutex if it must be shared.
#[derive(Debug)]
pub struct UserService {
    path: PathBuf,
    options: StoreOptions,
    users: Vec<User>,
    next_id: i64,
    load_issues: Vec<FieldIssue>,
}

impl UserService {
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let path = path.into();
        let loaded = load_records::<User>(&path, options.policy)?;
        let next_id = match loaded.records.iter().map(|u| u.id).max() {
            Some(max) => max
                .checked_add(1)
                .ok_or(CatalogError::IdSpaceExhausted { last_id: max })?,
            None => 0,
        };

        tracing::info!("👤 Loaded {} users from {}", loaded.records.len(), path.display());

        Ok(Self {
            path,
            options,
            users: loaded.records,
            next_id,
            load_issues: loaded.issues,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Fields that were defaulted while loading under the lenient policy.
    pub fn load_issues(&self) -> &[FieldIssue] {
        &self.load_issues
    }

    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn find_by_name(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn find_by_id(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Adds a user with the default `"user"` role.
    pub fn add(&mut self, name: &str, password: &str) -> Result<User> {
        self.add_with_role(name, password, ROLE_USER)
    }

    /// Appends a user under a fresh id and rewrites the file.
    ///
    /// On a write failure the user stays in memory; the error only means the
    /// file is behind. Nothing is added once the id counter would overflow.
    pub fn add_with_role(&mut self, name: &str, password: &str, role: &str) -> Result<User> {
        let following = self
            .next_id
            .checked_add(1)
            .ok_or(CatalogError::IdSpaceExhausted {
                last_id: self.next_id,
            })?;
        let user = User::new(self.next_id, name, password, role);
        self.next_id = following;
        self.users.push(user.clone());
        tracing::debug!("Added user {} with id {}", user.name, user.id);

        self.save()?;
        Ok(user)
    }

    /// Replaces the user with `id`, keeping the id. Returns the previous value.
    pub fn update(
        &mut self,
        id: i64,
        name: &str,
        password: &str,
        role: &str,
    ) -> Result<Option<User>> {
        let Some(slot) = self.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        let previous = std::mem::replace(slot, User::new(id, name, password, role));

        self.persist_if_auto()?;
        Ok(Some(previous))
    }

    /// Removes the first user with `id`.
    pub fn remove(&mut self, id: i64) -> Result<Option<User>> {
        let Some(index) = self.users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        let removed = self.users.remove(index);
        tracing::debug!("Removed user {} ({})", removed.id, removed.name);

        self.persist_if_auto()?;
        Ok(Some(removed))
    }

    pub fn save(&self) -> Result<()> {
        save_records(&self.path, &self.users)
    }

    fn persist_if_auto(&self) -> Result<()> {
        if self.options.auto_persist {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ParsePolicy;
    use tempfile::TempDir;

    fn open(dir: &TempDir, options: StoreOptions) -> UserService {
        UserService::open(dir.path().join("users.txt"), options).unwrap()
    }

    #[test]
    fn test_ids_start_at_zero() {
        let dir = TempDir::new().unwrap();
        let mut service = open(&dir, StoreOptions::default());

        assert_eq!(service.add("alice", "pw1").unwrap().id, 0);
        assert_eq!(service.add("bob", "pw2").unwrap().id, 1);
        assert_eq!(service.list()[1].role, "user");
    }

    #[test]
    fn test_add_persists() {
        let dir = TempDir::new().unwrap();
        let mut service = open(&dir, StoreOptions::default());
        service.add("alice", "pw1").unwrap();
        service.add_with_role("bob", "pw2", "librarian").unwrap();

        let content = std::fs::read_to_string(service.path()).unwrap();
        assert_eq!(content, "0,alice,pw1,user\n1,bob,pw2,librarian\n");
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let dir = TempDir::new().unwrap();
        let mut service = open(&dir, StoreOptions::default());
        service.add("alice", "pw1").unwrap();
        service.add("bob", "pw2").unwrap();

        service.remove(1).unwrap();
        let carol = service.add("carol", "pw3").unwrap();
        assert_eq!(carol.id, 2);
        assert!(service.find_by_id(1).is_none());
    }

    #[test]
    fn test_counter_seeded_from_highest_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "4,alice,pw1,user\n9,bob,pw2,user\n").unwrap();

        let mut service = UserService::open(&path, StoreOptions::default()).unwrap();
        assert_eq!(service.next_id(), 10);
        assert_eq!(service.add("carol", "pw3").unwrap().id, 10);
    }

    #[test]
    fn test_highest_possible_id_is_not_wrapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "9223372036854775807,alice,pw,user\n").unwrap();

        let err = UserService::open(&path, StoreOptions::strict()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IdSpaceExhausted { last_id: i64::MAX }
        ));
    }

    #[test]
    fn test_add_stops_before_id_overflow() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "9223372036854775806,alice,pw,user\n").unwrap();

        let mut service = UserService::open(&path, StoreOptions::strict()).unwrap();
        assert_eq!(service.next_id(), i64::MAX);

        let err = service.add("bob", "pw2").unwrap_err();
        assert!(matches!(err, CatalogError::IdSpaceExhausted { .. }));
        assert_eq!(service.len(), 1);
        assert_eq!(service.next_id(), i64::MAX);
    }

    #[test]
    fn test_find_by_name() {
        let dir = TempDir::new().unwrap();
        let mut service = open(&dir, StoreOptions::default());
        service.add("alice", "pw1").unwrap();
        service.add("alice", "other").unwrap();

        assert_eq!(service.find_by_name("alice").unwrap().password, "pw1");
        assert!(service.find_by_name("nonexistent").is_none());
    }

    #[test]
    fn test_remove_without_auto_persist_stays_in_memory() {
        let dir = TempDir::new().unwrap();
        let mut service = open(&dir, StoreOptions::default());
        service.add("alice", "pw1").unwrap();

        assert!(service.remove(0).unwrap().is_some());
        assert!(service.is_empty());
        let reopened = open(&dir, StoreOptions::default());
        assert_eq!(reopened.len(), 1);

        service.save().unwrap();
        let reopened = open(&dir, StoreOptions::default());
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_remove_with_auto_persist_writes_file() {
        let dir = TempDir::new().unwrap();
        let options = StoreOptions::default().with_auto_persist(true);
        let mut service = open(&dir, options);
        service.add("alice", "pw1").unwrap();
        service.add("bob", "pw2").unwrap();

        service.remove(0).unwrap();
        let reopened = open(&dir, options);
        assert_eq!(reopened.list(), &[User::new(1, "bob", "pw2", "user")]);
    }

    #[test]
    fn test_remove_unknown_id() {
        let dir = TempDir::new().unwrap();
        let mut service = open(&dir, StoreOptions::default());
        assert!(service.remove(42).unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_id() {
        let dir = TempDir::new().unwrap();
        let options = StoreOptions::default().with_auto_persist(true);
        let mut service = open(&dir, options);
        service.add("cameron", "pw").unwrap();
        service.add("erykah", "pw2").unwrap();

        let previous = service.update(1, "eric", "layla", "user").unwrap().unwrap();
        assert_eq!(previous.name, "erykah");
        assert_eq!(service.find_by_id(1).unwrap().name, "eric");
        assert!(service.update(7, "x", "y", "user").unwrap().is_none());

        let reopened = open(&dir, options);
        assert_eq!(reopened.find_by_id(1).unwrap().password, "layla");
    }

    #[test]
    fn test_strict_open_rejects_bad_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "0,alice,pw1,user\nbob,pw2,user,extra\n").unwrap();

        let err = UserService::open(&path, StoreOptions::strict()).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord { line: 2, .. }));

        let service =
            UserService::open(&path, StoreOptions::default().with_policy(ParsePolicy::Lenient))
                .unwrap();
        assert_eq!(service.load_issues().len(), 1);
        assert_eq!(service.load_issues()[0].line, 2);
    }
}
