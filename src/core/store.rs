use crate::domain::model::ParsePolicy;

/// Persistence and parsing behaviour shared by the book store and user service.
///
/// `add` always rewrites the backing file. Every other mutation (remove,
/// update, checkout flag) is written only when `auto_persist` is set;
/// otherwise it stays in memory until `save()` is called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub auto_persist: bool,
    pub policy: ParsePolicy,
}

impl StoreOptions {
    pub fn strict() -> Self {
        Self {
            policy: ParsePolicy::Strict,
            ..Self::default()
        }
    }

    pub fn with_auto_persist(mut self, auto_persist: bool) -> Self {
        self.auto_persist = auto_persist;
        self
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }
}
