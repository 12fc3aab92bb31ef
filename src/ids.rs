//! Group id generation.
//!
//! The editor never invents ids itself; it asks an injected generator so
//! tests can use predictable ids.

use crate::types::GroupId;

/// Source of fresh, unique group ids.
pub trait GroupIdGenerator {
    fn next_id(&mut self) -> GroupId;
}

/// Random UUID v4 ids, the production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGroupIds;

impl GroupIdGenerator for UuidGroupIds {
    fn next_id(&mut self) -> GroupId {
        GroupId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Deterministic `<prefix>-1`, `<prefix>-2`, ... ids.
#[derive(Debug, Clone)]
pub struct SequentialGroupIds {
    prefix: String,
    next: u64,
}

impl SequentialGroupIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialGroupIds {
    fn default() -> Self {
        Self::new("group")
    }
}

impl GroupIdGenerator for SequentialGroupIds {
    fn next_id(&mut self) -> GroupId {
        let id = GroupId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
