//! # Ownership / Capability Resolution
//!
//! The uniform check behind every mutating endpoint on threads and
//! responses. Pinning is the exception: it requires the elevated capability
//! unconditionally, so its callers check [`Account::has_capability`]
//! directly instead of going through [`can_mutate`].

use domains::{Account, Capability};
use uuid::Uuid;

/// True iff `actor` owns the resource or holds the elevated capability.
///
/// Pure predicate with no side effects; callers translate a false result
/// into a `Forbidden` outcome with an action-specific message.
pub fn can_mutate(actor: &Account, owner_id: Uuid, capability: Capability) -> bool {
    actor.id == owner_id || actor.has_capability(capability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(capabilities: Vec<Capability>) -> Account {
        Account {
            id: Uuid::now_v7(),
            name: "someone".to_string(),
            capabilities,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_may_mutate_without_any_capability() {
        let owner = account(vec![]);
        assert!(can_mutate(&owner, owner.id, Capability::CanRemoveAnyResponse));
    }

    #[test]
    fn stranger_without_capability_may_not() {
        let actor = account(vec![]);
        assert!(!can_mutate(&actor, Uuid::now_v7(), Capability::CanRemoveAnyResponse));
    }

    #[test]
    fn capability_holder_may_mutate_others_resources() {
        let moderator = account(vec![Capability::CanRemoveAnyResponse]);
        assert!(can_mutate(
            &moderator,
            Uuid::now_v7(),
            Capability::CanRemoveAnyResponse
        ));
    }

    #[test]
    fn holding_a_different_capability_does_not_help() {
        let moderator = account(vec![Capability::CanPinThreads]);
        assert!(!can_mutate(
            &moderator,
            Uuid::now_v7(),
            Capability::CanDeleteAnyThread
        ));
    }
}
