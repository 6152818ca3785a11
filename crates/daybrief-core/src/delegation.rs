//! Assistant delegation rules.
//!
//! Decides which items may be handed to the external assistant and with
//! what permissions. Family and personal items never leave the user's
//! hands; parked ideas are not worth delegating.

use serde::{Deserialize, Serialize};

use crate::item::{Domain, PlanItem};

/// What the assistant may do with a delegated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationPermissions {
    pub can_view: bool,
    pub can_mark_done: bool,
    pub can_edit: bool,
    pub can_reschedule: bool,
    pub can_delete: bool,
    pub can_reassign: bool,
}

impl Default for DelegationPermissions {
    /// The assistant may look and tick things off, nothing more.
    fn default() -> Self {
        Self {
            can_view: true,
            can_mark_done: true,
            can_edit: false,
            can_reschedule: false,
            can_delete: false,
            can_reassign: false,
        }
    }
}

/// True iff the item may be delegated to the assistant.
pub fn can_delegate(item: &PlanItem) -> bool {
    if item.is_family() {
        return false;
    }
    if item.labels.iter().any(|l| l == "personal") {
        return false;
    }
    item.domain != Domain::Parking
}

/// Permissions granted for a delegated item. Fixed for now; kept as a
/// function so per-item grants have somewhere to live later.
pub fn delegation_permissions(_item: &PlanItem) -> DelegationPermissions {
    DelegationPermissions::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item() -> PlanItem {
        PlanItem::new("t", "Task", Utc.with_ymd_and_hms(2026, 1, 28, 8, 0, 0).unwrap())
    }

    #[test]
    fn family_items_are_never_delegated() {
        assert!(!can_delegate(&item().with_family_override(true)));
        assert!(!can_delegate(&item().with_label("family")));
    }

    #[test]
    fn personal_and_parked_items_stay_home() {
        assert!(!can_delegate(&item().with_label("personal")));
        assert!(!can_delegate(&item().with_domain(Domain::Parking)));
    }

    #[test]
    fn work_items_are_delegable_with_limited_permissions() {
        let task = item().with_domain(Domain::Work);
        assert!(can_delegate(&task));

        let perms = delegation_permissions(&task);
        assert!(perms.can_view && perms.can_mark_done);
        assert!(!perms.can_edit && !perms.can_reschedule && !perms.can_delete && !perms.can_reassign);
    }
}
