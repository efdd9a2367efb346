use huddle_calling::{CapabilityKind, CapabilityResolutionReason, CapabilitySet};
use serde::{Deserialize, Serialize};

use crate::state::ToastNotificationKind;

/// Whether capability changes surface a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitiesChangeNotificationMode {
    #[default]
    AlwaysDisplay,
    NeverDisplay,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilitiesManager {
    pub notification_mode: CapabilitiesChangeNotificationMode,
}

impl CapabilitiesManager {
    pub fn new(notification_mode: CapabilitiesChangeNotificationMode) -> Self {
        Self { notification_mode }
    }

    /// A kind is held only when present with a `Capable` resolution.
    pub fn has_capability(&self, capabilities: &CapabilitySet, kind: CapabilityKind) -> bool {
        capabilities
            .iter()
            .any(|c| c.kind == kind && c.reason == CapabilityResolutionReason::Capable)
    }

    /// Toast for a transition between two non-initial sets. Losses outrank
    /// gains.
    pub fn change_notification(
        &self,
        previous: &CapabilitySet,
        next: &CapabilitySet,
    ) -> Option<ToastNotificationKind> {
        if self.notification_mode == CapabilitiesChangeNotificationMode::NeverDisplay {
            return None;
        }
        let held = |set: &CapabilitySet| -> Vec<CapabilityKind> {
            let mut kinds: Vec<_> = set
                .iter()
                .filter(|c| c.reason == CapabilityResolutionReason::Capable)
                .map(|c| c.kind)
                .collect();
            kinds.dedup();
            kinds
        };
        let before = held(previous);
        let after = held(next);

        if before.iter().any(|k| !after.contains(k)) {
            Some(ToastNotificationKind::SomeFeaturesLost)
        } else if after.iter().any(|k| !before.contains(k)) {
            Some(ToastNotificationKind::SomeFeaturesGained)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_calling::ParticipantCapability;

    fn set(kinds: &[CapabilityKind]) -> CapabilitySet {
        kinds.iter().copied().map(ParticipantCapability::capable).collect()
    }

    #[test]
    fn restricted_capability_is_not_held() {
        let manager = CapabilitiesManager::default();
        let mut caps = CapabilitySet::new();
        caps.insert(ParticipantCapability {
            kind: CapabilityKind::TurnVideoOn,
            reason: CapabilityResolutionReason::RoleRestricted,
        });
        assert!(!manager.has_capability(&caps, CapabilityKind::TurnVideoOn));
        assert!(manager.has_capability(
            &set(&[CapabilityKind::TurnVideoOn]),
            CapabilityKind::TurnVideoOn
        ));
    }

    #[test]
    fn loss_outranks_gain() {
        let manager = CapabilitiesManager::default();
        let before = set(&[CapabilityKind::TurnVideoOn]);
        let after = set(&[CapabilityKind::UnmuteMicrophone]);
        assert_eq!(
            manager.change_notification(&before, &after),
            Some(ToastNotificationKind::SomeFeaturesLost)
        );
        assert_eq!(
            manager.change_notification(&after, &set(&[
                CapabilityKind::UnmuteMicrophone,
                CapabilityKind::ShareScreen
            ])),
            Some(ToastNotificationKind::SomeFeaturesGained)
        );
        assert_eq!(manager.change_notification(&after, &after), None);
    }

    #[test]
    fn never_display_is_silent() {
        let manager = CapabilitiesManager::new(CapabilitiesChangeNotificationMode::NeverDisplay);
        assert_eq!(
            manager.change_notification(&set(&[CapabilityKind::TurnVideoOn]), &set(&[])),
            None
        );
    }
}
