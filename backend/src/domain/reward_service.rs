//! PIN-gated disclosure of where the reward is hidden.
//!
//! A member without a PIN first registers a hiding place together with a
//! 4-digit PIN. Afterwards the place is only disclosed against that PIN, and
//! only shown at all once the member's goal is reached. Neither the PIN nor
//! the place ever reaches the log.

use log::{info, warn};

use super::errors::{SyncError, ValidationError};
use super::models::{Member, MemberPatch, Pin};
use super::session_cache::SessionCache;
use super::sync_service::SyncService;

/// Which form the reward dialog presents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    RegisterHiddenPlaceAndPin,
    PinOnly,
}

/// Outcome of a disclosure attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disclosure {
    Revealed(String),
    NoPinRegistered,
    WrongPin,
}

#[derive(Clone)]
pub struct RewardService {
    cache: SessionCache,
    sync: SyncService,
}

impl RewardService {
    pub fn new(cache: SessionCache, sync: SyncService) -> Self {
        Self { cache, sync }
    }

    pub fn dialog_mode(member: &Member) -> DialogMode {
        if member.has_pin() {
            DialogMode::PinOnly
        } else {
            DialogMode::RegisterHiddenPlaceAndPin
        }
    }

    /// The hiding place is shown only once the goal is reached
    pub fn hidden_place_visible(member: &Member) -> bool {
        member.is_goal_reached()
    }

    pub fn current_dialog_mode(&self) -> Result<DialogMode, SyncError> {
        Ok(Self::dialog_mode(&self.cache.require_current_member()?))
    }

    /// Register the hiding place and PIN of the current member.
    ///
    /// Once a PIN is registered, replacing either takes `current_pin`
    /// matching it; nothing is written otherwise.
    pub async fn register_reward(
        &self,
        hidden_place: &str,
        pin_text: &str,
        current_pin: Option<&str>,
    ) -> Result<Pin, SyncError> {
        let account_id = self.cache.require_account_id()?;
        let current = self.cache.require_current_member()?;
        info!("Registering reward for '{}'", current.user_name);

        if let Some(registered) = current.pin {
            if !current_pin.is_some_and(|entered| registered.matches(entered)) {
                warn!("Reward change for '{}' refused: wrong current PIN", current.user_name);
                return Err(ValidationError::CurrentPinMismatch.into());
            }
        }

        let hidden_place = hidden_place.trim();
        if hidden_place.is_empty() {
            return Err(ValidationError::EmptyHiddenPlace.into());
        }
        let pin = Pin::parse(pin_text)?;

        let patch = MemberPatch {
            hidden_place: Some(hidden_place.to_string()),
            pin: Some(pin),
            ..Default::default()
        };
        self.sync
            .dual_update(&account_id, &current.user_name, &patch)
            .await?;
        self.cache.update_current_member(&patch);

        Ok(pin)
    }

    /// Check `entered` against the current member's PIN
    pub fn reveal_hidden_place(&self, entered: &str) -> Result<Disclosure, SyncError> {
        let current = self.cache.require_current_member()?;

        let disclosure = match current.pin {
            None => Disclosure::NoPinRegistered,
            Some(pin) if pin.matches(entered) => Disclosure::Revealed(current.hidden_place),
            Some(_) => Disclosure::WrongPin,
        };

        match &disclosure {
            Disclosure::Revealed(_) => info!("Hidden place disclosed to '{}'", current.user_name),
            Disclosure::NoPinRegistered => warn!("'{}' has no PIN registered", current.user_name),
            Disclosure::WrongPin => warn!("Wrong PIN entered for '{}'", current.user_name),
        }
        Ok(disclosure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PinError;
    use crate::storage::test_utils::{member, seed_account};
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn service_with_current(current: Member) -> (MemoryStore, SessionCache, RewardService) {
        let store = MemoryStore::new();
        seed_account(&store, "acc", vec![current.clone()], Some(current.clone()));

        let cache = SessionCache::new();
        cache.set_account_id("acc");
        cache.set_members(vec![current.clone()]);
        cache.select_current_member(current);

        let sync = SyncService::new(Arc::new(store.clone()), shared::USERS_COLLECTION);
        let service = RewardService::new(cache.clone(), sync);
        (store, cache, service)
    }

    #[test]
    fn test_dialog_mode_depends_on_pin() {
        let mut aki = Member::new("Aki");
        assert_eq!(RewardService::dialog_mode(&aki), DialogMode::RegisterHiddenPlaceAndPin);

        aki.pin = Some(Pin::new(0).unwrap());
        assert_eq!(RewardService::dialog_mode(&aki), DialogMode::PinOnly);
    }

    #[test]
    fn test_hidden_place_visible_only_at_goal() {
        let mut aki = member("Aki", 29, 1);
        aki.goal_point = 30;
        assert!(!RewardService::hidden_place_visible(&aki));

        aki.current_point = 30;
        assert!(RewardService::hidden_place_visible(&aki));
    }

    #[tokio::test]
    async fn test_register_then_reveal_with_leading_zeros() {
        let (store, cache, service) = service_with_current(member("Aki", 0, 1));

        let pin = service.register_reward("  top shelf ", "0042", None).await.unwrap();

        assert_eq!(pin.value(), 42);
        let document = store.document(shared::USERS_COLLECTION, "acc").unwrap();
        assert_eq!(document["current_user"]["pin"], json!(42));
        assert_eq!(document["users"][0]["hidden_place"], json!("top shelf"));
        assert_eq!(cache.member("Aki").unwrap().pin, Some(pin));
        assert_eq!(service.current_dialog_mode().unwrap(), DialogMode::PinOnly);

        assert_eq!(
            service.reveal_hidden_place("0042").unwrap(),
            Disclosure::Revealed("top shelf".to_string())
        );
        assert_eq!(service.reveal_hidden_place("42").unwrap(), Disclosure::WrongPin);
        assert_eq!(service.reveal_hidden_place("0043").unwrap(), Disclosure::WrongPin);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input_without_writing() {
        let (store, _cache, service) = service_with_current(member("Aki", 0, 1));

        assert!(matches!(
            service.register_reward("   ", "1234", None).await,
            Err(SyncError::Validation(ValidationError::EmptyHiddenPlace))
        ));
        assert!(matches!(
            service.register_reward("closet", "12a4", None).await,
            Err(SyncError::Validation(ValidationError::InvalidPin(PinError::InvalidFormat)))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_changing_reward_requires_current_pin() {
        let mut aki = member("Aki", 0, 1);
        aki.pin = Some(Pin::parse("0042").unwrap());
        aki.hidden_place = "closet".to_string();
        let (store, cache, service) = service_with_current(aki);

        for current_pin in [None, Some("1111"), Some("42")] {
            assert!(matches!(
                service.register_reward("nowhere", "1111", current_pin).await,
                Err(SyncError::Validation(ValidationError::CurrentPinMismatch))
            ));
        }
        assert_eq!(store.write_count(), 0);
        assert_eq!(
            service.reveal_hidden_place("0042").unwrap(),
            Disclosure::Revealed("closet".to_string())
        );

        let pin = service
            .register_reward("garage", "1111", Some("0042"))
            .await
            .unwrap();

        assert_eq!(pin.value(), 1111);
        assert_eq!(cache.current_member().unwrap().hidden_place, "garage");
        let document = store.document(shared::USERS_COLLECTION, "acc").unwrap();
        assert_eq!(document["users"][0]["pin"], json!(1111));
        assert_eq!(service.reveal_hidden_place("0042").unwrap(), Disclosure::WrongPin);
        assert_eq!(
            service.reveal_hidden_place("1111").unwrap(),
            Disclosure::Revealed("garage".to_string())
        );
    }

    #[test]
    fn test_reveal_without_pin() {
        let (_store, _cache, service) = service_with_current(member("Aki", 0, 1));
        assert_eq!(service.reveal_hidden_place("0000").unwrap(), Disclosure::NoPinRegistered);
    }

    #[test]
    fn test_zero_pin_is_a_real_pin() {
        let mut aki = member("Aki", 0, 1);
        aki.pin = Some(Pin::new(0).unwrap());
        aki.hidden_place = "drawer".to_string();
        let (_store, _cache, service) = service_with_current(aki);

        assert_eq!(
            service.reveal_hidden_place("0000").unwrap(),
            Disclosure::Revealed("drawer".to_string())
        );
    }
}
