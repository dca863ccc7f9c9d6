//! Screen-facing member operations.
//!
//! ## Key Responsibilities
//!
//! - Refreshing the session cache from the account document on screen entry
//! - Registering, selecting and deleting members
//! - Point accrual with goal detection
//! - Settings edits, calendar marks and profile pictures
//!
//! Point accrual and calendar marks are applied to the session cache first
//! and then written remotely; when the write fails the cached change stays
//! until the next refresh and the error is returned. Every other operation
//! writes remotely first and mirrors into the cache on success.

use chrono::NaiveDate;
use log::{debug, info, warn};

use super::calendar;
use super::errors::{SyncError, ValidationError};
use super::models::{Member, MemberPatch, PointAccrual, ProfileImage};
use super::profile_image_service::ProfileImageService;
use super::session_cache::SessionCache;
use super::sync_service::SyncService;

pub const MAX_USER_NAME_LEN: usize = 50;

/// Where the app should go after a refresh
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Ready(Member),
    /// Members exist but none is selected on this account
    NeedsMemberSelection,
    NeedsRegistration,
}

/// Settings screen input; every field must be filled in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub user_name: Option<String>,
    pub challenge_task: Option<String>,
    pub challenge_point: Option<u32>,
    pub bonus_point: Option<u32>,
    pub goal_point: Option<u32>,
    pub challenge_day: Option<u32>,
}

impl SettingsForm {
    pub fn into_patch(self) -> Result<MemberPatch, ValidationError> {
        let user_name = validate_user_name(
            self.user_name
                .as_deref()
                .ok_or(ValidationError::MissingSetting("user_name"))?,
        )?;
        let challenge_task = self
            .challenge_task
            .map(|task| task.trim().to_string())
            .filter(|task| !task.is_empty())
            .ok_or(ValidationError::MissingSetting("challenge_task"))?;

        Ok(MemberPatch {
            user_name: Some(user_name),
            challenge_task: Some(challenge_task),
            challenge_point: Some(
                self.challenge_point
                    .ok_or(ValidationError::MissingSetting("challenge_point"))?,
            ),
            bonus_point: Some(self.bonus_point.ok_or(ValidationError::MissingSetting("bonus_point"))?),
            goal_point: Some(self.goal_point.ok_or(ValidationError::MissingSetting("goal_point"))?),
            challenge_day: Some(
                self.challenge_day
                    .ok_or(ValidationError::MissingSetting("challenge_day"))?,
            ),
            ..Default::default()
        })
    }
}

/// Trimmed user name, rejected when empty, too long or containing a path
/// separator (the name is part of the picture's blob path)
pub fn validate_user_name(user_name: &str) -> Result<String, ValidationError> {
    let trimmed = user_name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUserName);
    }
    if trimmed.contains(['/', '\\']) {
        return Err(ValidationError::UserNameHasPathSeparator);
    }
    let len = trimmed.chars().count();
    if len > MAX_USER_NAME_LEN {
        return Err(ValidationError::UserNameTooLong {
            len,
            max: MAX_USER_NAME_LEN,
        });
    }
    Ok(trimmed.to_string())
}

#[derive(Clone)]
pub struct MemberService {
    cache: SessionCache,
    sync: SyncService,
    images: ProfileImageService,
}

impl MemberService {
    pub fn new(cache: SessionCache, sync: SyncService, images: ProfileImageService) -> Self {
        Self { cache, sync, images }
    }

    pub fn sign_in(&self, account_id: &str) {
        info!("Signing in account {}", account_id);
        self.cache.set_account_id(account_id);
    }

    /// Reload the roster and current member from the account document
    pub async fn refresh(&self) -> Result<RefreshOutcome, SyncError> {
        let account_id = self.cache.require_account_id()?;
        info!("Refreshing session for account {}", account_id);

        let account = match self.sync.fetch_account(&account_id).await {
            Ok(account) => account,
            Err(SyncError::NotFound { .. }) => {
                info!("No data for account {} yet, registration needed", account_id);
                self.cache.set_members(Vec::new());
                self.cache.clear_current_member();
                return Ok(RefreshOutcome::NeedsRegistration);
            }
            Err(e) => return Err(e),
        };

        let previous = self.cache.members();
        let keep_image = |member: &mut Member| {
            if let Some(cached) = previous.iter().find(|p| p.user_name == member.user_name) {
                if cached.profile_image_url == member.profile_image_url {
                    member.profile_image = cached.profile_image.clone();
                }
            }
        };

        let mut members = account.members;
        members.iter_mut().for_each(&keep_image);
        let has_members = !members.is_empty();
        self.cache.set_members(members);

        match account.current_member {
            Some(mut current) => {
                keep_image(&mut current);
                self.cache.select_current_member(current.clone());
                Ok(RefreshOutcome::Ready(current))
            }
            None => {
                self.cache.clear_current_member();
                if has_members {
                    Ok(RefreshOutcome::NeedsMemberSelection)
                } else {
                    Ok(RefreshOutcome::NeedsRegistration)
                }
            }
        }
    }

    /// Register a new member, optionally with a profile picture in any
    /// supported format; it is stored as JPEG
    pub async fn register_member(
        &self,
        user_name: &str,
        profile_image: Option<Vec<u8>>,
    ) -> Result<Member, SyncError> {
        let account_id = self.cache.require_account_id()?;
        let user_name = validate_user_name(user_name)?;
        info!("Registering member '{}' in account {}", user_name, account_id);

        if self.cache.member(&user_name).is_some() {
            return Err(SyncError::DuplicateMember { user_name });
        }

        let mut member = Member::new(user_name);
        if let Some(picture) = profile_image {
            let jpeg = self.images.encode_bytes(&picture)?;
            let url = self.images.upload(&member.user_name, jpeg.clone()).await?;
            member.profile_image_url = Some(url);
            member.profile_image = Some(ProfileImage::from(jpeg));
        }

        self.sync.append_member(&account_id, &member).await?;
        self.cache.add_member(member.clone());

        info!("Registered member '{}'", member.user_name);
        Ok(member)
    }

    /// Make a roster member the current member, locally and remotely
    pub async fn select_member(&self, user_name: &str) -> Result<Member, SyncError> {
        let account_id = self.cache.require_account_id()?;
        info!("Selecting member '{}'", user_name);

        let member = self
            .cache
            .member(user_name)
            .ok_or_else(|| SyncError::member_not_found(user_name))?;

        self.sync.set_current_member(&account_id, &member).await?;
        self.cache.select_current_member(member.clone());
        Ok(member)
    }

    pub async fn delete_member(&self, user_name: &str) -> Result<(), SyncError> {
        let account_id = self.cache.require_account_id()?;
        info!("Deleting member '{}'", user_name);

        let cleared_current = self.sync.remove_member(&account_id, user_name).await?;
        self.cache.remove_member(user_name);

        if cleared_current {
            info!("Deleted member '{}' was current, selection cleared", user_name);
        }
        Ok(())
    }

    /// Add the current member's challenge points to their total
    pub async fn add_challenge_points(&self) -> Result<PointAccrual, SyncError> {
        self.accrue("challenge", |member| member.challenge_point).await
    }

    /// Add the current member's bonus points to their total
    pub async fn add_bonus_points(&self) -> Result<PointAccrual, SyncError> {
        self.accrue("bonus", |member| member.bonus_point).await
    }

    async fn accrue(
        &self,
        kind: &str,
        points_of: impl Fn(&Member) -> u32,
    ) -> Result<PointAccrual, SyncError> {
        let account_id = self.cache.require_account_id()?;
        let current = self.cache.require_current_member()?;
        let points = points_of(&current);
        info!("Adding {} {} points to '{}'", points, kind, current.user_name);

        let total = current.current_point.saturating_add(points);
        let accrual = PointAccrual::new(current.current_point, total, current.goal_point);

        self.cache.update_current_point(total);
        self.sync
            .dual_update(&account_id, &current.user_name, &MemberPatch::current_point(total))
            .await?;

        if accrual.just_reached {
            info!("'{}' reached the goal of {} points", current.user_name, current.goal_point);
        }
        Ok(accrual)
    }

    /// Save the settings form for the current member
    pub async fn save_settings(&self, form: SettingsForm) -> Result<Member, SyncError> {
        let account_id = self.cache.require_account_id()?;
        let current = self.cache.require_current_member()?;
        info!("Saving settings for '{}'", current.user_name);

        let mut patch = form.into_patch()?;
        let renamed_to = patch
            .user_name
            .clone()
            .filter(|new_name| *new_name != current.user_name);
        if let Some(new_name) = renamed_to {
            if self.cache.member(&new_name).is_some() {
                return Err(SyncError::DuplicateMember { user_name: new_name });
            }
            // Pictures are stored under the member's name
            if current.profile_image_url.is_some() {
                if let Some(url) = self.images.copy(&current.user_name, &new_name).await? {
                    patch.profile_image_url = Some(url);
                }
            }
        }

        self.sync
            .dual_update(&account_id, &current.user_name, &patch)
            .await?;
        self.cache.update_current_member(&patch);

        self.cache.require_current_member()
    }

    /// Re-encode a new picture as JPEG, upload it for the current member
    /// and record its URL
    pub async fn set_profile_image(&self, picture: Vec<u8>) -> Result<String, SyncError> {
        let account_id = self.cache.require_account_id()?;
        let current = self.cache.require_current_member()?;
        info!("Setting profile image of current member '{}'", current.user_name);

        let jpeg = self.images.encode_bytes(&picture)?;
        let url = self.images.upload(&current.user_name, jpeg.clone()).await?;
        let patch = MemberPatch::profile_image_url(url.clone());
        self.sync
            .dual_update(&account_id, &current.user_name, &patch)
            .await?;

        self.cache.update_current_member(&patch);
        self.cache.update_profile_image(ProfileImage::from(jpeg));
        Ok(url)
    }

    /// Upload a picture for any roster member. The current member goes
    /// through the dual update, others through a roster-only write.
    pub async fn set_member_profile_image(
        &self,
        user_name: &str,
        picture: Vec<u8>,
    ) -> Result<String, SyncError> {
        let is_current = self
            .cache
            .current_member()
            .is_some_and(|current| current.user_name == user_name);
        if is_current {
            return self.set_profile_image(picture).await;
        }

        let account_id = self.cache.require_account_id()?;
        info!("Setting profile image of member '{}'", user_name);
        if self.cache.member(user_name).is_none() {
            return Err(SyncError::member_not_found(user_name));
        }

        let jpeg = self.images.encode_bytes(&picture)?;
        let url = self.images.upload(user_name, jpeg.clone()).await?;
        let patch = MemberPatch::profile_image_url(url.clone());
        self.sync
            .update_roster_member(&account_id, user_name, &patch)
            .await?;

        self.cache.update_member(user_name, &patch);
        self.cache.update_profile_image_for(user_name, ProfileImage::from(jpeg));
        Ok(url)
    }

    /// Download pictures for every roster member that has none cached.
    ///
    /// Returns how many pictures were loaded. A failed download skips that
    /// member only; the first such error is returned once the rest loaded.
    pub async fn load_profile_images(&self) -> Result<usize, SyncError> {
        let members = self.cache.members();
        info!("Loading profile images for {} members", members.len());

        let current_name = self.cache.current_member().map(|m| m.user_name);
        let mut loaded = 0;
        let mut first_error = None;

        for member in members.iter().filter(|m| m.profile_image.is_none()) {
            let image = match self.images.download(&member.user_name).await {
                Ok(Some(image)) => image,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping profile image of '{}': {}", member.user_name, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                    continue;
                }
            };
            self.cache.update_profile_image_for(&member.user_name, image.clone());
            if current_name.as_deref() == Some(member.user_name.as_str()) {
                self.cache.update_profile_image(image);
            }
            loaded += 1;
        }

        debug!("Loaded {} profile images", loaded);
        match first_error {
            Some(e) => Err(e),
            None => Ok(loaded),
        }
    }

    /// Mark or unmark a calendar day for the current member.
    ///
    /// Returns whether the day is marked afterwards.
    pub async fn toggle_selected_date(&self, date: NaiveDate) -> Result<bool, SyncError> {
        let account_id = self.cache.require_account_id()?;
        let current = self.cache.require_current_member()?;
        info!("Toggling {} for '{}'", date, current.user_name);

        let mut selected_dates = current.selected_dates.clone();
        let marked = calendar::toggle_date(&mut selected_dates, date);

        self.cache
            .update_selected_dates(&current.user_name, selected_dates.clone());
        self.sync
            .dual_update(
                &account_id,
                &current.user_name,
                &MemberPatch::selected_dates(selected_dates),
            )
            .await?;
        Ok(marked)
    }

    pub fn logout(&self) {
        match self.cache.account_id() {
            Some(account_id) => info!("Logging out account {}", account_id),
            None => warn!("Logout without a signed-in account"),
        }
        self.cache.clear();
    }
}
