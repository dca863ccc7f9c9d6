use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::goal::GoalProgress;
use super::patch::MemberPatch;
use super::pin::Pin;

/// Decoded profile picture bytes.
///
/// Session-only: derived from `profile_image_url` and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileImage(Arc<[u8]>);

impl ProfileImage {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ProfileImage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl fmt::Debug for ProfileImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProfileImage({} bytes)", self.0.len())
    }
}

/// One profile (parent or child) within an account.
///
/// `user_name` is the lookup key inside the account's roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub is_parent: bool,
    pub user_name: String,
    /// Free-text description of the recurring goal
    pub challenge_task: String,
    /// Points per completed task
    pub challenge_point: u32,
    /// Points per bonus action
    pub bonus_point: u32,
    /// Cumulative threshold that unlocks the reward
    pub goal_point: u32,
    /// Challenge window in days, display only
    pub challenge_day: u32,
    /// Where the physical reward is hidden, gated by `pin`
    pub hidden_place: String,
    pub pin: Option<Pin>,
    pub current_point: u32,
    pub profile_image_url: Option<String>,
    pub profile_image: Option<ProfileImage>,
    /// Marked calendar days as epoch seconds
    pub selected_dates: BTreeSet<i64>,
}

impl Member {
    /// A freshly registered member: zero points, empty text, parent flag set
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            is_parent: true,
            user_name: user_name.into(),
            challenge_task: String::new(),
            challenge_point: 0,
            bonus_point: 0,
            goal_point: 0,
            challenge_day: 0,
            hidden_place: String::new(),
            pin: None,
            current_point: 0,
            profile_image_url: None,
            profile_image: None,
            selected_dates: BTreeSet::new(),
        }
    }

    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    pub fn goal_progress(&self) -> GoalProgress {
        GoalProgress::new(self.current_point, self.goal_point)
    }

    pub fn is_goal_reached(&self) -> bool {
        self.goal_progress().reached
    }

    /// Merge the fields present in `patch`; absent fields stay untouched
    pub fn apply(&mut self, patch: &MemberPatch) {
        if let Some(is_parent) = patch.is_parent {
            self.is_parent = is_parent;
        }
        if let Some(user_name) = &patch.user_name {
            self.user_name = user_name.clone();
        }
        if let Some(challenge_task) = &patch.challenge_task {
            self.challenge_task = challenge_task.clone();
        }
        if let Some(challenge_point) = patch.challenge_point {
            self.challenge_point = challenge_point;
        }
        if let Some(bonus_point) = patch.bonus_point {
            self.bonus_point = bonus_point;
        }
        if let Some(goal_point) = patch.goal_point {
            self.goal_point = goal_point;
        }
        if let Some(challenge_day) = patch.challenge_day {
            self.challenge_day = challenge_day;
        }
        if let Some(hidden_place) = &patch.hidden_place {
            self.hidden_place = hidden_place.clone();
        }
        if let Some(pin) = patch.pin {
            self.pin = Some(pin);
        }
        if let Some(current_point) = patch.current_point {
            self.current_point = current_point;
        }
        if let Some(url) = &patch.profile_image_url {
            self.profile_image_url = Some(url.clone());
        }
        if let Some(selected_dates) = &patch.selected_dates {
            self.selected_dates = selected_dates.clone();
        }
    }
}
