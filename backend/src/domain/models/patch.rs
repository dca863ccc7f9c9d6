use std::collections::BTreeSet;

use super::pin::Pin;

/// Sparse update of a [`Member`](super::Member).
///
/// Every `None` field is left untouched wherever the patch is applied, both in
/// the session cache and in the remote document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberPatch {
    pub is_parent: Option<bool>,
    pub user_name: Option<String>,
    pub challenge_task: Option<String>,
    pub challenge_point: Option<u32>,
    pub bonus_point: Option<u32>,
    pub goal_point: Option<u32>,
    pub challenge_day: Option<u32>,
    pub hidden_place: Option<String>,
    pub pin: Option<Pin>,
    pub current_point: Option<u32>,
    pub profile_image_url: Option<String>,
    pub selected_dates: Option<BTreeSet<i64>>,
}

impl MemberPatch {
    pub fn current_point(points: u32) -> Self {
        Self {
            current_point: Some(points),
            ..Default::default()
        }
    }

    pub fn bonus_point(points: u32) -> Self {
        Self {
            bonus_point: Some(points),
            ..Default::default()
        }
    }

    pub fn profile_image_url(url: impl Into<String>) -> Self {
        Self {
            profile_image_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn selected_dates(dates: BTreeSet<i64>) -> Self {
        Self {
            selected_dates: Some(dates),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
