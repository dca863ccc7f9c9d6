//! backend/src/io/mappers/member_mapper.rs

use log::warn;
use serde_json::Value;
use shared::{fields, MemberRecord};

use crate::domain::errors::DecodeError;
use crate::domain::models::{Member, MemberPatch, Pin};
use crate::storage::Document;

/// Mapper between wire `MemberRecord`s and domain `Member`s.
pub struct MemberMapper;

impl MemberMapper {
    /// Converts a wire record to a domain member, applying defaults:
    /// numbers decode to `0`, text to `""`, and an absent PIN stays absent.
    pub fn to_domain(record: MemberRecord) -> Result<Member, DecodeError> {
        let user_name = record
            .user_name
            .ok_or(DecodeError::MissingField(fields::USER_NAME))?;

        let pin = record.pin.and_then(|value| match Pin::try_from(value) {
            Ok(pin) => Some(pin),
            Err(e) => {
                warn!("Ignoring stored PIN for '{}': {}", user_name, e);
                None
            }
        });

        Ok(Member {
            is_parent: record.is_parent.unwrap_or(true),
            challenge_task: record.challenge_task.unwrap_or_default(),
            challenge_point: points(&user_name, fields::CHALLENGE_POINT, record.challenge_point),
            bonus_point: points(&user_name, fields::BONUS_POINT, record.bonus_point),
            goal_point: points(&user_name, fields::GOAL_POINT, record.goal_point),
            challenge_day: points(&user_name, fields::CHALLENGE_DAY, record.challenge_day),
            hidden_place: record.hidden_place.unwrap_or_default(),
            pin,
            current_point: points(&user_name, fields::CURRENT_POINT, record.current_point),
            profile_image_url: record.profile_image_url.filter(|url| !url.is_empty()),
            profile_image: None,
            selected_dates: record.selected_dates.unwrap_or_default().into_iter().collect(),
            user_name,
        })
    }

    /// Decodes one raw member entry
    pub fn from_value(value: Value) -> Result<Member, DecodeError> {
        if !value.is_object() {
            return Err(DecodeError::NotAnObject);
        }
        let record = MemberRecord::from_value(value)?;
        Self::to_domain(record)
    }

    /// Converts a domain member to its wire record
    pub fn to_dto(member: &Member) -> MemberRecord {
        MemberRecord {
            is_parent: Some(member.is_parent),
            user_name: Some(member.user_name.clone()),
            challenge_task: Some(member.challenge_task.clone()),
            challenge_point: Some(i64::from(member.challenge_point)),
            bonus_point: Some(i64::from(member.bonus_point)),
            goal_point: Some(i64::from(member.goal_point)),
            challenge_day: Some(i64::from(member.challenge_day)),
            hidden_place: Some(member.hidden_place.clone()),
            pin: member.pin.map(|pin| i64::from(pin.value())),
            current_point: Some(i64::from(member.current_point)),
            profile_image_url: member.profile_image_url.clone(),
            selected_dates: Some(member.selected_dates.iter().copied().collect()),
        }
    }

    pub fn to_value(member: &Member) -> Value {
        Self::to_dto(member).to_value()
    }

    /// Wire fields carried by a patch; absent patch fields are not emitted
    pub fn patch_fields(patch: &MemberPatch) -> Document {
        let record = MemberRecord {
            is_parent: patch.is_parent,
            user_name: patch.user_name.clone(),
            challenge_task: patch.challenge_task.clone(),
            challenge_point: patch.challenge_point.map(i64::from),
            bonus_point: patch.bonus_point.map(i64::from),
            goal_point: patch.goal_point.map(i64::from),
            challenge_day: patch.challenge_day.map(i64::from),
            hidden_place: patch.hidden_place.clone(),
            pin: patch.pin.map(|pin| i64::from(pin.value())),
            current_point: patch.current_point.map(i64::from),
            profile_image_url: patch.profile_image_url.clone(),
            selected_dates: patch
                .selected_dates
                .as_ref()
                .map(|dates| dates.iter().copied().collect()),
        };

        match record.to_value() {
            Value::Object(fields) => fields,
            _ => Document::new(),
        }
    }
}

fn points(user_name: &str, field: &str, value: Option<i64>) -> u32 {
    match value {
        None => 0,
        Some(value) => u32::try_from(value).unwrap_or_else(|_| {
            warn!("Clamping out-of-range {} ({}) for '{}'", field, value, user_name);
            if value < 0 {
                0
            } else {
                u32::MAX
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[test]
    fn test_absent_fields_get_defaults() {
        let member = MemberMapper::from_value(json!({ "user_name": "Aki" })).unwrap();

        assert_eq!(member.user_name, "Aki");
        assert!(member.is_parent);
        assert_eq!(member.challenge_task, "");
        assert_eq!(member.current_point, 0);
        assert_eq!(member.goal_point, 0);
        assert!(member.pin.is_none());
        assert!(member.profile_image_url.is_none());
    }

    #[test]
    fn test_missing_user_name_is_a_decode_error() {
        let result = MemberMapper::from_value(json!({ "current_point": 3 }));
        assert!(matches!(result, Err(DecodeError::MissingField("user_name"))));
    }

    #[test]
    fn test_non_object_is_a_decode_error() {
        assert!(matches!(
            MemberMapper::from_value(json!("Aki")),
            Err(DecodeError::NotAnObject)
        ));
    }

    #[test]
    fn test_pin_distinctness_survives_round_trip() {
        let mut unset = Member::new("Aki");
        unset.pin = None;
        let mut zero = Member::new("Mio");
        zero.pin = Some(Pin::new(0).unwrap());

        let unset_back = MemberMapper::from_value(MemberMapper::to_value(&unset)).unwrap();
        let zero_back = MemberMapper::from_value(MemberMapper::to_value(&zero)).unwrap();

        assert_eq!(unset_back.pin, None);
        assert_eq!(zero_back.pin, Some(Pin::new(0).unwrap()));
    }

    #[test]
    fn test_out_of_range_values_are_sanitized() {
        let member = MemberMapper::from_value(json!({
            "user_name": "Aki",
            "current_point": -5,
            "pin": 123456,
            "profile_image_url": ""
        }))
        .unwrap();

        assert_eq!(member.current_point, 0);
        assert!(member.pin.is_none());
        assert!(member.profile_image_url.is_none());
    }

    #[test]
    fn test_full_member_round_trip() {
        let mut member = Member::new("Aki");
        member.is_parent = false;
        member.challenge_task = "Practice violin".to_string();
        member.challenge_point = 5;
        member.bonus_point = 3;
        member.goal_point = 30;
        member.challenge_day = 20;
        member.hidden_place = "closet".to_string();
        member.pin = Some(Pin::parse("0042").unwrap());
        member.current_point = 12;
        member.profile_image_url = Some("memory://profile_images/Aki.jpg".to_string());
        member.selected_dates = BTreeSet::from([1_700_000_000, 1_700_086_400]);

        let value = MemberMapper::to_value(&member);
        assert_eq!(value["pin"], json!(42));
        assert_eq!(value["selected_dates"], json!([1_700_000_000, 1_700_086_400]));

        assert_eq!(MemberMapper::from_value(value).unwrap(), member);
    }

    #[test]
    fn test_patch_fields_only_carry_present_values() {
        let patch = MemberPatch {
            current_point: Some(15),
            pin: Some(Pin::new(7).unwrap()),
            ..Default::default()
        };

        let fields = MemberMapper::patch_fields(&patch);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["current_point"], json!(15));
        assert_eq!(fields["pin"], json!(7));
        assert!(MemberMapper::patch_fields(&MemberPatch::default()).is_empty());
    }
}
