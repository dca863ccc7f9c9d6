//! backend/src/io/mappers/account_mapper.rs

use log::warn;
use serde_json::Value;
use shared::{fields, AccountRecord};

use super::MemberMapper;
use crate::domain::errors::DecodeError;
use crate::domain::models::Account;
use crate::storage::Document;

/// Mapper between the stored account document and the domain `Account`.
pub struct AccountMapper;

impl AccountMapper {
    /// Decode a stored document.
    ///
    /// Roster entries that cannot be decoded are skipped with a warning; a
    /// malformed `current_user` fails the whole decode. A `null`
    /// `current_user` is treated as absent.
    pub fn to_domain(account_id: &str, document: Document) -> Result<Account, DecodeError> {
        let record = AccountRecord::from_document(Value::Object(document))?;

        let mut members = Vec::new();
        for (index, entry) in record.users.unwrap_or_default().into_iter().enumerate() {
            match MemberMapper::from_value(entry) {
                Ok(member) => members.push(member),
                Err(e) => warn!(
                    "Skipping malformed member entry {} of account {}: {}",
                    index, account_id, e
                ),
            }
        }

        let current_member = match record.current_user {
            None | Some(Value::Null) => None,
            Some(value) => Some(MemberMapper::from_value(value)?),
        };

        Ok(Account {
            account_id: account_id.to_string(),
            members,
            current_member,
        })
    }

    /// Encode the roster and current member fields of an account
    pub fn to_document(account: &Account) -> Document {
        let mut document = Document::new();
        document.insert(
            fields::USERS.to_string(),
            Value::Array(account.members.iter().map(MemberMapper::to_value).collect()),
        );
        document.insert(
            fields::CURRENT_USER.to_string(),
            account
                .current_member
                .as_ref()
                .map(MemberMapper::to_value)
                .unwrap_or(Value::Null),
        );
        document
    }
}
