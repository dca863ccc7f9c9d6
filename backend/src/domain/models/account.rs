use super::member::Member;

/// One account's persisted state: the roster plus the active member
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub account_id: String,
    pub members: Vec<Member>,
    pub current_member: Option<Member>,
}

impl Account {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            members: Vec::new(),
            current_member: None,
        }
    }

    /// True when the current member, if any, has exactly one roster entry
    /// with the same name and identical persisted fields
    pub fn is_consistent(&self) -> bool {
        let Some(current) = &self.current_member else {
            return true;
        };

        let mut matches = self
            .members
            .iter()
            .filter(|member| member.user_name == current.user_name);

        match (matches.next(), matches.next()) {
            (Some(entry), None) => {
                let mut entry = entry.clone();
                entry.profile_image = current.profile_image.clone();
                entry == *current
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_requires_single_matching_entry() {
        let aki = Member::new("Aki");
        let mut account = Account::new("acc");
        assert!(account.is_consistent());

        account.current_member = Some(aki.clone());
        assert!(!account.is_consistent());

        account.members.push(aki.clone());
        assert!(account.is_consistent());

        account.members.push(aki);
        assert!(!account.is_consistent());
    }

    #[test]
    fn test_consistency_detects_diverged_fields() {
        let mut aki = Member::new("Aki");
        let mut account = Account::new("acc");
        account.members.push(aki.clone());

        aki.current_point = 5;
        account.current_member = Some(aki);

        assert!(!account.is_consistent());
    }
}
