// Role-based pronoun lookup.
//
// Communities express pronouns through roles. The table is ordered: the first
// entry whose role the member holds wins, so title roles go first, then any
// second custom role, then he/she roles, then the neutral role. Members
// without any listed role get the neutral forms.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PronounError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Which grammatical form the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PronounCase {
    /// "they banned ..."
    Subject,
    /// "... banned them"
    Object,
    /// "... their reason"
    Possessive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronounForms {
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl PronounForms {
    pub fn new(subject: &str, object: &str, possessive: &str) -> Self {
        Self {
            subject: subject.to_string(),
            object: object.to_string(),
            possessive: possessive.to_string(),
        }
    }

    pub fn neutral() -> Self {
        Self::new("they", "them", "their")
    }

    pub fn get(&self, case: PronounCase) -> &str {
        match case {
            PronounCase::Subject => &self.subject,
            PronounCase::Object => &self.object,
            PronounCase::Possessive => &self.possessive,
        }
    }
}

/// One row of the priority table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronounRole {
    /// Free-form label shown when explaining which role matched.
    #[serde(default)]
    pub label: String,
    pub role_id: u64,
    #[serde(flatten)]
    pub forms: PronounForms,
}

/// Priority-ordered role table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronounTable {
    #[serde(default)]
    pub roles: Vec<PronounRole>,
}

/// Where the table comes from (a JSON file in production).
#[async_trait]
pub trait PronounTableStore: Send + Sync {
    async fn load(&self) -> Result<PronounTable, PronounError>;
}

impl PronounTable {
    #[cfg(test)]
    pub fn new(roles: Vec<PronounRole>) -> Self {
        Self { roles }
    }

    /// First table row held by the member, if any.
    pub fn matching_role(&self, member_roles: &[u64]) -> Option<&PronounRole> {
        self.roles
            .iter()
            .find(|entry| member_roles.contains(&entry.role_id))
    }

    /// Forms for a member holding `member_roles`.
    pub fn forms_for(&self, member_roles: &[u64]) -> PronounForms {
        self.matching_role(member_roles)
            .map(|entry| entry.forms.clone())
            .unwrap_or_else(PronounForms::neutral)
    }

    /// Single form for a member holding `member_roles`.
    pub fn resolve(&self, member_roles: &[u64], case: PronounCase) -> String {
        self.forms_for(member_roles).get(case).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: u64 = 9001;
    const SECOND_TITLE: u64 = 9002;
    const HE: u64 = 9003;
    const SHE: u64 = 9004;
    const THEY: u64 = 9005;

    fn table() -> PronounTable {
        PronounTable::new(vec![
            PronounRole {
                label: "Captain".into(),
                role_id: TITLE,
                forms: PronounForms::new("the captain", "the captain", "the captain's"),
            },
            PronounRole {
                label: "Chief".into(),
                role_id: SECOND_TITLE,
                forms: PronounForms::new("the chief", "the chief", "the chief's"),
            },
            PronounRole {
                label: "He/Him".into(),
                role_id: HE,
                forms: PronounForms::new("he", "him", "his"),
            },
            PronounRole {
                label: "She/Her".into(),
                role_id: SHE,
                forms: PronounForms::new("she", "her", "her"),
            },
            PronounRole {
                label: "They/Them".into(),
                role_id: THEY,
                forms: PronounForms::neutral(),
            },
        ])
    }

    #[test]
    fn test_binary_roles() {
        let t = table();
        assert_eq!(t.resolve(&[HE], PronounCase::Subject), "he");
        assert_eq!(t.resolve(&[HE], PronounCase::Possessive), "his");
        assert_eq!(t.resolve(&[HE], PronounCase::Object), "him");
        assert_eq!(t.resolve(&[SHE], PronounCase::Object), "her");
    }

    #[test]
    fn test_first_matching_role_wins() {
        let t = table();
        // Role order on the member doesn't matter, table order does.
        assert_eq!(
            t.resolve(&[HE, SECOND_TITLE, TITLE], PronounCase::Subject),
            "the captain"
        );
        assert_eq!(
            t.resolve(&[SHE, SECOND_TITLE], PronounCase::Possessive),
            "the chief's"
        );
        assert_eq!(t.resolve(&[THEY, SHE], PronounCase::Subject), "she");
    }

    #[test]
    fn test_matching_role_reports_label() {
        let t = table();
        let matched = t.matching_role(&[SHE, SECOND_TITLE]).unwrap();
        assert_eq!(matched.label, "Chief");
        assert!(t.matching_role(&[1, 2]).is_none());
    }

    #[test]
    fn test_unlisted_member_defaults_to_neutral() {
        let t = table();
        assert_eq!(t.forms_for(&[1, 2, 3]), PronounForms::neutral());
        assert_eq!(PronounTable::default().resolve(&[HE], PronounCase::Object), "them");
    }

    #[test]
    fn test_table_deserializes_flat_rows() {
        let json = r#"{
            "roles": [
                { "label": "He/Him", "role_id": 9003,
                  "subject": "he", "object": "him", "possessive": "his" }
            ]
        }"#;
        let t: PronounTable = serde_json::from_str(json).unwrap();
        assert_eq!(t.roles.len(), 1);
        assert_eq!(t.resolve(&[HE], PronounCase::Possessive), "his");
    }
}
