//! Salesforce entity types known to the translator.

use serde::{Deserialize, Serialize};

/// Closed set of standard objects the translator can name in a fallback query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Account,
    Contact,
    Lead,
    Opportunity,
    Case,
    Task,
    Event,
    User,
    Campaign,
}

impl EntityType {
    pub const ALL: [EntityType; 9] = [
        EntityType::Account,
        EntityType::Contact,
        EntityType::Lead,
        EntityType::Opportunity,
        EntityType::Case,
        EntityType::Task,
        EntityType::Event,
        EntityType::User,
        EntityType::Campaign,
    ];

    /// API name with canonical capitalization (e.g. `Opportunity`)
    pub fn api_name(&self) -> &'static str {
        match self {
            EntityType::Account => "Account",
            EntityType::Contact => "Contact",
            EntityType::Lead => "Lead",
            EntityType::Opportunity => "Opportunity",
            EntityType::Case => "Case",
            EntityType::Task => "Task",
            EntityType::Event => "Event",
            EntityType::User => "User",
            EntityType::Campaign => "Campaign",
        }
    }

    /// Lowercase plural keyword (e.g. `opportunities`)
    pub fn plural(&self) -> &'static str {
        match self {
            EntityType::Account => "accounts",
            EntityType::Contact => "contacts",
            EntityType::Lead => "leads",
            EntityType::Opportunity => "opportunities",
            EntityType::Case => "cases",
            EntityType::Task => "tasks",
            EntityType::Event => "events",
            EntityType::User => "users",
            EntityType::Campaign => "campaigns",
        }
    }

    /// Fields that identify a record of this type in a minimal listing.
    pub fn identifying_fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Account => &["Id", "Name"],
            EntityType::Contact => &["Id", "Name", "Email"],
            EntityType::Lead => &["Id", "Name", "Company"],
            EntityType::Opportunity => &["Id", "Name", "StageName"],
            EntityType::Case => &["Id", "CaseNumber", "Subject"],
            EntityType::Task | EntityType::Event => &["Id", "Subject"],
            EntityType::User => &["Id", "Name", "Email"],
            EntityType::Campaign => &["Id", "Name", "Status"],
        }
    }

    /// Match a single word against the singular or plural keyword, ignoring case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entity| {
            word.eq_ignore_ascii_case(entity.api_name()) || word.eq_ignore_ascii_case(entity.plural())
        })
    }

    /// Find the first entity keyword that appears as a whole word in `input`.
    pub fn find_in(input: &str) -> Option<Self> {
        input
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
            .find_map(Self::from_keyword)
    }

    /// Minimal bounded listing query for this entity type.
    pub fn listing_query(&self, limit: usize) -> String {
        format!(
            "SELECT {} FROM {} LIMIT {}",
            self.identifying_fields().join(", "),
            self.api_name(),
            limit
        )
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}
