//! Ordered translation rules.
//!
//! A [`QueryRule`] is a plain data record: a case-insensitive pattern plus a
//! [`QueryTemplate`]. The rule table is a `Vec` evaluated front to back and
//! the first rule that produces a query wins, so specific rules must be
//! listed before the generic ones they overlap with (e.g. "accounts in
//! California" before "show all accounts").

use regex::{Captures, Regex, RegexBuilder};

use super::entity::EntityType;
use super::soql::{clean_phrase, quote_literal};
use crate::core::error::DomainError;

/// Builds a query from the captures of a matched pattern.
///
/// Returning `None` declines the match and lets the next rule try.
pub type BuildFn = fn(&Captures<'_>) -> Option<String>;

/// How a matched rule turns into a query.
#[derive(Clone, Copy)]
pub enum QueryTemplate {
    /// Fixed query text
    Literal(&'static str),
    /// Query assembled from capture groups
    Build(BuildFn),
}

impl std::fmt::Debug for QueryTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTemplate::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            QueryTemplate::Build(_) => f.write_str("Build(..)"),
        }
    }
}

/// A single (pattern, template) translation rule.
#[derive(Debug, Clone)]
pub struct QueryRule {
    name: &'static str,
    pattern: Regex,
    template: QueryTemplate,
}

impl QueryRule {
    /// Compile a rule. Patterns are always matched case-insensitively.
    pub fn new(
        name: &'static str,
        pattern: &str,
        template: QueryTemplate,
    ) -> Result<Self, DomainError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DomainError::InvalidRule {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name,
            pattern,
            template,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the rule to `input`, returning the query if the rule matches
    /// and its template accepts the captures.
    pub fn apply(&self, input: &str) -> Option<String> {
        let captures = self.pattern.captures(input)?;
        match self.template {
            QueryTemplate::Literal(text) => Some(text.to_string()),
            QueryTemplate::Build(build) => build(&captures),
        }
    }
}

fn accounts_in_region(caps: &Captures<'_>) -> Option<String> {
    let region = quote_literal(&clean_phrase(caps.get(1)?.as_str())?);
    Some(format!(
        "SELECT Id, Name, Industry, BillingCity, BillingState FROM Account \
         WHERE BillingState = {region} OR BillingCity = {region} ORDER BY Name LIMIT 50"
    ))
}

fn contacts_at_account(caps: &Captures<'_>) -> Option<String> {
    let account = quote_literal(&clean_phrase(caps.get(1)?.as_str())?);
    Some(format!(
        "SELECT Id, Name, Email, Phone, Title FROM Contact \
         WHERE Account.Name = {account} ORDER BY Name LIMIT 50"
    ))
}

fn opportunities_over_amount(caps: &Captures<'_>) -> Option<String> {
    let digits: String = caps.get(1)?.as_str().chars().filter(char::is_ascii_digit).collect();
    let base: u64 = digits.parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(unit) if unit == "k" || unit == "thousand" => 1_000,
        Some(unit) if unit == "m" || unit == "million" => 1_000_000,
        _ => 1,
    };
    let amount = base.checked_mul(multiplier)?;
    Some(format!(
        "SELECT Id, Name, Amount, StageName, CloseDate FROM Opportunity \
         WHERE Amount > {amount} ORDER BY Amount DESC LIMIT 50"
    ))
}

fn opportunities_closing_this(caps: &Captures<'_>) -> Option<String> {
    let literal = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "month" => "THIS_MONTH",
        "quarter" => "THIS_QUARTER",
        "year" => "THIS_YEAR",
        _ => return None,
    };
    Some(format!(
        "SELECT Id, Name, Amount, StageName, CloseDate FROM Opportunity \
         WHERE CloseDate = {literal} ORDER BY CloseDate ASC LIMIT 50"
    ))
}

fn leads_from_source(caps: &Captures<'_>) -> Option<String> {
    let source = quote_literal(&clean_phrase(caps.get(1)?.as_str())?);
    Some(format!(
        "SELECT Id, Name, Company, Status, LeadSource FROM Lead \
         WHERE LeadSource = {source} ORDER BY CreatedDate DESC LIMIT 50"
    ))
}

fn count_entity(caps: &Captures<'_>) -> Option<String> {
    let entity = EntityType::from_keyword(caps.get(1)?.as_str())?;
    Some(format!("SELECT COUNT() FROM {}", entity.api_name()))
}

const LISTING_VERBS: &str = r"\b(?:show|list|get|display|find)\s+(?:me\s+)?(?:all\s+)?(?:the\s+)?(?:my\s+)?";

/// The standard rule table, in priority order.
pub fn standard_rules() -> Result<Vec<QueryRule>, DomainError> {
    use QueryTemplate::{Build, Literal};

    let listing = |noun: &str| format!("{LISTING_VERBS}{noun}\\b");

    Ok(vec![
        QueryRule::new(
            "accounts_in_region",
            r"\b(?:accounts?|companies|customers)\s+(?:located\s+in|based\s+in|in)\s+(.+?)[\s?.!]*$",
            Build(accounts_in_region),
        )?,
        QueryRule::new(
            "contacts_at_account",
            r"\b(?:contacts?|people)\s+(?:at|from|for|with)\s+(.+?)[\s?.!]*$",
            Build(contacts_at_account),
        )?,
        QueryRule::new(
            "opportunities_over_amount",
            r"\b(?:opportunit(?:y|ies)|deals?)\s+(?:over|above|greater\s+than|more\s+than|worth\s+more\s+than)\s+\$?(\d[\d,]{0,14})(?:\s*(k|m|thousand|million))?\b",
            Build(opportunities_over_amount),
        )?,
        QueryRule::new(
            "opportunities_closing_this",
            r"\b(?:opportunit(?:y|ies)|deals?)\s+(?:closing|that\s+close|to\s+close)\s+this\s+(month|quarter|year)\b",
            Build(opportunities_closing_this),
        )?,
        QueryRule::new(
            "open_opportunities",
            r"\bopen\s+(?:opportunit(?:y|ies)|deals?)\b",
            Literal(
                "SELECT Id, Name, Amount, StageName, CloseDate FROM Opportunity \
                 WHERE IsClosed = false ORDER BY CloseDate ASC LIMIT 50",
            ),
        )?,
        QueryRule::new(
            "recent_leads",
            r"\b(?:new|recent|latest)\s+leads?\b",
            Literal(
                "SELECT Id, Name, Company, Status, LeadSource, CreatedDate FROM Lead \
                 WHERE CreatedDate = LAST_N_DAYS:7 ORDER BY CreatedDate DESC LIMIT 50",
            ),
        )?,
        QueryRule::new(
            "leads_from_source",
            r"\bleads?\s+(?:from|with\s+source|by\s+source)\s+(.+?)[\s?.!]*$",
            Build(leads_from_source),
        )?,
        QueryRule::new(
            "high_priority_cases",
            r"\b(?:high[-\s]priority|urgent|critical)\s+cases?\b",
            Literal(
                "SELECT Id, CaseNumber, Subject, Status, Priority FROM Case \
                 WHERE Priority = 'High' AND IsClosed = false ORDER BY CreatedDate DESC LIMIT 50",
            ),
        )?,
        QueryRule::new(
            "open_cases",
            r"\bopen\s+cases?\b",
            Literal(
                "SELECT Id, CaseNumber, Subject, Status, Priority FROM Case \
                 WHERE IsClosed = false ORDER BY CreatedDate DESC LIMIT 50",
            ),
        )?,
        QueryRule::new(
            "count_entity",
            r"\b(?:count|how\s+many)\s+(?:of\s+)?(?:the\s+)?(?:all\s+)?(?:my\s+)?(accounts?|contacts?|leads?|opportunit(?:y|ies)|cases?|tasks?|events?|users?|campaigns?)\b",
            Build(count_entity),
        )?,
        QueryRule::new(
            "list_accounts",
            &listing("accounts"),
            Literal("SELECT Id, Name, Industry, BillingState FROM Account ORDER BY Name LIMIT 100"),
        )?,
        QueryRule::new(
            "list_contacts",
            &listing("contacts"),
            Literal("SELECT Id, Name, Email, Phone FROM Contact ORDER BY Name LIMIT 100"),
        )?,
        QueryRule::new(
            "list_leads",
            &listing("leads"),
            Literal("SELECT Id, Name, Company, Status FROM Lead ORDER BY CreatedDate DESC LIMIT 100"),
        )?,
        QueryRule::new(
            "list_opportunities",
            &listing("opportunities"),
            Literal(
                "SELECT Id, Name, Amount, StageName, CloseDate FROM Opportunity \
                 ORDER BY CloseDate DESC LIMIT 100",
            ),
        )?,
        QueryRule::new(
            "list_cases",
            &listing("cases"),
            Literal("SELECT Id, CaseNumber, Subject, Status FROM Case ORDER BY CreatedDate DESC LIMIT 100"),
        )?,
    ])
}
