//! Free text → SOQL translator

use super::entity::EntityType;
use super::result::TranslationResult;
use super::rule::{QueryRule, standard_rules};
use super::soql::looks_like_soql;
use crate::core::error::DomainError;

/// Row bound for the entity-keyword fallback query
pub const FALLBACK_LIMIT: usize = 10;

/// Translates free text into SOQL using an ordered rule table.
///
/// Translation is pure: no I/O and no state carried between calls.
#[derive(Debug, Clone)]
pub struct QueryTranslator {
    rules: Vec<QueryRule>,
}

impl QueryTranslator {
    /// Build a translator over the standard rule table.
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self::with_rules(standard_rules()?))
    }

    /// Build a translator over a custom rule table (evaluated in order).
    pub fn with_rules(rules: Vec<QueryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[QueryRule] {
        &self.rules
    }

    /// Translate `input`.
    ///
    /// 1. Input that already is SOQL passes through (trimmed), confidence 1.0.
    /// 2. First matching rule wins, confidence 0.9.
    /// 3. A bare entity keyword yields a minimal listing, confidence 0.5.
    /// 4. Otherwise an error result with example inputs.
    pub fn translate(&self, input: &str) -> TranslationResult {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return TranslationResult::unmatched();
        }

        if looks_like_soql(trimmed) {
            return TranslationResult::passthrough(trimmed);
        }

        if let Some(query) = self.rules.iter().find_map(|rule| rule.apply(trimmed)) {
            return TranslationResult::matched(query);
        }

        if let Some(entity) = EntityType::find_in(trimmed) {
            let suggestion = format!(
                "Only the {} object was recognised, so this is a basic listing. \
                 Add a filter (for example \"{} in California\" or \"open {}\") or write SOQL directly.",
                entity,
                entity.plural(),
                entity.plural()
            );
            return TranslationResult::partial(entity.listing_query(FALLBACK_LIMIT), suggestion);
        }

        TranslationResult::unmatched()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::result::{CONFIDENCE_ENTITY_FALLBACK, CONFIDENCE_RULE};
    use crate::query::rule::QueryTemplate;

    fn translator() -> QueryTranslator {
        QueryTranslator::new().unwrap()
    }

    #[test]
    fn passthrough_keeps_query_and_ignores_rules() {
        let t = translator();
        for input in [
            "SELECT Id, Name FROM Account",
            "  select Id from Lead where Name = 'accounts in Texas'  ",
            "\tSeLeCt COUNT() FrOm Case\n",
        ] {
            let result = t.translate(input);
            assert_eq!(result.query.as_deref(), Some(input.trim()));
            assert_eq!(result.confidence, 1.0);
            assert!(result.raw_passthrough);
            assert!(result.error.is_none());
        }
    }

    #[test]
    fn specific_rule_wins_over_generic_listing() {
        let t = translator();

        let generic = t.translate("show all accounts");
        assert_eq!(
            generic.query.as_deref(),
            Some("SELECT Id, Name, Industry, BillingState FROM Account ORDER BY Name LIMIT 100")
        );
        assert_eq!(generic.confidence, CONFIDENCE_RULE);

        let specific = t.translate("accounts in California");
        let overlapping = t.translate("Show all accounts in California");
        assert_eq!(specific.query, overlapping.query);
        assert!(
            specific
                .query
                .unwrap()
                .contains("WHERE BillingState = 'California'")
        );
    }

    #[test]
    fn earliest_rule_in_table_wins() {
        let first = QueryRule::new("first", r"\bleads\b", QueryTemplate::Literal("FIRST")).unwrap();
        let second =
            QueryRule::new("second", r"\bnew leads\b", QueryTemplate::Literal("SECOND")).unwrap();
        let t = QueryTranslator::with_rules(vec![first, second]);
        assert_eq!(t.translate("new leads").query.as_deref(), Some("FIRST"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let t = translator();
        assert_eq!(t.translate("OPEN CASES").query, t.translate("open cases").query);
    }

    #[test]
    fn entity_fallback_is_partial() {
        let result = translator().translate("xyz leads");
        assert_eq!(result.confidence, CONFIDENCE_ENTITY_FALLBACK);
        assert_eq!(
            result.query.as_deref(),
            Some("SELECT Id, Name, Company FROM Lead LIMIT 10")
        );
        assert!(result.suggestion.is_some());
        assert!(!result.raw_passthrough);
    }

    #[test]
    fn select_without_from_is_not_passthrough() {
        let result = translator().translate("select all accounts");
        assert!(!result.raw_passthrough);
        assert_eq!(result.confidence, CONFIDENCE_ENTITY_FALLBACK);
    }

    #[test]
    fn unknown_input_yields_error() {
        let result = translator().translate("zzz not a real query");
        assert!(result.query.is_none());
        assert_eq!(result.confidence, 0.0);
        assert!(!result.error.unwrap().is_empty());
    }

    #[test]
    fn whitespace_only_input_is_an_error() {
        let result = translator().translate("   \n\t ");
        assert!(result.query.is_none());
        assert!(result.error.is_some());
    }

    #[test]
    fn translation_is_deterministic() {
        let t = translator();
        let a = t.translate("contacts at Acme Corp");
        let b = t.translate("contacts at Acme Corp");
        assert_eq!(a, b);
        assert!(a.query.unwrap().contains("Account.Name = 'Acme Corp'"));
    }
}
