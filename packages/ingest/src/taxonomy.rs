//! Offense classification rules.
//!
//! The rules live in `taxonomy/crime_against.toml`, compiled into the
//! binary, and map offense text onto the NIBRS crime-against groupings.
//! Rules are matched top to bottom against the uppercased offense text
//! and the first match wins.

use crime_dash_incident_models::CrimeAgainst;
use serde::Deserialize;

use crate::IngestError;

static DEFAULT_RULES_TOML: &str = include_str!("../taxonomy/crime_against.toml");

#[derive(Debug, Deserialize)]
struct RulesFile {
    rule: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
struct RuleDef {
    category: String,
    patterns: Vec<String>,
}

#[derive(Debug, Clone)]
struct Rule {
    category: CrimeAgainst,
    patterns: Vec<String>,
}

/// Ordered offense-to-category classification rules.
#[derive(Debug, Clone)]
pub struct CrimeAgainstTaxonomy {
    rules: Vec<Rule>,
}

impl CrimeAgainstTaxonomy {
    /// Loads the rules compiled into the binary.
    ///
    /// # Errors
    ///
    /// * `IngestError::TaxonomyParse` or `IngestError::InvalidTaxonomy` if
    ///   the embedded rules file is malformed.
    pub fn load_default() -> Result<Self, IngestError> {
        Self::from_toml_str(DEFAULT_RULES_TOML)
    }

    /// Parses and validates a rules document.
    ///
    /// # Errors
    ///
    /// * `IngestError::TaxonomyParse` if the document is not valid TOML.
    /// * `IngestError::InvalidTaxonomy` if it contains no rules, names an
    ///   unrecognized category, targets `UNKNOWN`, or lists a rule with no
    ///   usable patterns.
    pub fn from_toml_str(document: &str) -> Result<Self, IngestError> {
        let parsed: RulesFile = toml::from_str(document)?;

        if parsed.rule.is_empty() {
            return Err(IngestError::InvalidTaxonomy {
                message: "rules document contains no rules".to_string(),
            });
        }

        let mut rules = Vec::with_capacity(parsed.rule.len());
        for def in parsed.rule {
            let category = def.category.parse::<CrimeAgainst>().map_err(|_| {
                IngestError::InvalidTaxonomy {
                    message: format!("unrecognized category '{}'", def.category),
                }
            })?;
            if !category.is_classified() {
                return Err(IngestError::InvalidTaxonomy {
                    message: "UNKNOWN is the fallback, not a rule target".to_string(),
                });
            }

            let patterns = def
                .patterns
                .iter()
                .map(|pattern| pattern.trim().to_uppercase())
                .filter(|pattern| !pattern.is_empty())
                .collect::<Vec<_>>();
            if patterns.is_empty() {
                return Err(IngestError::InvalidTaxonomy {
                    message: format!("rule for '{category}' has no usable patterns"),
                });
            }

            rules.push(Rule { category, patterns });
        }

        Ok(Self { rules })
    }

    /// Classifies offense text, matching case-insensitively.
    ///
    /// Returns [`CrimeAgainst::Unknown`] when no rule matches.
    #[must_use]
    pub fn classify(&self, offense: &str) -> CrimeAgainst {
        let offense = offense.to_uppercase();
        self.rules
            .iter()
            .find(|rule| rule.patterns.iter().any(|pattern| offense.contains(pattern)))
            .map_or(CrimeAgainst::Unknown, |rule| rule.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_load() {
        let taxonomy = CrimeAgainstTaxonomy::load_default().unwrap();
        assert!(!taxonomy.rules.is_empty());
    }

    #[test]
    fn classifies_into_each_grouping() {
        let taxonomy = CrimeAgainstTaxonomy::load_default().unwrap();
        assert_eq!(taxonomy.classify("BURGLARY"), CrimeAgainst::Property);
        assert_eq!(taxonomy.classify("AGGRAVATED ASSAULT"), CrimeAgainst::Person);
        assert_eq!(
            taxonomy.classify("NARCOTIC - POSSESSION"),
            CrimeAgainst::Society
        );
        assert_eq!(taxonomy.classify("GNOME RELOCATION"), CrimeAgainst::Unknown);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let taxonomy = CrimeAgainstTaxonomy::load_default().unwrap();
        assert_eq!(taxonomy.classify("car prowl"), CrimeAgainst::Property);
    }

    #[test]
    fn person_rules_win_over_later_lists() {
        let taxonomy = CrimeAgainstTaxonomy::load_default().unwrap();
        assert_eq!(
            taxonomy.classify("ASSAULT - WEAPON"),
            CrimeAgainst::Person
        );
    }

    #[test]
    fn unrecognized_category_is_invalid() {
        let document = r#"
            [[rule]]
            category = "MISCHIEF"
            patterns = ["THEFT"]
        "#;
        assert!(matches!(
            CrimeAgainstTaxonomy::from_toml_str(document),
            Err(IngestError::InvalidTaxonomy { .. })
        ));
    }

    #[test]
    fn unknown_is_not_a_valid_rule_target() {
        let document = r#"
            [[rule]]
            category = "UNKNOWN"
            patterns = ["THEFT"]
        "#;
        assert!(matches!(
            CrimeAgainstTaxonomy::from_toml_str(document),
            Err(IngestError::InvalidTaxonomy { .. })
        ));
    }

    #[test]
    fn blank_patterns_do_not_count() {
        let document = r#"
            [[rule]]
            category = "PROPERTY"
            patterns = ["", "  "]
        "#;
        assert!(matches!(
            CrimeAgainstTaxonomy::from_toml_str(document),
            Err(IngestError::InvalidTaxonomy { .. })
        ));
    }

    #[test]
    fn empty_document_is_invalid() {
        assert!(matches!(
            CrimeAgainstTaxonomy::from_toml_str("rule = []"),
            Err(IngestError::InvalidTaxonomy { .. })
        ));
    }
}
