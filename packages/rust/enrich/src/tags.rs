//! Keyword-based topic classifier.
//!
//! A pure, total function: any pair of input strings (including empty ones)
//! maps to a deterministic, declaration-ordered set of tags. No I/O, no
//! error conditions, cheap enough to recompute on every ingest run.

use policytracker_shared::Tag;

/// Topic categories and their trigger keywords, in output order.
const CATEGORIES: &[(Tag, &[&str])] = &[
    (Tag::Finance, &["finance", "appropriation", "tax"]),
    (Tag::Health, &["health", "medical", "medicare"]),
    (Tag::Education, &["education", "student", "school"]),
    (Tag::NationalSecurity, &["security", "defense", "border"]),
    (Tag::Technology, &["technology", "internet", "cybersecurity"]),
];

/// Classify a bill by keyword membership over its title and latest-action text.
///
/// A bill may match several categories; a bill matching none is tagged
/// exactly `[General]`.
pub fn classify(title: &str, action_text: &str) -> Vec<Tag> {
    let text = format!("{title} {action_text}").to_lowercase();

    let mut tags: Vec<Tag> = CATEGORIES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(tag, _)| *tag)
        .collect();

    if tags.is_empty() {
        tags.push(Tag::General);
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_keyword_match() {
        assert_eq!(classify("Tax Relief Act", ""), vec![Tag::Finance]);
    }

    #[test]
    fn empty_input_is_general() {
        assert_eq!(classify("", ""), vec![Tag::General]);
    }

    #[test]
    fn no_keyword_is_general() {
        assert_eq!(
            classify("National Bison Appreciation Day", "Agreed to in Senate."),
            vec![Tag::General]
        );
    }

    #[test]
    fn multiple_categories_in_declaration_order() {
        // "cybersecurity" triggers Technology, "border"/"security" trigger
        // National Security; output order follows the category table.
        assert_eq!(
            classify("Cybersecurity and Border Security Act", ""),
            vec![Tag::NationalSecurity, Tag::Technology]
        );
    }

    #[test]
    fn action_text_contributes_keywords() {
        assert_eq!(
            classify("An Act", "refers to education funding"),
            vec![Tag::Education]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("MEDICARE EXPANSION", ""), vec![Tag::Health]);
    }

    #[test]
    fn keyword_in_both_inputs_yields_one_tag() {
        assert_eq!(
            classify("School Safety Act", "Referred to the Committee on school facilities"),
            vec![Tag::Education]
        );
    }
}
