//! Keyword-based severity classification of candidate answers.
//!
//! An answer mentioning a high-tier finding is rewritten with a supportive
//! framing before it reaches the user; medium-tier findings are reported but
//! not rewritten. Matching is case-insensitive substring containment over two
//! fixed, disjoint vocabularies.

use crate::domain::models::Severity;

/// Findings that always force the supportive rewrite.
///
/// Matching is by containment, so "mass" also fires inside longer words.
const HIGH_TERMS: &[&str] = &[
    "carcinoma",
    "malignancy",
    "metastasis",
    "hemorrhage",
    "mass",
    "lesion",
    "pneumothorax",
    "consolidation",
    "infiltrate",
    "acute",
];

/// Findings reported at medium severity when no high-tier term is present.
const MEDIUM_TERMS: &[&str] = &[
    "opacity",
    "nodule",
    "effusion",
    "atelectasis",
    "fibrosis",
];

/// Classify `text` into a severity tier.
///
/// A high-tier term short-circuits immediately and is never overridden, no
/// matter how many medium-tier terms appear or where. Multiplicity is not
/// counted, only presence. Text matching neither vocabulary is `Low`.
pub fn classify(text: &str) -> Severity {
    let lowered = text.to_lowercase();

    if HIGH_TERMS.iter().any(|term| lowered.contains(term)) {
        return Severity::High;
    }

    if MEDIUM_TERMS.iter().any(|term| lowered.contains(term)) {
        return Severity::Medium;
    }

    Severity::Low
}

/// Wrap a high-severity answer in a supportive framing.
///
/// The original `summary` is embedded verbatim, followed by three fixed
/// questions the reader can take to their clinician and an explicit
/// not-a-diagnosis disclaimer.
pub fn supportive_rewrite(summary: &str) -> String {
    format!(
        "I know this may sound worrying. Here's a plain-language summary:\n\n\
         {summary}\n\n\
         This is not a diagnosis. Consider asking your clinician:\n\
         1) Could you explain what this finding likely means for me?\n\
         2) Do I need follow-up tests or treatment?\n\
         3) Is immediate action needed?\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn text_without_trigger_terms_is_low() {
        assert_eq!(classify("Normal chest radiograph"), Severity::Low);
        assert_eq!(classify(""), Severity::Low);
        assert_eq!(classify("clear lungs, no abnormality seen"), Severity::Low);
    }

    #[test]
    fn medium_term_alone_is_medium() {
        assert_eq!(classify("small nodule in the left lobe"), Severity::Medium);
        assert_eq!(classify("pleural effusion noted"), Severity::Medium);
    }

    #[test]
    fn high_term_alone_is_high() {
        assert_eq!(classify("findings consistent with pneumothorax"), Severity::High);
    }

    #[test]
    fn high_wins_over_medium_in_any_order() {
        assert_eq!(
            classify("opacity with underlying mass suspected"),
            Severity::High
        );
        assert_eq!(
            classify("mass effect, also a nodule and effusion"),
            Severity::High
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("ACUTE process cannot be excluded"), Severity::High);
        assert_eq!(classify("Fibrosis pattern"), Severity::Medium);
    }

    #[test]
    fn containment_matches_inside_longer_words() {
        // "mass" inside "biomass" still fires; containment is deliberate.
        assert_eq!(classify("biomass burning artifact"), Severity::High);
    }

    #[test]
    fn rewrite_embeds_summary_verbatim() {
        let summary = "Findings consistent with pneumothorax";
        let rewritten = supportive_rewrite(summary);

        assert!(rewritten.contains(summary));
        assert!(rewritten.contains("This is not a diagnosis"));
        assert!(rewritten.contains("1) Could you explain what this finding likely means for me?"));
        assert!(rewritten.contains("2) Do I need follow-up tests or treatment?"));
        assert!(rewritten.contains("3) Is immediate action needed?"));
    }

    #[test]
    fn rewrite_is_deterministic() {
        assert_eq!(supportive_rewrite("abc"), supportive_rewrite("abc"));
    }

    proptest! {
        #[test]
        fn any_text_containing_a_high_term_is_high(
            prefix in "[a-z ]{0,32}",
            suffix in "[a-z ]{0,32}",
            term_idx in 0..HIGH_TERMS.len(),
        ) {
            let text = format!("{prefix}{}{suffix}", HIGH_TERMS[term_idx]);
            prop_assert_eq!(classify(&text), Severity::High);
        }

        #[test]
        fn rewrite_always_contains_the_original(summary in "\\PC{0,64}") {
            prop_assert!(supportive_rewrite(&summary).contains(&summary));
        }
    }
}
