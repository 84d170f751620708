use deed_audit_core::{run_rule_checks, RuleFlag, Severity};
use proptest::prelude::*;

const DATE_RISK: &str = "Possession Date Missing";
const INDEMNITY_RISK: &str = "Missing Indemnity Clause";
const DISPUTE_RISK: &str = "No Dispute Resolution";

fn risks(flags: &[RuleFlag]) -> Vec<&str> {
    flags.iter().map(|flag| flag.risk.as_str()).collect()
}

#[test]
fn complete_deed_has_no_flags() {
    let text = "Possession shall occur on 12-Dec-2025. Seller shall indemnify buyer. Disputes go to arbitration.";
    assert!(run_rule_checks(text).is_empty());
}

#[test]
fn empty_text_has_every_flag() {
    let flags = run_rule_checks("");
    assert_eq!(risks(&flags), vec![DATE_RISK, INDEMNITY_RISK, DISPUTE_RISK]);
    let severities: Vec<_> = flags.iter().map(|flag| flag.severity).collect();
    assert_eq!(
        severities,
        vec![Severity::High, Severity::High, Severity::Medium]
    );
}

#[test]
fn numeric_date_without_clauses() {
    let flags = run_rule_checks("The deal closes 15/01/2026 but no liability clause exists.");
    assert_eq!(risks(&flags), vec![INDEMNITY_RISK, DISPUTE_RISK]);
}

#[test]
fn clauses_without_date() {
    let flags = run_rule_checks("Indemnification applies. No date and no court/arbitration clause.");
    assert_eq!(risks(&flags), vec![DATE_RISK]);
}

/// Filler that can never contain a digit, `indemni`, `court` or `arbitration`.
fn filler() -> impl Strategy<Value = String> {
    "[abd-hj-zABD-HJ-Z .,;]{0,40}"
}

fn randomly_cased(word: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
        word.chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #[test]
    fn each_flag_follows_only_its_own_predicate(
        with_date in any::<bool>(),
        with_indemnity in any::<bool>(),
        with_dispute in any::<bool>(),
        indemnity_word in randomly_cased("indemnity"),
        dispute_word in prop_oneof![randomly_cased("court"), randomly_cased("arbitration")],
        pad in filler(),
    ) {
        let mut parts = vec![pad.clone()];
        if with_date {
            parts.push("on 3rd March 2026".to_string());
        }
        if with_indemnity {
            parts.push(indemnity_word);
        }
        if with_dispute {
            parts.push(dispute_word);
        }
        parts.push(pad);
        let flags = run_rule_checks(&parts.join(" "));
        let raised = risks(&flags);

        prop_assert_eq!(raised.contains(&DATE_RISK), !with_date);
        prop_assert_eq!(raised.contains(&INDEMNITY_RISK), !with_indemnity);
        prop_assert_eq!(raised.contains(&DISPUTE_RISK), !with_dispute);
    }

    #[test]
    fn text_without_dates_or_keywords_raises_everything(text in filler()) {
        prop_assert_eq!(run_rule_checks(&text).len(), 3);
    }

    #[test]
    fn numeric_dates_always_satisfy_the_date_check(
        day in 1u32..=31,
        month in 1u32..=12,
        year in 0u32..=9999,
        sep in prop_oneof![Just('-'), Just('/')],
    ) {
        let text = format!("Possession on {day}{sep}{month}{sep}{year:04}.");
        prop_assert!(!risks(&run_rule_checks(&text)).contains(&DATE_RISK));
    }

    #[test]
    fn checks_are_idempotent(text in ".{0,200}") {
        prop_assert_eq!(run_rule_checks(&text), run_rule_checks(&text));
    }
}
