use serde::{Deserialize, Serialize};

use super::interface::LookupResult;

/// Marker text the assistant emits when it has no confident match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPhrase {
    pub text: String,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl FallbackPhrase {
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case_insensitive: false,
        }
    }

    pub fn ignore_case(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case_insensitive: true,
        }
    }

    fn matches(&self, reply: &str, reply_lower: &str) -> bool {
        if self.case_insensitive {
            reply_lower.contains(&self.text.to_lowercase())
        } else {
            reply.contains(&self.text)
        }
    }
}

/// Decides whether an assistant reply is a real answer.
///
/// A reply is "not found" when it is empty, contains any fallback phrase,
/// or is shorter than `min_reply_chars` once trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    pub phrases: Vec<FallbackPhrase>,
    pub min_reply_chars: Option<usize>,
}

const EXPANDING_TRANSLATOR: &str = "We're still expanding our translator";
const EXPANDING_TRANSLATOR_TYPOGRAPHIC: &str = "We\u{2019}re still expanding our translator";
const NO_MATCH: &str = "no match";
const MIN_REPLY_CHARS: usize = 40;

impl FallbackPolicy {
    /// The assistant's own "still expanding" message, matched exactly, no length check.
    pub fn expanding_translator() -> Self {
        Self {
            phrases: vec![
                FallbackPhrase::exact(EXPANDING_TRANSLATOR),
                FallbackPhrase::exact(EXPANDING_TRANSLATOR_TYPOGRAPHIC),
            ],
            min_reply_chars: None,
        }
    }

    /// Case-insensitive "no match" plus a 40 character floor.
    pub fn no_match() -> Self {
        Self {
            phrases: vec![FallbackPhrase::ignore_case(NO_MATCH)],
            min_reply_chars: Some(MIN_REPLY_CHARS),
        }
    }

    /// Build a policy from configured phrases, dropping blank ones
    /// (a blank phrase would match every reply).
    pub fn from_phrases(phrases: Vec<FallbackPhrase>, min_reply_chars: Option<usize>) -> Self {
        Self {
            phrases: phrases.into_iter().filter(|p| !p.text.trim().is_empty()).collect(),
            min_reply_chars,
        }
    }

    pub fn classify(&self, reply: &str) -> LookupResult {
        if self.is_fallback(reply) {
            LookupResult::not_found()
        } else {
            LookupResult::found(reply)
        }
    }

    pub fn is_fallback(&self, reply: &str) -> bool {
        if reply.trim().is_empty() {
            return true;
        }

        let reply_lower = reply.to_lowercase();
        if self.phrases.iter().any(|p| p.matches(reply, &reply_lower)) {
            return true;
        }

        match self.min_reply_chars {
            Some(min) => reply.trim().chars().count() < min,
            None => false,
        }
    }
}

impl Default for FallbackPolicy {
    /// Union of both known assistant behaviours.
    fn default() -> Self {
        let mut policy = Self::expanding_translator();
        policy.phrases.extend(Self::no_match().phrases);
        policy.min_reply_chars = Some(MIN_REPLY_CHARS);
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IT_SPECIALIST: &str = "25B – Information Technology Specialist (Army)\n\n\
        Civilian Role Matches:\n• Network Support Technician\n• Systems Administrator";

    #[test]
    fn empty_reply_is_not_found_under_every_policy() {
        for policy in [
            FallbackPolicy::default(),
            FallbackPolicy::expanding_translator(),
            FallbackPolicy::no_match(),
        ] {
            assert_eq!(policy.classify(""), LookupResult::not_found());
        }
    }

    #[test]
    fn whitespace_reply_is_not_found_without_length_floor() {
        let policy = FallbackPolicy::expanding_translator();
        assert_eq!(policy.classify("  \n "), LookupResult::not_found());
    }

    #[test]
    fn blank_configured_phrases_are_dropped() {
        let policy = FallbackPolicy::from_phrases(
            vec![FallbackPhrase::exact(""), FallbackPhrase::ignore_case("  "), FallbackPhrase::ignore_case("no match")],
            None,
        );
        assert_eq!(policy.phrases, vec![FallbackPhrase::ignore_case("no match")]);
        assert_eq!(policy.classify("11B – Infantry"), LookupResult::found("11B – Infantry"));
    }

    #[test]
    fn expanding_phrase_matches_both_apostrophes() {
        let policy = FallbackPolicy::expanding_translator();
        let straight = "We're still expanding our translator. Please check back soon for this code.";
        let curly = "We\u{2019}re still expanding our translator. Please check back soon.";
        assert!(!policy.classify(straight).is_found());
        assert!(!policy.classify(curly).is_found());
    }

    #[test]
    fn expanding_phrase_is_case_sensitive() {
        let policy = FallbackPolicy::expanding_translator();
        let reply = "WE'RE STILL EXPANDING OUR TRANSLATOR";
        assert_eq!(policy.classify(reply), LookupResult::found(reply));
    }

    #[test]
    fn expanding_variant_has_no_length_floor() {
        let policy = FallbackPolicy::expanding_translator();
        assert_eq!(policy.classify("11B – Infantry"), LookupResult::found("11B – Infantry"));
    }

    #[test]
    fn no_match_is_case_insensitive() {
        let policy = FallbackPolicy::no_match();
        let reply = "Sorry, I found NO MATCH for that code in the crosswalk dataset at all.";
        assert!(!policy.classify(reply).is_found());
    }

    #[test]
    fn short_replies_fall_below_threshold() {
        let policy = FallbackPolicy::no_match();
        // 39 characters once surrounding whitespace is trimmed
        let reply = format!("   {}   ", "x".repeat(39));
        assert!(!policy.classify(&reply).is_found());

        let reply = "y".repeat(40);
        assert_eq!(policy.classify(&reply), LookupResult::found(reply.clone()));
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        let policy = FallbackPolicy::no_match();
        // 20 two-byte characters: 40 bytes but only 20 chars
        let reply = "é".repeat(20);
        assert!(!policy.classify(&reply).is_found());
    }

    #[test]
    fn found_reply_is_returned_verbatim() {
        let policy = FallbackPolicy::default();
        let reply = format!("  {}\n", IT_SPECIALIST);
        assert_eq!(policy.classify(&reply), LookupResult::found(reply.clone()));
    }

    #[test]
    fn default_policy_combines_both_rules() {
        let policy = FallbackPolicy::default();
        assert_eq!(policy.min_reply_chars, Some(40));
        assert!(policy.is_fallback("We're still expanding our translator"));
        assert!(policy.is_fallback(
            "There is no Match for ZZZ in any branch's occupational classification list."
        ));
        assert!(policy.is_fallback("Too short"));
        assert!(!policy.is_fallback(IT_SPECIALIST));
    }
}
