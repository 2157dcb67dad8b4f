//! Intake content filter.
//!
//! First gate of the pipeline: cheap text heuristics that knock out spam
//! and off-category submissions before any fingerprinting or external
//! classifier call happens.

use regex::Regex;

/// Outcome of the intake filter. Declines are ordinary values, not
/// errors; the reason string is persisted on the complaint.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub passed: bool,
    pub reason: String,
    pub is_spam: bool,
}

const MIN_DESCRIPTION_LEN: usize = 20;

/// Keyword vocabulary per category family. Matched by substring against
/// the lowercased category name, so "Pothole Repair" picks up the
/// "pothole" row.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "pothole",
        &["pothole", "road", "damage", "crack", "hole", "pavement", "broken"],
    ),
    (
        "street_light",
        &["light", "street light", "lamp", "dark", "electricity", "bulb", "lighting"],
    ),
    (
        "garbage",
        &["garbage", "waste", "trash", "litter", "dump", "rubbish", "dirt", "dirty"],
    ),
    (
        "water_supply",
        &["water", "pipe", "leak", "supply", "tap", "pipeline", "drainage"],
    ),
    (
        "sewage",
        &["sewage", "drain", "overflow", "smell", "blockage", "clogged", "drainage"],
    ),
    (
        "park",
        &["park", "garden", "playground", "maintenance", "grass", "bench"],
    ),
    (
        "traffic",
        &["traffic", "signal", "sign", "crossing", "zebra crossing", "road sign"],
    ),
    ("animal", &["stray", "dog", "cattle", "animal", "cow", "nuisance"]),
    (
        "toilet",
        &["toilet", "public toilet", "washroom", "bathroom", "sanitation"],
    ),
    (
        "health",
        &["health", "hospital", "clinic", "medical", "sanitation", "hygiene"],
    ),
];

pub struct ContentFilter {
    spam_patterns: Vec<Regex>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFilter {
    pub fn new() -> Self {
        // Patterns are literals, so compilation cannot fail; flatten keeps
        // the constructor infallible without an unwrap.
        let spam_patterns = [
            r"(?i)\b(buy|purchase|discount|offer|sale|cheap|free|win|prize)\b",
            r"(?i)\b(click here|visit|website|link)\b",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect();
        Self { spam_patterns }
    }

    /// Five or more identical characters in a row ("aaaaa", "!!!!!").
    /// Backreferences are not available, so this is a manual scan.
    fn has_repeated_run(description: &str) -> bool {
        let mut run = 0usize;
        let mut prev: Option<char> = None;
        for ch in description.chars() {
            if Some(ch) == prev {
                run += 1;
                if run >= 5 {
                    return true;
                }
            } else {
                prev = Some(ch);
                run = 1;
            }
        }
        false
    }

    fn spam_check(&self, description: &str) -> Option<String> {
        for pattern in &self.spam_patterns {
            if pattern.is_match(description) {
                return Some("Detected spam pattern in description".to_owned());
            }
        }
        if Self::has_repeated_run(description) {
            return Some("Detected spam pattern in description".to_owned());
        }
        if description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            return Some("Description too short (minimum 20 characters)".to_owned());
        }
        None
    }

    fn category_match(description: &str, category_name: &str) -> (bool, String) {
        let description_lower = description.to_lowercase();
        let category_lower = category_name.to_lowercase();

        let mut relevant: Vec<&str> = Vec::new();
        for (key, keywords) in CATEGORY_KEYWORDS {
            if category_lower.contains(key) {
                relevant.extend_from_slice(keywords);
            }
        }
        // Unknown category family: fall back to the words of the category
        // name itself.
        if relevant.is_empty() {
            relevant = category_lower
                .split_whitespace()
                .filter(|w| w.len() > 3)
                .collect();
        }

        let matches: Vec<&str> = relevant
            .into_iter()
            .filter(|kw| description_lower.contains(*kw))
            .collect();

        if matches.is_empty() {
            (
                false,
                format!("Description does not match category '{category_name}'"),
            )
        } else {
            (
                true,
                format!("Valid: Found relevant keywords - {}", matches[..matches.len().min(3)].join(", ")),
            )
        }
    }

    /// Run every check in order. Spam trumps the category mismatch: a
    /// spammy description is flagged `is_spam` regardless of category.
    pub fn validate(&self, description: &str, category_name: Option<&str>) -> FilterOutcome {
        if let Some(reason) = self.spam_check(description) {
            return FilterOutcome {
                passed: false,
                reason,
                is_spam: true,
            };
        }

        if let Some(name) = category_name {
            let (matched, reason) = Self::category_match(description, name);
            if !matched {
                return FilterOutcome {
                    passed: false,
                    reason,
                    is_spam: false,
                };
            }
        }

        FilterOutcome {
            passed: true,
            reason: "Complaint appears genuine and matches category".to_owned(),
            is_spam: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_description_is_spam() {
        let filter = ContentFilter::new();
        let out = filter.validate("too short", None);
        assert!(!out.passed);
        assert!(out.is_spam);
    }

    #[test]
    fn sales_pitch_is_spam() {
        let filter = ContentFilter::new();
        let out = filter.validate(
            "Huge discount on road repair kits, click here to order today",
            Some("Pothole"),
        );
        assert!(!out.passed);
        assert!(out.is_spam);
    }

    #[test]
    fn repeated_characters_are_spam() {
        let filter = ContentFilter::new();
        let out = filter.validate("pleeeeeease fix the road near my house", None);
        assert!(out.is_spam);
    }

    #[test]
    fn off_category_description_declines_without_spam_flag() {
        let filter = ContentFilter::new();
        let out = filter.validate(
            "The hospital ward has no clean drinking facilities at all",
            Some("Pothole"),
        );
        assert!(!out.passed);
        assert!(!out.is_spam);
    }

    #[test]
    fn matching_description_passes() {
        let filter = ContentFilter::new();
        let out = filter.validate(
            "Deep pothole on the main road near the school gate",
            Some("Pothole Repair"),
        );
        assert!(out.passed);
        assert_eq!(out.reason, "Complaint appears genuine and matches category");
    }

    #[test]
    fn keyword_match_reports_the_matched_words() {
        let (matched, reason) = ContentFilter::category_match(
            "Deep pothole on the main road near the school gate",
            "Pothole Repair",
        );
        assert!(matched);
        assert!(reason.contains("pothole"), "{reason}");
    }
}
