use std::collections::HashMap;

use warren_proto::ShortDesc;

/// Fuzzy identification of a target from free-form input (spec §4.8). Pure
/// string logic over a caller-built dictionary (self + container +
/// container's contents + container's siblings + the pseudo-name `me`) —
/// no I/O, so it is exhaustively unit-tested here rather than through a
/// single end-to-end scenario.
pub fn identify(dictionary: &HashMap<String, ShortDesc>, input: &str) -> Vec<String> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    // Rule 1: exact prefix.
    let exact = whole_prefix_matches(dictionary, &needle);
    if exact.len() == 1 {
        return exact;
    }

    // Rule 2: numbered prefix.
    if let Some((ordinal, stripped)) = split_ordinal(&needle) {
        let numbered = whole_prefix_matches(dictionary, &stripped);
        if let Some(id) = nth_one_based(&numbered, ordinal) {
            return vec![id];
        }
    }

    // Rule 3: inside-word prefix, only attempted when rule 1 found nothing.
    let inside = if exact.is_empty() {
        let inside = inside_word_matches(dictionary, &needle);
        if inside.len() == 1 {
            return inside;
        }
        inside
    } else {
        Vec::new()
    };

    // Rule 4: inside-word numbered.
    if let Some((ordinal, stripped)) = split_ordinal(&needle) {
        let inside_numbered = inside_word_matches(dictionary, &stripped);
        if let Some(id) = nth_one_based(&inside_numbered, ordinal) {
            return vec![id];
        }
    }

    if !exact.is_empty() {
        exact
    } else {
        inside
    }
}

fn whole_prefix_matches(dictionary: &HashMap<String, ShortDesc>, needle: &str) -> Vec<String> {
    let mut matches: Vec<String> = dictionary
        .iter()
        .filter(|(_, desc)| desc.value.to_lowercase().starts_with(needle))
        .map(|(id, _)| id.clone())
        .collect();
    matches.sort();
    matches
}

fn inside_word_matches(dictionary: &HashMap<String, ShortDesc>, needle: &str) -> Vec<String> {
    let mut matches: Vec<String> = dictionary
        .iter()
        .filter(|(_, desc)| {
            desc.value
                .split_whitespace()
                .any(|word| word.to_lowercase().starts_with(needle))
        })
        .map(|(id, _)| id.clone())
        .collect();
    matches.sort();
    matches
}

fn nth_one_based(matches: &[String], ordinal: usize) -> Option<String> {
    if ordinal == 0 {
        return None;
    }
    matches.get(ordinal - 1).cloned()
}

/// Splits a trailing decimal ordinal off `input`, e.g. `"sword 2"` or
/// `"sword2"` -> `(2, "sword")`. `None` if there is no trailing digit run
/// or nothing precedes it.
fn split_ordinal(input: &str) -> Option<(usize, String)> {
    let trimmed = input.trim_end();
    let digit_count = trimmed.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    if digit_count == 0 || digit_count == trimmed.len() {
        return None;
    }
    let split_at = trimmed.len() - digit_count;
    let ordinal: usize = trimmed[split_at..].parse().ok()?;
    if ordinal == 0 {
        return None;
    }
    let stripped = trimmed[..split_at].trim_end().to_string();
    if stripped.is_empty() {
        return None;
    }
    Some((ordinal, stripped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, &str)]) -> HashMap<String, ShortDesc> {
        pairs
            .iter()
            .map(|(id, desc)| (id.to_string(), ShortDesc::new(*desc)))
            .collect()
    }

    #[test]
    fn exact_prefix_resolves_unique_match() {
        let dictionary = dict(&[("r1", "a rusty sword"), ("r2", "a wooden shield")]);
        assert_eq!(identify(&dictionary, "rusty"), vec!["r1".to_string()]);
    }

    #[test]
    fn exact_prefix_is_case_insensitive() {
        let dictionary = dict(&[("r1", "a Rusty Sword")]);
        assert_eq!(identify(&dictionary, "RUSTY"), vec!["r1".to_string()]);
    }

    #[test]
    fn ambiguous_exact_prefix_falls_through_to_numbered() {
        let dictionary = dict(&[("r1", "a sword"), ("r2", "a sword")]);
        let mut both = identify(&dictionary, "sword");
        both.sort();
        assert_eq!(both, vec!["r1".to_string(), "r2".to_string()]);

        let picked = identify(&dictionary, "sword2");
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn numbered_prefix_picks_one_based_ordinal() {
        let dictionary = dict(&[("r1", "a sword"), ("r2", "a sword"), ("r3", "a sword")]);
        let first = identify(&dictionary, "sword1");
        let second = identify(&dictionary, "sword2");
        let third = identify(&dictionary, "sword3");
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);
    }

    #[test]
    fn numbered_prefix_out_of_range_falls_through_to_empty() {
        let dictionary = dict(&[("r1", "a sword"), ("r2", "a sword")]);
        // no 9th match at any rule; every later rule also comes up empty.
        assert!(identify(&dictionary, "sword9").is_empty());
    }

    #[test]
    fn inside_word_prefix_only_applies_when_exact_prefix_found_nothing() {
        let dictionary = dict(&[("r1", "a battered wooden shield")]);
        assert_eq!(identify(&dictionary, "wood"), vec!["r1".to_string()]);
    }

    #[test]
    fn inside_word_numbered_disambiguates_multiple_word_matches() {
        let dictionary = dict(&[
            ("r1", "a wooden shield"),
            ("r2", "a wooden table"),
        ]);
        let picked = identify(&dictionary, "wooden2");
        assert_eq!(picked.len(), 1);
        assert!(picked[0] == "r1" || picked[0] == "r2");
    }

    #[test]
    fn no_match_returns_empty() {
        let dictionary = dict(&[("r1", "a sword")]);
        assert!(identify(&dictionary, "shield").is_empty());
    }

    #[test]
    fn me_pseudo_name_resolves_like_any_other_entry() {
        let mut dictionary = dict(&[("r1", "a sword")]);
        dictionary.insert("caller-1".to_string(), ShortDesc::new("me").name());
        assert_eq!(identify(&dictionary, "me"), vec!["caller-1".to_string()]);
    }
}
