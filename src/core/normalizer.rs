// File: src/core/normalizer.rs
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Plural endings tried when an exact lookup misses, longest first.
/// Each maps to the singular ending that replaces it.
const PLURAL_RULES: &[(&str, &str)] = &[
    ("oes", "ao"),
    ("aes", "ao"),
    ("aos", "ao"),
    ("ns", "m"),
    ("is", "l"),
    ("es", ""),
    ("s", ""),
];

/// Shortest stem a plural rule may leave behind.
const MIN_STEM_CHARS: usize = 2;

/// Canonical form used for every comparison: lower-cased, decomposed,
/// combining marks removed, trimmed. Idempotent.
pub fn normalize(text: &str) -> String {
    // Lower-case before decomposing so marks introduced by case mapping
    // (e.g. 'İ' -> "i\u{307}") are stripped in the same pass.
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    stripped.trim().to_string()
}

/// Singular candidates for an already-canonical word, in the order they should be tried.
/// Does not include the word itself.
pub fn singular_candidates(canonical: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for (suffix, replacement) in PLURAL_RULES {
        if let Some(stem) = canonical.strip_suffix(suffix) {
            if stem.chars().count() < MIN_STEM_CHARS {
                continue;
            }
            let candidate = format!("{stem}{replacement}");
            if candidate != canonical && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_case() {
        assert_eq!(normalize("  Avião "), "aviao");
        assert_eq!(normalize("ÁRVORE"), "arvore");
        assert_eq!(normalize("Caminhão"), "caminhao");
        assert_eq!(normalize("lobo guará"), "lobo guara");
    }

    #[test]
    fn precomposed_and_decomposed_input_agree() {
        assert_eq!(normalize("tênis"), normalize("te\u{0302}nis"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Avião", "  ÇÃO  ", "İstanbul", "e\u{301}\u{301}", " \u{301}a", "ǅemal",
            "guarda-chuva", "", "   ", "Straße", "ﬁm", "mico leão dourado",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n"), "");
    }

    #[test]
    fn singular_candidates_follow_rule_order() {
        assert_eq!(singular_candidates("avioes"), vec!["aviao", "avio", "avioe"]);
        assert_eq!(singular_candidates("sapatos"), vec!["sapato"]);
        assert_eq!(singular_candidates("animais"), vec!["animal", "animai"]);
        assert!(singular_candidates("casa").is_empty());
        assert!(singular_candidates("os").is_empty());
    }
}
