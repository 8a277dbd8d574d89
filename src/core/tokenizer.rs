// File: src/core/tokenizer.rs

/// Characters that separate words in a transcript, besides whitespace.
const SEPARATORS: &[char] = &[',', '.', ';', '!', '?'];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

/// Splits an utterance into words, left to right. Empty fragments are dropped.
pub fn tokenize(utterance: &str) -> Vec<&str> {
    utterance
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .collect()
}

/// Parts of a hyphenated compound ("mico-leão-dourado"), left to right.
/// A word without hyphens yields itself.
pub fn split_compound(word: &str) -> impl Iterator<Item = &str> {
    word.split('-').filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_punctuation() {
        assert_eq!(
            tokenize("sapato, casa.  pente;chave! avião? balde"),
            vec!["sapato", "casa", "pente", "chave", "avião", "balde"]
        );
    }

    #[test]
    fn keeps_hyphenated_words_whole() {
        assert_eq!(tokenize("guarda-chuva e bem-te-vi"), vec!["guarda-chuva", "e", "bem-te-vi"]);
    }

    #[test]
    fn compounds_split_on_hyphens() {
        assert_eq!(split_compound("mico-leão-dourado").collect::<Vec<_>>(), vec!["mico", "leão", "dourado"]);
        assert_eq!(split_compound("gato").collect::<Vec<_>>(), vec!["gato"]);
        assert_eq!(split_compound("-peixe--boi-").collect::<Vec<_>>(), vec!["peixe", "boi"]);
        assert_eq!(split_compound("-").count(), 0);
    }

    #[test]
    fn empty_and_separator_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" ,.;!? \t\n").is_empty());
    }

    #[test]
    fn preserves_duplicates_in_order() {
        assert_eq!(tokenize("casa sapato casa"), vec!["casa", "sapato", "casa"]);
    }
}
