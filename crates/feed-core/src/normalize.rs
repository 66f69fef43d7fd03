use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Portuguese function words that carry no ranking signal.
/// Stored without diacritics so they match normalized text.
const STOP_WORDS: &[&str] = &[
    "a", "o", "as", "os", "de", "do", "da", "dos", "das", "em", "no", "na", "nos", "nas",
    "com", "para", "pra", "por", "sem", "sob", "sobre", "um", "uma", "uns", "umas", "e",
    "ou", "mas", "que", "se", "ao", "aos", "pelo", "pela", "pelos", "pelas", "entre", "ate",
    "desde", "nao", "nem", "tambem", "mais", "menos", "muito", "pouco", "todo", "toda",
    "todos", "todas", "este", "esta", "estes", "estas", "esse", "essa", "esses", "essas",
    "aquele", "aquela", "aqueles", "aquelas", "isto", "isso", "aquilo", "me", "te", "lhe",
    "vos", "mim", "ti", "si", "contigo", "consigo", "meu", "minha", "meus", "minhas", "teu",
    "tua", "teus", "tuas", "seu", "sua", "seus", "suas", "nosso", "nossa", "nossos",
    "nossas", "ja", "ainda", "so", "apenas", "quando", "onde", "como", "porque", "assim",
    "entao", "agora", "aqui", "ali", "la", "ca", "bem", "mal", "sim",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(term: &str) -> bool {
    STOP_WORD_SET.contains(term)
}

/// Strip diacritics (NFD + combining-mark removal) and lowercase
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized whitespace-separated words, stop-words included.
/// Punctuation hugging a word ("pizzas," / "(24h)") is trimmed.
pub fn words(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Searchable terms of a text
pub fn tokenize(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| !is_stop_word(w))
        .collect()
}

/// Query terms: `tokenize` without repeats, first occurrence wins
pub fn query_terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Canonical phrase form used for exact-phrase checks
pub fn normalize_phrase(text: &str) -> String {
    words(text).join(" ")
}
