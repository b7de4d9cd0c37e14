use unicode_normalization::UnicodeNormalization;

/// Split pre-segmented text into tokens.
///
/// The corpus arrives already segmented, so tokens are whitespace-delimited.
/// Text is NFC-normalized first so composed and decomposed diacritics map to
/// the same term. No stemming or stopword filtering happens here.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfc().collect::<String>();
    normalized.split_whitespace().map(str::to_string).collect()
}
