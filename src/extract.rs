use regex::Regex;

/// UK postcode shape, un-anchored. Group 1 is the postcode.
pub const POSTCODE_PATTERN: &str = r"([A-Z][A-HJ-Y]?[0-9][A-Z0-9]? ?[0-9][A-Z]{2}|GIR ?0A{2})";

/// Pulls postcode-shaped substrings out of free text.
#[derive(Debug, Clone)]
pub struct PostcodeExtractor {
    pattern: Regex,
}

impl Default for PostcodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PostcodeExtractor {
    pub fn new() -> Self {
        let pattern = Regex::new(POSTCODE_PATTERN).expect("postcode pattern compiles");
        Self { pattern }
    }

    /// First postcode found in `text`, if any.
    pub fn extract(&self, text: &str) -> Option<String> {
        self.pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
    }

    /// Extracts from every entry, treating a missing field as no match.
    pub fn extract_all<'a, I>(&self, texts: I) -> Vec<Option<String>>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        texts
            .into_iter()
            .map(|t| t.and_then(|t| self.extract(t)))
            .collect()
    }
}
