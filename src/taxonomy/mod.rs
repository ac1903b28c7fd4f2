pub mod keywords;

/// How a keyword must sit inside the text to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Starts at a word boundary, may continue ("pharmaceutic" matches
    /// "Pharmaceuticals").
    Stem,
    /// Starts and ends at word boundaries ("inc" does not match "Princeton").
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    pub boundary: Boundary,
}

impl Keyword {
    pub fn new(text: &str, boundary: Boundary) -> Self {
        Self {
            text: text.to_lowercase(),
            boundary,
        }
    }

    /// Byte range of the first match in `haystack`, which must already be
    /// lowercase.
    pub fn find_in(&self, haystack: &str) -> Option<(usize, usize)> {
        haystack
            .match_indices(self.text.as_str())
            .map(|(start, m)| (start, start + m.len()))
            .find(|&(start, end)| {
                let starts_clean = !is_word_char_before(haystack, start);
                let ends_clean = match self.boundary {
                    Boundary::Stem => true,
                    Boundary::Word => !is_word_char_at(haystack, end),
                };
                starts_clean && ends_clean
            })
    }
}

fn is_word_char_before(haystack: &str, index: usize) -> bool {
    haystack[..index]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric)
}

fn is_word_char_at(haystack: &str, index: usize) -> bool {
    haystack[index..]
        .chars()
        .next()
        .is_some_and(char::is_alphanumeric)
}

/// An ordered list of case-insensitive keyword matchers.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new(table: &[(&str, Boundary)]) -> Self {
        Self {
            keywords: table
                .iter()
                .map(|(text, boundary)| Keyword::new(text, *boundary))
                .collect(),
        }
    }

    pub fn extend(mut self, table: &[(&str, Boundary)]) -> Self {
        self.keywords
            .extend(table.iter().map(|(text, boundary)| Keyword::new(text, *boundary)));
        self
    }

    /// First keyword (in table order) found in `haystack`. `haystack` must
    /// already be lowercase.
    pub fn find(&self, haystack: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.find_in(haystack).is_some())
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.find(haystack).is_some()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// The keyword tables the affiliation classifier runs on.
#[derive(Debug, Clone)]
pub struct AffiliationTaxonomy {
    pub academic: KeywordSet,
    pub corporate_suffixes: KeywordSet,
    pub known_companies: KeywordSet,
    pub industry: KeywordSet,
    pub academic_email_suffixes: Vec<String>,
    pub academic_email_infixes: Vec<String>,
    pub personal_mail_providers: Vec<String>,
}

impl AffiliationTaxonomy {
    pub fn new() -> Self {
        Self {
            academic: KeywordSet::new(keywords::ACADEMIC),
            corporate_suffixes: KeywordSet::new(keywords::CORPORATE_SUFFIXES),
            known_companies: KeywordSet::new(keywords::KNOWN_COMPANIES),
            industry: KeywordSet::new(keywords::INDUSTRY),
            academic_email_suffixes: to_owned(keywords::ACADEMIC_EMAIL_SUFFIXES),
            academic_email_infixes: to_owned(keywords::ACADEMIC_EMAIL_INFIXES),
            personal_mail_providers: to_owned(keywords::PERSONAL_MAIL_PROVIDERS),
        }
    }

    /// Corporate suffix or known company name in `text` (lowercase). Strong
    /// signals outweigh academic markers.
    pub fn strong_industry_signal(&self, text: &str) -> Option<&Keyword> {
        self.corporate_suffixes
            .find(text)
            .or_else(|| self.known_companies.find(text))
    }

    /// Any industry signal in `text` (lowercase), strong ones first.
    pub fn industry_signal(&self, text: &str) -> Option<&Keyword> {
        self.strong_industry_signal(text)
            .or_else(|| self.industry.find(text))
    }

    /// True when `segment` (lowercase) is nothing but corporate suffixes,
    /// e.g. the `" Inc."` left over from `"Genentech, Inc."`.
    pub fn is_bare_suffix(&self, segment: &str) -> bool {
        let mut words = segment.split_whitespace().peekable();
        words.peek().is_some() && words.all(|w| self.corporate_suffixes.matches(w))
    }
}

impl Default for AffiliationTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
