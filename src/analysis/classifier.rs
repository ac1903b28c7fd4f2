use serde::{Deserialize, Serialize};

use crate::models::Author;
use crate::taxonomy::AffiliationTaxonomy;

/// Which rule decided a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "matched", rename_all = "snake_case")]
pub enum Signal {
    AcademicIndicator(String),
    StrongIndustry(String),
    IndustryKeyword(String),
    EmailDomain(String),
    NoSignal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_non_academic: bool,
    pub company_name: Option<String>,
    pub signal: Signal,
}

impl Classification {
    fn academic(signal: Signal) -> Self {
        Self {
            is_non_academic: false,
            company_name: None,
            signal,
        }
    }

    fn non_academic(company_name: Option<String>, signal: Signal) -> Self {
        Self {
            is_non_academic: true,
            company_name,
            signal,
        }
    }
}

/// Combined result over all of an author's affiliations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorClassification {
    pub is_non_academic: bool,
    /// Deduplicated, in affiliation order.
    pub companies: Vec<String>,
}

/// Keyword heuristic separating industry affiliations from academic ones.
///
/// Rules, in order:
/// 1. an academic marker without a corporate suffix or known company name
///    means academic;
/// 2. any industry keyword means non-academic;
/// 3. otherwise an email on a commercial-looking domain means non-academic;
/// 4. otherwise academic.
///
/// Misses are preferred over false claims of industry ties.
#[derive(Debug, Clone, Default)]
pub struct AffiliationClassifier {
    taxonomy: AffiliationTaxonomy,
}

impl AffiliationClassifier {
    pub fn new() -> Self {
        Self {
            taxonomy: AffiliationTaxonomy::new(),
        }
    }

    pub fn with_taxonomy(taxonomy: AffiliationTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn classify(&self, affiliation: &str, email: Option<&str>) -> Classification {
        let text = affiliation.trim();
        let lower = text.to_lowercase();

        let strong = self.taxonomy.strong_industry_signal(&lower);
        if strong.is_none() {
            if let Some(academic) = self.taxonomy.academic.find(&lower) {
                return Classification::academic(Signal::AcademicIndicator(academic.text.clone()));
            }
        }

        if let Some(keyword) = strong {
            return Classification::non_academic(
                self.company_name(text),
                Signal::StrongIndustry(keyword.text.clone()),
            );
        }

        if let Some(keyword) = self.taxonomy.industry.find(&lower) {
            return Classification::non_academic(
                self.company_name(text),
                Signal::IndustryKeyword(keyword.text.clone()),
            );
        }

        if let Some(domain) = email.and_then(email_domain) {
            if self.is_commercial_domain(&domain) {
                let company = segment_naming_domain(text, &domain).unwrap_or_else(|| domain.clone());
                return Classification::non_academic(Some(company), Signal::EmailDomain(domain));
            }
        }

        Classification::academic(Signal::NoSignal)
    }

    /// An author is non-academic if any of their affiliations is.
    pub fn classify_author(&self, author: &Author) -> AuthorClassification {
        let email = author.email();
        let verdicts: Vec<Classification> = if author.affiliations.is_empty() {
            vec![self.classify("", email)]
        } else {
            author
                .affiliations
                .iter()
                .map(|affiliation| self.classify(affiliation, email))
                .collect()
        };

        let mut result = AuthorClassification::default();
        for verdict in verdicts.into_iter().filter(|v| v.is_non_academic) {
            tracing::debug!(
                "{} ({}) classified non-academic via {:?}",
                author.name,
                author.affiliation(),
                verdict.signal
            );
            result.is_non_academic = true;
            if let Some(company) = verdict.company_name {
                if !result.companies.contains(&company) {
                    result.companies.push(company);
                }
            }
        }

        result
    }

    /// Best guess at the organization name: the first comma/semicolon
    /// segment carrying an industry keyword, widened over split-off legal
    /// suffixes ("Genentech, Inc."), else the first segment. Nested
    /// affiliations can still yield an imprecise name.
    fn company_name(&self, text: &str) -> Option<String> {
        let segments: Vec<&str> = text
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let hit = segments
            .iter()
            .position(|s| self.taxonomy.industry_signal(&s.to_lowercase()).is_some());

        let Some(hit) = hit else {
            return first_segment(text);
        };

        let mut start = hit;
        if start > 0 && self.taxonomy.is_bare_suffix(&segments[start].to_lowercase()) {
            start -= 1;
        }

        let mut end = hit + 1;
        while end < segments.len() && self.taxonomy.is_bare_suffix(&segments[end].to_lowercase()) {
            end += 1;
        }

        Some(segments[start..end].join(", "))
    }

    fn is_commercial_domain(&self, domain: &str) -> bool {
        let academic = self
            .taxonomy
            .academic_email_suffixes
            .iter()
            .any(|suffix| domain.ends_with(suffix.as_str()))
            || self
                .taxonomy
                .academic_email_infixes
                .iter()
                .any(|infix| domain.contains(infix.as_str()));

        let personal = domain
            .split('.')
            .next()
            .is_some_and(|label| self.taxonomy.personal_mail_providers.iter().any(|p| p == label));

        !academic && !personal
    }
}

fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain
        .trim()
        .trim_end_matches(['.', ',', ';', '>', ')'])
        .to_lowercase();
    domain.contains('.').then_some(domain)
}

/// The segment that spells out the domain's organization label, e.g.
/// "Acme Bio" for `acmebio.com`.
fn segment_naming_domain(text: &str, domain: &str) -> Option<String> {
    let label = domain.split('.').next()?;
    if label.len() < 3 {
        return None;
    }

    text.split([',', ';'])
        .map(str::trim)
        .find(|segment| {
            let squashed: String = segment
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            squashed.len() >= 3 && (squashed.contains(label) || label.contains(squashed.as_str()))
        })
        .map(str::to_string)
}

fn first_segment(text: &str) -> Option<String> {
    text.split([',', ';'])
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
