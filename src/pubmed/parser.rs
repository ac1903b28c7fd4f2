use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Article, Author, PublicationDate};

/// A record that was dropped from a batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// Position of the record within its batch.
    pub index: usize,
    pub pubmed_id: Option<String>,
    pub reason: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pubmed_id {
            Some(id) => write!(f, "record #{} (PMID {}): {}", self.index, id, self.reason),
            None => write!(f, "record #{}: {}", self.index, self.reason),
        }
    }
}

/// Everything recovered from one EFetch document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBatch {
    pub articles: Vec<Article>,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedBatch {
    pub fn merge(&mut self, other: ParsedBatch) {
        self.articles.extend(other.articles);
        self.warnings.extend(other.warnings);
    }
}

impl FromIterator<Result<Article, ParseWarning>> for ParsedBatch {
    fn from_iter<I: IntoIterator<Item = Result<Article, ParseWarning>>>(iter: I) -> Self {
        let mut batch = ParsedBatch::default();
        for record in iter {
            match record {
                Ok(article) => batch.articles.push(article),
                Err(warning) => batch.warnings.push(warning),
            }
        }
        batch
    }
}

/// Parses an EFetch `PubmedArticleSet` document.
///
/// A record without a PMID or title is skipped with a warning and the rest
/// of the document still parses. An XML syntax error ends the document;
/// records completed before it are kept.
pub fn parse_articles(xml: &str) -> ParsedBatch {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut record: Option<RecordBuilder> = None;
    let mut records: Vec<Result<Article, ParseWarning>> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if name == "PubmedArticle" {
                    record = Some(RecordBuilder::default());
                } else if let Some(builder) = record.as_mut() {
                    builder.open(&path, &name, &e);
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                if let Some(builder) = record.as_mut() {
                    builder.open(&path, &name, &e);
                    builder.close(&path, &name);
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(builder) = record.as_mut() {
                    match t.unescape() {
                        Ok(text) => builder.text(&path, &text),
                        Err(e) => builder.fail(format!("bad text content: {}", e)),
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(builder) = record.as_mut() {
                    builder.text(&path, &String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::End(_)) => {
                let name = path.pop().unwrap_or_default();
                if name == "PubmedArticle" {
                    if let Some(builder) = record.take() {
                        records.push(builder.finish(records.len()));
                    }
                } else if let Some(builder) = record.as_mut() {
                    builder.close(&path, &name);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let position = reader.buffer_position();
                tracing::warn!("Malformed EFetch document at byte {}: {}", position, e);
                records.push(Err(ParseWarning {
                    index: records.len(),
                    pubmed_id: record.take().and_then(|r| r.pmid),
                    reason: format!("malformed XML at byte {}: {}", position, e),
                }));
                break;
            }
        }
    }

    let batch: ParsedBatch = records.into_iter().collect();
    tracing::debug!(
        "Parsed {} articles, {} skipped",
        batch.articles.len(),
        batch.warnings.len()
    );
    batch
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

fn inside(path: &[String], element: &str) -> bool {
    path.iter().any(|p| p == element)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Default)]
struct DateParts {
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
}

impl DateParts {
    fn set(&mut self, field: &str, text: &str) {
        let value = text.trim().to_string();
        match field {
            "Year" => self.year = Some(value),
            "Month" => self.month = Some(value),
            "Day" => self.day = Some(value),
            _ => {}
        }
    }

    fn build(&self) -> Option<PublicationDate> {
        let year = self.year.as_deref()?;
        Some(PublicationDate::from_parts(
            year,
            self.month.as_deref(),
            self.day.as_deref(),
        ))
    }
}

#[derive(Debug, Default)]
struct AuthorBuilder {
    last_name: String,
    fore_name: String,
    collective_name: String,
    affiliations: Vec<String>,
    current_affiliation: String,
    corresponding: bool,
}

impl AuthorBuilder {
    fn build(self) -> Option<Author> {
        let last = collapse_whitespace(&self.last_name);
        let fore = collapse_whitespace(&self.fore_name);
        let collective = collapse_whitespace(&self.collective_name);

        let name = match (fore.is_empty(), last.is_empty()) {
            (false, false) => format!("{} {}", fore, last),
            (true, false) => last,
            _ if !collective.is_empty() => collective,
            _ => return None,
        };

        let email = self.affiliations.iter().find_map(|a| extract_email(a));

        Some(Author {
            name,
            affiliations: self.affiliations,
            email,
            is_corresponding: self.corresponding,
        })
    }
}

#[derive(Debug, Default)]
struct RecordBuilder {
    pmid: Option<String>,
    title: String,
    authors: Vec<Author>,
    author: Option<AuthorBuilder>,
    pub_date: DateParts,
    medline_date: String,
    article_date: DateParts,
    failure: Option<String>,
}

impl RecordBuilder {
    fn open(&mut self, path: &[String], name: &str, e: &BytesStart<'_>) {
        if name == "Author" && ends_with(path, &["Article", "AuthorList"]) {
            let corresponding = e
                .try_get_attribute("CorrespAuthor")
                .ok()
                .flatten()
                .and_then(|a| a.unescape_value().ok())
                .is_some_and(|v| v.eq_ignore_ascii_case("y"));
            self.author = Some(AuthorBuilder {
                corresponding,
                ..AuthorBuilder::default()
            });
        } else if name == "Affiliation" {
            if let Some(author) = self.author.as_mut() {
                author.current_affiliation.clear();
            }
        }
    }

    fn close(&mut self, path: &[String], name: &str) {
        if name == "Author" && ends_with(path, &["Article", "AuthorList"]) {
            if let Some(author) = self.author.take().and_then(AuthorBuilder::build) {
                self.authors.push(author);
            }
        } else if name == "Affiliation" {
            if let Some(author) = self.author.as_mut() {
                let affiliation = collapse_whitespace(&author.current_affiliation);
                if !affiliation.is_empty() {
                    author.affiliations.push(affiliation);
                }
            }
        }
    }

    fn text(&mut self, path: &[String], text: &str) {
        if ends_with(path, &["MedlineCitation", "PMID"]) {
            if self.pmid.is_none() {
                let pmid = text.trim();
                if !pmid.is_empty() {
                    self.pmid = Some(pmid.to_string());
                }
            }
        } else if inside(path, "ArticleTitle") {
            self.title.push_str(text);
        } else if let Some(author) = self.author.as_mut() {
            match path.last().map(String::as_str) {
                Some("LastName") => author.last_name.push_str(text),
                Some("ForeName") => author.fore_name.push_str(text),
                _ if inside(path, "CollectiveName") => author.collective_name.push_str(text),
                _ if inside(path, "Affiliation") => author.current_affiliation.push_str(text),
                _ => {}
            }
        } else if ends_with(path, &["PubDate", "MedlineDate"]) {
            self.medline_date.push_str(text);
        } else if path.len() >= 2 && path[path.len() - 2] == "PubDate" {
            if let Some(field) = path.last() {
                self.pub_date.set(field, text);
            }
        } else if path.len() >= 2 && ends_with(&path[..path.len() - 1], &["Article", "ArticleDate"]) {
            if let Some(field) = path.last() {
                self.article_date.set(field, text);
            }
        }
    }

    fn fail(&mut self, reason: String) {
        self.failure.get_or_insert(reason);
    }

    fn finish(self, index: usize) -> Result<Article, ParseWarning> {
        let warning = |pubmed_id: Option<String>, reason: String| ParseWarning {
            index,
            pubmed_id,
            reason,
        };

        if let Some(reason) = self.failure {
            return Err(warning(self.pmid, reason));
        }

        let Some(pubmed_id) = self.pmid else {
            return Err(warning(None, "missing PMID".to_string()));
        };

        let title = collapse_whitespace(&self.title);
        if title.is_empty() {
            return Err(warning(Some(pubmed_id), "missing article title".to_string()));
        }

        let medline_date = self.medline_date.trim();
        let publication_date = self
            .pub_date
            .build()
            .or_else(|| (!medline_date.is_empty()).then(|| PublicationDate::parse_text(medline_date)))
            .or_else(|| self.article_date.build());

        Ok(Article {
            pubmed_id,
            title,
            publication_date,
            authors: self.authors,
        })
    }
}

/// First email address in free text. PubMed appends them to affiliations as
/// "Electronic address: name@host.org."
pub fn extract_email(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|token| {
            token.trim_matches(|c: char| {
                matches!(c, '.' | ',' | ';' | ':' | '<' | '>' | '(' | ')' | '[' | ']' | '"' | '\'')
            })
        })
        .find(|token| {
            token
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
        })
        .map(str::to_string)
}
