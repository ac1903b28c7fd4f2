use serde::{Deserialize, Serialize};

use super::author::Author;
use super::date::PublicationDate;

/// A PubMed record as parsed from EFetch, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub pubmed_id: String,
    pub title: String,
    pub publication_date: Option<PublicationDate>,
    pub authors: Vec<Author>,
}

impl Article {
    /// Email of the author flagged as corresponding, else the first author
    /// email found.
    pub fn corresponding_author_email(&self) -> Option<String> {
        self.authors
            .iter()
            .find(|a| a.is_corresponding && a.email().is_some())
            .or_else(|| self.authors.iter().find(|a| a.email().is_some()))
            .and_then(|a| a.email())
            .map(str::to_string)
    }
}

/// A classified paper with at least one industry-affiliated author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub pubmed_id: String,
    pub title: String,
    pub publication_date: Option<PublicationDate>,
    pub authors: Vec<Author>,
    pub non_academic_authors: Vec<Author>,
    pub company_affiliations: Vec<String>,
    pub corresponding_author_email: Option<String>,
}

impl Paper {
    pub fn has_non_academic_authors(&self) -> bool {
        !self.non_academic_authors.is_empty()
    }

    pub fn publication_date_text(&self) -> String {
        self.publication_date
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(authors: Vec<Author>) -> Article {
        Article {
            pubmed_id: "123".to_string(),
            title: "Test Paper".to_string(),
            publication_date: None,
            authors,
        }
    }

    #[test]
    fn test_corresponding_email_prefers_flagged_author() {
        let article = article(vec![
            Author::new("Academic Author").with_email("academic@university.edu"),
            Author::new("Company Author")
                .with_email("company@pfizer.com")
                .corresponding(),
        ]);
        assert_eq!(
            article.corresponding_author_email().as_deref(),
            Some("company@pfizer.com")
        );
    }

    #[test]
    fn test_corresponding_email_falls_back_to_first_email() {
        let article = article(vec![
            Author::new("No Email").corresponding(),
            Author::new("Second").with_email("second@lab.org"),
            Author::new("Third").with_email("third@lab.org"),
        ]);
        assert_eq!(
            article.corresponding_author_email().as_deref(),
            Some("second@lab.org")
        );
        assert_eq!(self::article(Vec::new()).corresponding_author_email(), None);
    }
}
