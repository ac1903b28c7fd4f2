use serde::Serialize;
use std::io;

use crate::error::Result;
use crate::models::Paper;

pub const HEADERS: [&str; 6] = [
    "PubMedID",
    "Title",
    "PublicationDate",
    "Non-AcademicAuthor(s)",
    "CompanyAffiliation(s)",
    "CorrespondingAuthorEmail",
];

const LIST_SEPARATOR: &str = "; ";

/// One output line per paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRow {
    #[serde(rename = "PubMedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "PublicationDate")]
    pub publication_date: String,
    #[serde(rename = "Non-AcademicAuthor(s)")]
    pub non_academic_authors: String,
    #[serde(rename = "CompanyAffiliation(s)")]
    pub company_affiliations: String,
    #[serde(rename = "CorrespondingAuthorEmail")]
    pub corresponding_author_email: String,
}

impl From<&Paper> for PaperRow {
    fn from(paper: &Paper) -> Self {
        Self {
            pubmed_id: paper.pubmed_id.clone(),
            title: paper.title.clone(),
            publication_date: paper.publication_date_text(),
            non_academic_authors: paper
                .non_academic_authors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            company_affiliations: paper.company_affiliations.join(LIST_SEPARATOR),
            corresponding_author_email: paper.corresponding_author_email.clone().unwrap_or_default(),
        }
    }
}

/// Writes a header line and one record per paper. The header is written
/// even when there are no papers.
pub fn write_csv<W: io::Write>(writer: W, papers: &[Paper]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(HEADERS)?;
    for paper in papers {
        wtr.serialize(PaperRow::from(paper))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the rows as a pretty-printed JSON array using the CSV column names.
pub fn write_json<W: io::Write>(mut writer: W, papers: &[Paper]) -> Result<()> {
    let rows: Vec<PaperRow> = papers.iter().map(PaperRow::from).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, PublicationDate};
    use chrono::NaiveDate;

    fn paper() -> Paper {
        let jane = Author::new("Jane Roe").with_affiliation("Genentech Inc., South San Francisco, CA");
        let john = Author::new("John Doe").with_affiliation("Pfizer Inc., New York, NY");
        Paper {
            pubmed_id: "38000001".to_string(),
            title: "Antibody engineering, revisited".to_string(),
            publication_date: NaiveDate::from_ymd_opt(2023, 11, 2).map(PublicationDate::Full),
            authors: vec![jane.clone(), john.clone()],
            non_academic_authors: vec![jane, john],
            company_affiliations: vec!["Genentech Inc.".to_string(), "Pfizer Inc.".to_string()],
            corresponding_author_email: Some("roe.jane@gene.com".to_string()),
        }
    }

    #[test]
    fn test_row_joins_lists() {
        let row = PaperRow::from(&paper());
        assert_eq!(row.publication_date, "2023-11-02");
        assert_eq!(row.non_academic_authors, "Jane Roe; John Doe");
        assert_eq!(row.company_affiliations, "Genentech Inc.; Pfizer Inc.");
        assert_eq!(row.corresponding_author_email, "roe.jane@gene.com");
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[paper()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "PubMedID,Title,PublicationDate,Non-AcademicAuthor(s),CompanyAffiliation(s),CorrespondingAuthorEmail"
        );
        assert_eq!(
            lines[1],
            "38000001,\"Antibody engineering, revisited\",2023-11-02,Jane Roe; John Doe,Genentech Inc.; Pfizer Inc.,roe.jane@gene.com"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_missing_values_render_empty() {
        let mut p = paper();
        p.publication_date = None;
        p.corresponding_author_email = None;
        let row = PaperRow::from(&p);
        assert_eq!(row.publication_date, "");
        assert_eq!(row.corresponding_author_email, "");
    }

    #[test]
    fn test_json_uses_column_names() {
        let mut buf = Vec::new();
        write_json(&mut buf, &[paper()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["PubMedID"], "38000001");
        assert_eq!(value[0]["CompanyAffiliation(s)"], "Genentech Inc.; Pfizer Inc.");
    }
}
