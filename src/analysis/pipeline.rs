use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::analysis::classifier::AffiliationClassifier;
use crate::error::Result;
use crate::models::{Article, Paper};
use crate::pubmed::{LiteratureSource, ParseWarning};

/// Papers fetched so far out of the candidate total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

type ProgressCallback = Box<dyn Fn(Progress) + Send + Sync>;

/// What a run found, with enough counts to tell "no matches" apart from
/// "every record was skipped".
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Papers with at least one non-academic author, in search order.
    pub papers: Vec<Paper>,
    /// Candidate ids returned by the search step.
    pub ids_found: usize,
    /// Records parsed successfully, before filtering.
    pub articles_parsed: usize,
    pub warnings: Vec<ParseWarning>,
}

impl RunReport {
    pub fn no_matches(&self) -> bool {
        self.ids_found == 0
    }

    pub fn all_records_skipped(&self) -> bool {
        self.ids_found > 0 && self.articles_parsed == 0
    }
}

/// Search, fetch, classify, filter.
pub struct PaperPipeline {
    source: Arc<dyn LiteratureSource>,
    classifier: AffiliationClassifier,
    progress: Option<ProgressCallback>,
}

impl PaperPipeline {
    pub fn new(source: impl LiteratureSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            classifier: AffiliationClassifier::new(),
            progress: None,
        }
    }

    pub fn with_classifier(mut self, classifier: AffiliationClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub async fn run(&self, query: &str, max_results: u32) -> Result<RunReport> {
        // Step 1: Candidate ids
        let ids = self.source.search(query, max_results).await?;
        if ids.is_empty() {
            tracing::info!("No papers found matching the query");
            return Ok(RunReport::default());
        }
        tracing::info!("Found {} candidate papers on {}", ids.len(), self.source.name());

        // Step 2: Details, one batch at a time
        let mut articles = Vec::with_capacity(ids.len());
        let mut warnings = Vec::new();
        let mut processed = 0;

        for chunk in ids.chunks(self.source.batch_size().max(1)) {
            let batch = self.source.fetch_details(chunk).await?;

            for warning in &batch.warnings {
                tracing::warn!("Skipped {}", warning);
            }

            warnings.extend(batch.warnings.iter().cloned());
            warnings.extend(missing_records(chunk, &batch.articles, &batch.warnings));
            articles.extend(batch.articles);

            processed += chunk.len();
            self.report_progress(processed, ids.len());
        }

        let articles = in_search_order(&ids, articles);
        let articles_parsed = articles.len();
        tracing::info!(
            "Parsed {} of {} papers ({} skipped)",
            articles_parsed,
            ids.len(),
            warnings.len()
        );

        // Step 3: Classify and keep papers with industry ties
        let papers: Vec<Paper> = articles
            .into_iter()
            .filter_map(|article| self.classify_article(article))
            .collect();

        tracing::info!(
            "Found {} papers with pharmaceutical/biotech affiliations",
            papers.len()
        );

        Ok(RunReport {
            papers,
            ids_found: ids.len(),
            articles_parsed,
            warnings,
        })
    }

    /// Classifies every author; `None` when none of them is non-academic.
    pub fn classify_article(&self, article: Article) -> Option<Paper> {
        let mut non_academic_authors = Vec::new();
        let mut company_affiliations: Vec<String> = Vec::new();

        for author in &article.authors {
            let verdict = self.classifier.classify_author(author);
            if !verdict.is_non_academic {
                continue;
            }
            non_academic_authors.push(author.clone());
            for company in verdict.companies {
                if !company_affiliations.contains(&company) {
                    company_affiliations.push(company);
                }
            }
        }

        if non_academic_authors.is_empty() {
            tracing::debug!("PMID {} has no industry-affiliated authors", article.pubmed_id);
            return None;
        }

        let corresponding_author_email = article.corresponding_author_email();
        Some(Paper {
            pubmed_id: article.pubmed_id,
            title: article.title,
            publication_date: article.publication_date,
            authors: article.authors,
            non_academic_authors,
            company_affiliations,
            corresponding_author_email,
        })
    }

    fn report_progress(&self, processed: usize, total: usize) {
        if let Some(callback) = &self.progress {
            callback(Progress { processed, total });
        }
    }
}

/// Warnings for requested ids the server sent nothing back for.
fn missing_records(
    requested: &[String],
    articles: &[Article],
    warnings: &[ParseWarning],
) -> Vec<ParseWarning> {
    let accounted: HashSet<&str> = articles
        .iter()
        .map(|a| a.pubmed_id.as_str())
        .chain(warnings.iter().filter_map(|w| w.pubmed_id.as_deref()))
        .collect();

    // Skipped records without a PMID may be any of the unaccounted ids.
    let anonymous = warnings.iter().filter(|w| w.pubmed_id.is_none()).count();
    let unaccounted: Vec<(usize, &String)> = requested
        .iter()
        .enumerate()
        .filter(|(_, id)| !accounted.contains(id.as_str()))
        .collect();

    unaccounted
        .into_iter()
        .skip(anonymous)
        .map(|(index, id)| ParseWarning {
            index,
            pubmed_id: Some(id.clone()),
            reason: "record not returned by server".to_string(),
        })
        .collect()
}

/// Orders articles by their position in the search results and drops
/// duplicate PMIDs.
fn in_search_order(ids: &[String], articles: Vec<Article>) -> Vec<Article> {
    let rank: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut seen = HashSet::new();
    let mut articles: Vec<Article> = articles
        .into_iter()
        .filter(|a| seen.insert(a.pubmed_id.clone()))
        .collect();
    articles.sort_by_key(|a| rank.get(a.pubmed_id.as_str()).copied().unwrap_or(usize::MAX));
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Author;
    use crate::pubmed::ParsedBatch;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory stand-in for PubMed.
    struct FakeSource {
        ids: Vec<String>,
        articles: HashMap<String, Article>,
        malformed: HashSet<String>,
        batch_size: usize,
        fail_fetch: bool,
    }

    impl FakeSource {
        fn new(articles: Vec<Article>) -> Self {
            Self {
                ids: articles.iter().map(|a| a.pubmed_id.clone()).collect(),
                articles: articles
                    .into_iter()
                    .map(|a| (a.pubmed_id.clone(), a))
                    .collect(),
                malformed: HashSet::new(),
                batch_size: 2,
                fail_fetch: false,
            }
        }
    }

    #[async_trait]
    impl LiteratureSource for FakeSource {
        async fn search(&self, _query: &str, max_results: u32) -> Result<Vec<String>> {
            Ok(self.ids.iter().take(max_results as usize).cloned().collect())
        }

        async fn fetch_details(&self, ids: &[String]) -> Result<ParsedBatch> {
            if self.fail_fetch {
                return Err(Error::retrieval(3, Some(503), "Service Unavailable"));
            }

            Ok(ids
                .iter()
                .enumerate()
                .filter_map(|(index, id)| {
                    if self.malformed.contains(id) {
                        return Some(Err(ParseWarning {
                            index,
                            pubmed_id: Some(id.clone()),
                            reason: "missing article title".to_string(),
                        }));
                    }
                    self.articles.get(id).cloned().map(Ok)
                })
                .collect())
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn article(pmid: &str, authors: Vec<Author>) -> Article {
        Article {
            pubmed_id: pmid.to_string(),
            title: format!("Paper {}", pmid),
            publication_date: None,
            authors,
        }
    }

    fn academic(name: &str) -> Author {
        Author::new(name)
            .with_affiliation("Department of Medicine, University of Oxford, Oxford, UK")
            .with_email(format!("{}@ox.ac.uk", name.to_lowercase()))
    }

    fn industry(name: &str, company: &str) -> Author {
        Author::new(name).with_affiliation(format!("{}, Basel, Switzerland", company))
    }

    fn mixed_corpus() -> Vec<Article> {
        vec![
            article("1", vec![academic("Alice"), academic("Bob")]),
            article("2", vec![academic("Carol"), industry("Dan", "Roche Diagnostics GmbH")]),
            article(
                "3",
                vec![
                    industry("Erin", "Novartis Pharma AG"),
                    industry("Frank", "Novartis Pharma AG").with_email("frank@novartis.com"),
                ],
            ),
            article("4", vec![]),
        ]
    }

    #[tokio::test]
    async fn test_only_papers_with_industry_authors_are_emitted() {
        let pipeline = PaperPipeline::new(FakeSource::new(mixed_corpus()));
        let report = pipeline.run("query", 100).await.unwrap();

        let ids: Vec<&str> = report.papers.iter().map(|p| p.pubmed_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert!(report.papers.iter().all(Paper::has_non_academic_authors));
        assert_eq!(report.ids_found, 4);
        assert_eq!(report.articles_parsed, 4);
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_paper_fields_are_aggregated() {
        let pipeline = PaperPipeline::new(FakeSource::new(mixed_corpus()));
        let report = pipeline.run("query", 100).await.unwrap();

        let mixed = &report.papers[0];
        let names: Vec<&str> = mixed.non_academic_authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Dan"]);
        assert_eq!(mixed.company_affiliations, vec!["Roche Diagnostics GmbH".to_string()]);
        assert_eq!(mixed.corresponding_author_email.as_deref(), Some("carol@ox.ac.uk"));
        assert_eq!(mixed.authors.len(), 2);

        let industry_only = &report.papers[1];
        assert_eq!(industry_only.non_academic_authors.len(), 2);
        assert_eq!(
            industry_only.company_affiliations,
            vec!["Novartis Pharma AG".to_string()]
        );
        assert_eq!(
            industry_only.corresponding_author_email.as_deref(),
            Some("frank@novartis.com")
        );
    }

    #[tokio::test]
    async fn test_candidates_capped_by_max_results() {
        let max_results = 20;
        let articles: Vec<Article> = (0..max_results + 50)
            .map(|i| article(&i.to_string(), vec![industry("Ann", "Acme Therapeutics")]))
            .collect();
        let pipeline = PaperPipeline::new(FakeSource::new(articles));

        let report = pipeline.run("query", max_results).await.unwrap();
        assert_eq!(report.ids_found, max_results as usize);
        assert!(report.papers.len() <= max_results as usize);
    }

    #[tokio::test]
    async fn test_malformed_records_do_not_abort_run() {
        let mut source = FakeSource::new(mixed_corpus());
        source.malformed.insert("3".to_string());
        let pipeline = PaperPipeline::new(source);

        let report = pipeline.run("query", 100).await.unwrap();
        let ids: Vec<&str> = report.papers.iter().map(|p| p.pubmed_id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(report.articles_parsed, 3);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].pubmed_id.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_missing_records_become_warnings() {
        let mut source = FakeSource::new(mixed_corpus());
        source.ids.push("404".to_string());
        let pipeline = PaperPipeline::new(source);

        let report = pipeline.run("query", 100).await.unwrap();
        assert_eq!(report.ids_found, 5);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].reason, "record not returned by server");
        assert_eq!(report.warnings[0].pubmed_id.as_deref(), Some("404"));
    }

    #[tokio::test]
    async fn test_empty_results_are_distinguishable() {
        let pipeline = PaperPipeline::new(FakeSource::new(Vec::new()));
        let report = pipeline.run("query", 100).await.unwrap();
        assert!(report.no_matches());
        assert!(!report.all_records_skipped());

        let mut source = FakeSource::new(mixed_corpus());
        source.malformed = source.ids.iter().cloned().collect();
        let report = PaperPipeline::new(source).run("query", 100).await.unwrap();
        assert!(report.papers.is_empty());
        assert!(!report.no_matches());
        assert!(report.all_records_skipped());
        assert_eq!(report.warnings.len(), 4);
    }

    #[tokio::test]
    async fn test_retrieval_error_propagates() {
        let mut source = FakeSource::new(mixed_corpus());
        source.fail_fetch = true;
        let pipeline = PaperPipeline::new(source);

        let err = pipeline.run("query", 100).await.unwrap_err();
        assert!(matches!(err, Error::Retrieval { status: Some(503), .. }));
    }

    #[tokio::test]
    async fn test_progress_reports_each_batch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let pipeline = PaperPipeline::new(FakeSource::new(mixed_corpus()))
            .on_progress(move |p| sink.lock().unwrap().push(p));

        pipeline.run("query", 100).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Progress { processed: 2, total: 4 },
                Progress { processed: 4, total: 4 },
            ]
        );
    }

    #[test]
    fn test_in_search_order_sorts_and_dedupes() {
        let ids: Vec<String> = ["b", "a", "c"].iter().map(|s| s.to_string()).collect();
        let articles = vec![
            article("a", vec![]),
            article("c", vec![]),
            article("b", vec![]),
            article("a", vec![]),
        ];
        let ordered: Vec<String> = in_search_order(&ids, articles)
            .into_iter()
            .map(|a| a.pubmed_id)
            .collect();
        assert_eq!(ordered, vec!["b", "a", "c"]);
    }
}
