//! Work entity extraction: JSON → JSONL records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{defaulting_seq, lenient_opt, lenient_seq};

// === Row struct (deserialized from JSON) ===

/// OpenAlex Work JSON; only the fields the collector projects
#[derive(Debug, Default, Deserialize)]
pub struct WorkRow {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub publication_year: Option<i32>,

    /// Publication date (ISO 8601)
    #[serde(default, deserialize_with = "lenient_opt")]
    pub publication_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt")]
    pub language: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt")]
    pub primary_location: Option<Location>,

    #[serde(default, deserialize_with = "lenient_opt")]
    pub open_access: Option<OpenAccessInfo>,

    /// Malformed authorships still count towards the authorship cap
    #[serde(default, deserialize_with = "defaulting_seq")]
    pub authorships: Vec<Authorship>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub topics: Vec<TopicRef>,

    #[serde(default)]
    pub counts_by_year: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub source: Option<SourceRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAccessInfo {
    #[serde(default)]
    pub is_oa: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Authorship {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub author: Option<AuthorRef>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub author_position: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub is_corresponding: Option<bool>,
    /// Non-string entries (`null` included) are skipped
    #[serde(default, deserialize_with = "lenient_seq")]
    pub raw_affiliation_strings: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub institutions: Vec<InstitutionRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstitutionRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl WorkRow {
    fn source(&self) -> Option<&SourceRef> {
        self.primary_location.as_ref()?.source.as_ref()
    }

    pub fn journal_name(&self) -> Option<String> {
        self.source().and_then(|s| s.display_name.clone())
    }

    pub fn source_type(&self) -> Option<String> {
        self.source().and_then(|s| s.source_type.clone())
    }

    pub fn is_open_access(&self) -> Option<bool> {
        self.open_access.as_ref().and_then(|oa| oa.is_oa)
    }
}

// === Output records ===

/// Placeholder when an authorship has no raw affiliation string
pub const NO_RAW_AFFILIATION: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionRecord {
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub institution_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorAffiliation {
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub author_position: Option<String>,
    pub is_corresponding: Option<bool>,
    pub raw_affiliation: String,
    pub affiliations: Vec<InstitutionRecord>,
}

impl From<Authorship> for AuthorAffiliation {
    fn from(a: Authorship) -> Self {
        let (author_id, author_name) = match a.author {
            Some(author) => (author.id, author.display_name),
            None => (None, None),
        };
        Self {
            author_id,
            author_name,
            author_position: a.author_position,
            is_corresponding: a.is_corresponding,
            raw_affiliation: a
                .raw_affiliation_strings
                .into_iter()
                .next()
                .unwrap_or_else(|| NO_RAW_AFFILIATION.to_string()),
            affiliations: a
                .institutions
                .into_iter()
                .map(|inst| InstitutionRecord {
                    institution_id: inst.id,
                    institution_name: inst.display_name,
                    institution_country: inst.country_code,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkTopic {
    pub topic_id: Option<String>,
    pub topic_name: Option<String>,
    pub topic_score: Option<f64>,
}

/// Full work detail, anchored to the author whose query produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullWorkRecord {
    pub id: Option<String>,
    pub author_id: String,
    pub publication_year: i32,
    pub publication_date: Option<String>,
    pub language: Option<String>,
    pub journal_name: Option<String>,
    pub source_type: Option<String>,
    pub is_open_access: Option<bool>,
    pub authors: Vec<AuthorAffiliation>,
    pub topics: Vec<WorkTopic>,
    pub citation_counts_by_year: Option<Value>,
    pub number_of_works: Option<u64>,
    pub source_link: String,
}

/// Stand-in for works over the authorship cap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegenerateWorkRecord {
    pub id: Option<String>,
    pub publication_year: i32,
    pub number_of_authors: usize,
}

/// One line of the works JSONL output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkRecord {
    Full(Box<FullWorkRecord>),
    Degenerate(DegenerateWorkRecord),
}

impl WorkRecord {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }
}

// === Extraction ===

/// Per-work filtering thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPolicy {
    /// Works with more authorships than this get a degenerate record
    pub max_full_authorships: usize,
    /// Works published before this year (or with no year) are dropped
    pub min_publication_year: i32,
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self {
            max_full_authorships: 10,
            min_publication_year: 1945,
        }
    }
}

/// Query context stamped onto every full record of one page
#[derive(Debug, Clone, Copy)]
pub struct WorkAnchor<'a> {
    /// Author ID exactly as read from the input list
    pub author_id: &'a str,
    /// `meta.count` of the page
    pub number_of_works: Option<u64>,
    /// Query URL that produced the page
    pub source_link: &'a str,
}

impl WorkPolicy {
    /// Project one work; `None` means the work is dropped.
    pub fn extract(&self, work: WorkRow, anchor: &WorkAnchor<'_>) -> Option<WorkRecord> {
        let year = work
            .publication_year
            .filter(|y| *y >= self.min_publication_year)?;

        if work.authorships.len() > self.max_full_authorships {
            return Some(WorkRecord::Degenerate(DegenerateWorkRecord {
                id: work.id,
                publication_year: year,
                number_of_authors: work.authorships.len(),
            }));
        }

        let journal_name = work.journal_name();
        let source_type = work.source_type();
        let is_open_access = work.is_open_access();

        Some(WorkRecord::Full(Box::new(FullWorkRecord {
            id: work.id,
            author_id: anchor.author_id.to_string(),
            publication_year: year,
            publication_date: work.publication_date,
            language: work.language,
            journal_name,
            source_type,
            is_open_access,
            authors: work
                .authorships
                .into_iter()
                .map(AuthorAffiliation::from)
                .collect(),
            topics: work
                .topics
                .into_iter()
                .map(|t| WorkTopic {
                    topic_id: t.id,
                    topic_name: t.display_name,
                    topic_score: t.score,
                })
                .collect(),
            citation_counts_by_year: work.counts_by_year,
            number_of_works: anchor.number_of_works,
            source_link: anchor.source_link.to_string(),
        })))
    }
}
