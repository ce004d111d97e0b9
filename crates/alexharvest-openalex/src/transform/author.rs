//! Author entity projection: JSON → CSV rows

use serde::{Deserialize, Serialize};
use serde_json::Value;

// === Row struct (deserialized from JSON) ===

/// OpenAlex Author JSON, as returned by `/authors` and `/authors/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct AuthorRow {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub orcid: Option<String>,

    #[serde(default)]
    pub works_count: Option<i64>,

    #[serde(default)]
    pub cited_by_count: Option<i64>,

    #[serde(default)]
    pub summary_stats: Option<SummaryStats>,

    /// Carried through verbatim
    #[serde(default)]
    pub affiliations: Option<Value>,

    #[serde(default)]
    pub topics: Option<Value>,

    #[serde(default)]
    pub counts_by_year: Option<Value>,

    #[serde(default)]
    pub works_api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryStats {
    #[serde(default)]
    pub h_index: Option<i64>,
    #[serde(default)]
    pub i10_index: Option<i64>,
}

impl AuthorRow {
    pub fn h_index(&self) -> Option<i64> {
        self.summary_stats.as_ref().and_then(|s| s.h_index)
    }

    pub fn i10_index(&self) -> Option<i64> {
        self.summary_stats.as_ref().and_then(|s| s.i10_index)
    }
}

/// Compact JSON text for a CSV cell; `null` stays an empty cell
fn json_cell(value: Option<Value>) -> Option<String> {
    value.filter(|v| !v.is_null()).map(|v| v.to_string())
}

// === Output records ===

/// One row of `authors_basic.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorBasicRecord {
    #[serde(rename = "Author ID")]
    pub author_id: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "ORCID")]
    pub orcid: Option<String>,
    #[serde(rename = "Works Count")]
    pub works_count: Option<i64>,
    #[serde(rename = "Affiliations")]
    pub affiliations: Option<String>,
}

impl From<AuthorRow> for AuthorBasicRecord {
    fn from(row: AuthorRow) -> Self {
        Self {
            author_id: row.id,
            name: row.display_name,
            orcid: row.orcid,
            works_count: row.works_count,
            affiliations: json_cell(row.affiliations),
        }
    }
}

/// One row of `authors_detailed.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDetailRecord {
    #[serde(rename = "Author ID")]
    pub author_id: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Cited By Count")]
    pub cited_by_count: Option<i64>,
    #[serde(rename = "H-Index")]
    pub h_index: Option<i64>,
    #[serde(rename = "i10-Index")]
    pub i10_index: Option<i64>,
    #[serde(rename = "Affiliations")]
    pub affiliations: Option<String>,
    #[serde(rename = "Topics")]
    pub topics: Option<String>,
    #[serde(rename = "Counts by Year")]
    pub counts_by_year: Option<String>,
    #[serde(rename = "Works API URL")]
    pub works_api_url: Option<String>,
}

impl From<AuthorRow> for AuthorDetailRecord {
    fn from(row: AuthorRow) -> Self {
        let h_index = row.h_index();
        let i10_index = row.i10_index();
        Self {
            author_id: row.id,
            name: row.display_name,
            cited_by_count: row.cited_by_count,
            h_index,
            i10_index,
            affiliations: json_cell(row.affiliations),
            topics: json_cell(row.topics),
            counts_by_year: json_cell(row.counts_by_year),
            works_api_url: row.works_api_url,
        }
    }
}
