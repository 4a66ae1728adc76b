//! Voter-list search.
//!
//! A search term typed in Latin script should find voters whose names are
//! stored in Malayalam, and the other way round. Each voter is indexed once
//! with lowercased raw and transliterated fields, then matched by substring
//! on every keystroke without touching the row-store.
//!
//! [`suggest_name_variants`] widens a term with model-suggested spellings.

mod variants;

pub use variants::{parse_variants, render_variants_prompt, suggest_name_variants};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::ScalarValue;
use crate::store::Row;
use crate::transliteration::transliterate_lowercase;

/// A voter-list entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Voter {
    pub id: Option<ScalarValue>,
    pub sl_no: Option<ScalarValue>,
    pub id_card_no: Option<String>,
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<ScalarValue>,
    pub house_name: Option<String>,
    pub house_no: Option<ScalarValue>,
    pub guardian_name: Option<String>,
    pub booth_id: Option<ScalarValue>,
    pub status: Option<String>,
}

impl Voter {
    /// Decode a row from the `voters` table; unknown columns are ignored.
    pub fn from_row(row: Row) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(row))?)
    }
}

/// Voters with their searchable text precomputed.
#[derive(Debug, Clone, Default)]
pub struct VoterIndex {
    entries: Vec<(Voter, Vec<String>)>,
}

impl VoterIndex {
    pub fn new(voters: Vec<Voter>) -> Self {
        let entries = voters
            .into_iter()
            .map(|voter| {
                let haystack = searchable_fields(&voter);
                (voter, haystack)
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Voters matching `term`, in index order. An empty term matches all.
    pub fn search(&self, term: &str) -> Vec<&Voter> {
        self.search_any(&[term])
    }

    /// Voters matching at least one of `terms`.
    pub fn search_any<S: AsRef<str>>(&self, terms: &[S]) -> Vec<&Voter> {
        let needles: Vec<String> = terms.iter().map(|t| t.as_ref().trim().to_lowercase()).collect();
        if needles.iter().any(String::is_empty) || needles.is_empty() {
            return self.entries.iter().map(|(voter, _)| voter).collect();
        }

        self.entries
            .iter()
            .filter(|(_, haystack)| {
                needles
                    .iter()
                    .any(|needle| haystack.iter().any(|field| field.contains(needle.as_str())))
            })
            .map(|(voter, _)| voter)
            .collect()
    }
}

/// Whether a single voter matches `term`.
pub fn matches(voter: &Voter, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    needle.is_empty() || searchable_fields(voter).iter().any(|f| f.contains(&needle))
}

fn searchable_fields(voter: &Voter) -> Vec<String> {
    let mut fields = Vec::with_capacity(8);

    let mut with_transliteration = |value: &str| {
        let raw = value.to_lowercase();
        let manglish = transliterate_lowercase(value);
        if manglish != raw {
            fields.push(manglish);
        }
        fields.push(raw);
    };

    with_transliteration(&voter.name);
    if let Some(house) = &voter.house_name {
        with_transliteration(house);
    }
    if let Some(guardian) = &voter.guardian_name {
        with_transliteration(guardian);
    }
    if let Some(card) = &voter.id_card_no {
        fields.push(card.to_lowercase());
    }
    if let Some(sl_no) = &voter.sl_no {
        fields.push(sl_no.to_string());
    }
    fields
}
