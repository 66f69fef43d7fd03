//! Field-weighted BM25+ relevance over the candidate set being ranked.
//!
//! Statistics (document frequency, average field length) come from the
//! candidates of the current call, not from a global corpus: the catalog is
//! small and fully resident, so every request sees a consistent snapshot.

use crate::config::{Bm25Params, FieldWeights, RankingConfig};
use crate::listing::Listing;
use crate::normalize::tokenize;
use std::collections::HashMap;

/// Scored text fields of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Tags,
    Description,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Tags, Field::Description];

    fn index(self) -> usize {
        match self {
            Field::Name => 0,
            Field::Tags => 1,
            Field::Description => 2,
        }
    }

    pub fn weight(self, weights: &FieldWeights) -> f64 {
        match self {
            Field::Name => weights.name,
            Field::Tags => weights.tags,
            Field::Description => weights.description,
        }
    }

    fn tokens(self, listing: &Listing) -> Vec<String> {
        match self {
            Field::Name => tokenize(&listing.name),
            Field::Tags => tokenize(&listing.tag_text()),
            Field::Description => tokenize(&listing.description),
        }
    }
}

/// Term frequencies of one field of one listing
#[derive(Debug, Clone, Default)]
struct FieldBag {
    freqs: HashMap<String, u32>,
    len: usize,
}

impl FieldBag {
    fn from_tokens(tokens: Vec<String>) -> Self {
        let len = tokens.len();
        let mut freqs = HashMap::with_capacity(len);
        for token in tokens {
            *freqs.entry(token).or_insert(0) += 1;
        }
        Self { freqs, len }
    }

    fn tf(&self, term: &str) -> u32 {
        self.freqs.get(term).copied().unwrap_or(0)
    }
}

/// Number of distinct query terms found in a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermMatches {
    /// Terms present in the tags field
    pub tags: usize,

    /// Terms present in the description
    pub description: usize,

    /// Terms present in at least one field
    pub any: usize,
}

struct AnalyzedListing<'a> {
    listing: &'a Listing,
    fields: [FieldBag; 3],
}

impl AnalyzedListing<'_> {
    fn field(&self, field: Field) -> &FieldBag {
        &self.fields[field.index()]
    }
}

/// Tokenized candidates plus the per-field statistics BM25 needs.
/// Built once per ranking call.
pub struct FieldIndex<'a> {
    docs: Vec<AnalyzedListing<'a>>,
    avgdl: [f64; 3],
}

impl<'a> FieldIndex<'a> {
    pub fn build(candidates: &'a [Listing]) -> Self {
        let docs: Vec<AnalyzedListing<'a>> = candidates
            .iter()
            .map(|listing| AnalyzedListing {
                listing,
                fields: Field::ALL.map(|f| FieldBag::from_tokens(f.tokens(listing))),
            })
            .collect();

        let mut avgdl = [1.0; 3];
        if !docs.is_empty() {
            for field in Field::ALL {
                let total: usize = docs.iter().map(|d| d.field(field).len).sum();
                // floor at 1 so empty fields never divide by zero
                avgdl[field.index()] = (total as f64 / docs.len() as f64).max(1.0);
            }
        }

        Self { docs, avgdl }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn listing(&self, i: usize) -> &'a Listing {
        self.docs[i].listing
    }

    pub fn avgdl(&self, field: Field) -> f64 {
        self.avgdl[field.index()]
    }

    /// Candidates whose field contains the term as a whole token
    pub fn doc_freq(&self, field: Field, term: &str) -> usize {
        self.docs
            .iter()
            .filter(|d| d.field(field).tf(term) > 0)
            .count()
    }

    pub fn matches(&self, i: usize, terms: &[String]) -> TermMatches {
        let doc = &self.docs[i];
        let in_field = |field: Field| {
            terms
                .iter()
                .filter(|t| doc.field(field).tf(t) > 0)
                .count()
        };
        let any = terms
            .iter()
            .filter(|t| Field::ALL.iter().any(|f| doc.field(*f).tf(t) > 0))
            .count();
        TermMatches {
            tags: in_field(Field::Tags),
            description: in_field(Field::Description),
            any,
        }
    }

    /// Weighted BM25+ score of every candidate, in candidate order
    pub fn score_all(&self, terms: &[String], config: &RankingConfig) -> Vec<f64> {
        let n = self.docs.len() as f64;

        let doc_freqs: Vec<[f64; 3]> = terms
            .iter()
            .map(|t| Field::ALL.map(|f| self.doc_freq(f, t) as f64))
            .collect();

        self.docs
            .iter()
            .map(|doc| {
                let mut total = 0.0;
                for field in Field::ALL {
                    let bag = doc.field(field);
                    let field_score: f64 = terms
                        .iter()
                        .zip(&doc_freqs)
                        .map(|(term, df)| {
                            bm25_term(
                                bag.tf(term) as f64,
                                bag.len as f64,
                                self.avgdl(field),
                                df[field.index()],
                                n,
                                &config.bm25,
                            )
                        })
                        .sum();
                    total += field.weight(&config.weights) * field_score;
                }
                if total.is_finite() {
                    total
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// BM25+ contribution of one term in one field. Zero when the term is absent.
pub fn bm25_term(tf: f64, dl: f64, avgdl: f64, df: f64, n: f64, params: &Bm25Params) -> f64 {
    if tf <= 0.0 || n <= 0.0 {
        return 0.0;
    }

    let avgdl = avgdl.max(1.0);
    let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
    let tf_norm = tf * (params.k1 + 1.0)
        / (tf + params.k1 * (1.0 - params.b + params.b * (dl / avgdl)));
    let score = idf * (tf_norm + params.delta);

    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Relevance score per listing id
pub fn score(
    candidates: &[Listing],
    query_terms: &[String],
    config: &RankingConfig,
) -> HashMap<String, f64> {
    let index = FieldIndex::build(candidates);
    index
        .score_all(query_terms, config)
        .into_iter()
        .enumerate()
        .map(|(i, s)| (index.listing(i).id.clone(), s))
        .collect()
}
