use crate::config::RankingConfig;
use crate::listing::Listing;
use crate::normalize::{normalize_phrase, query_terms, tokenize};
use crate::scoring::{FieldIndex, TermMatches};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Priority bucket of a search result.
///
/// Variants are declared lowest first, so the derived `Ord` puts
/// higher-priority tiers above lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Description match only
    MinimalRelevance,
    /// Fixed-placement listing matched outside the tags, name included
    PremiumRelevant,
    /// At least one query term in the tags
    Relevant,
    /// Search-boosted with enough tag matches for the query length
    BoostedRelevant,
    /// Whole query found as a phrase in the tags
    ExactPhrase,
    /// Phrase match on a search-boosted listing
    ExactPhraseBoosted,
}

impl Tier {
    /// 1 for the highest tier, 6 for the lowest
    pub fn level(self) -> u8 {
        match self {
            Tier::ExactPhraseBoosted => 1,
            Tier::ExactPhrase => 2,
            Tier::BoostedRelevant => 3,
            Tier::Relevant => 4,
            Tier::PremiumRelevant => 5,
            Tier::MinimalRelevance => 6,
        }
    }
}

/// A query split into the forms the classifier and scorer need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Normalized full query, stop-words kept
    pub phrase: String,

    /// Distinct searchable terms
    pub terms: Vec<String>,
}

impl ParsedQuery {
    pub fn parse(raw: &str) -> Self {
        Self {
            phrase: normalize_phrase(raw),
            terms: query_terms(raw),
        }
    }

    /// No searchable terms: the caller should browse instead
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Tag matches needed before a search boost counts
    pub fn min_boosted_matches(&self) -> usize {
        if self.terms.len() <= 1 {
            1
        } else {
            2
        }
    }

    /// Whole-token phrase containment within the listing's tag text
    pub fn phrase_in_tags(&self, listing: &Listing) -> bool {
        if self.phrase.is_empty() {
            return false;
        }
        let tags = normalize_phrase(&listing.tag_text());
        format!(" {} ", tags).contains(&format!(" {} ", self.phrase))
    }
}

/// A listing with its relevance score and tier, valid for one ranking call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    pub listing: Listing,
    pub score: f64,
    pub tier: Tier,
}

/// Assign a tier, or `None` when the listing does not belong in the results.
///
/// `score > 0` stands for "some query term matched in a weighted field". A
/// match on the name alone only counts for fixed-placement listings.
pub fn classify(listing: &Listing, score: f64, query: &ParsedQuery) -> Option<Tier> {
    let name = tokenize(&listing.name);
    let tags = tokenize(&listing.tag_text());
    let description = tokenize(&listing.description);
    let count = |hit: &dyn Fn(&String) -> bool| query.terms.iter().filter(|t| hit(*t)).count();

    let matches = TermMatches {
        tags: count(&|t| tags.contains(t)),
        description: count(&|t| description.contains(t)),
        any: count(&|t| name.contains(t) || tags.contains(t) || description.contains(t)),
    };

    classify_with_matches(listing, score, query, matches)
}

fn classify_with_matches(
    listing: &Listing,
    score: f64,
    query: &ParsedQuery,
    matches: TermMatches,
) -> Option<Tier> {
    let sponsorship = listing.sponsorship;
    let relevant = score > 0.0;

    if query.phrase_in_tags(listing) {
        return Some(if sponsorship.search_boosted {
            Tier::ExactPhraseBoosted
        } else {
            Tier::ExactPhrase
        });
    }

    if sponsorship.search_boosted && matches.tags >= query.min_boosted_matches() {
        return Some(Tier::BoostedRelevant);
    }

    if matches.tags > 0 {
        return Some(Tier::Relevant);
    }

    if sponsorship.fixed_placement && relevant {
        return Some(Tier::PremiumRelevant);
    }

    if relevant && matches.description > 0 {
        return Some(Tier::MinimalRelevance);
    }

    None
}

/// Tier first, then score; both descending
pub fn compare(a: &ScoredListing, b: &ScoredListing) -> Ordering {
    b.tier
        .cmp(&a.tier)
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
}

/// Score, classify and order the candidates for a search query.
/// Listings without any tier are dropped; ties keep catalog order.
pub fn rank(
    candidates: &[Listing],
    query: &ParsedQuery,
    config: &RankingConfig,
) -> Vec<ScoredListing> {
    let index = FieldIndex::build(candidates);
    let scores = index.score_all(&query.terms, config);

    let mut ranked: Vec<ScoredListing> = scores
        .into_iter()
        .enumerate()
        .filter_map(|(i, score)| {
            let listing = index.listing(i);
            let matches = index.matches(i, &query.terms);
            classify_with_matches(listing, score, query, matches).map(|tier| ScoredListing {
                listing: listing.clone(),
                score,
                tier,
            })
        })
        .collect();

    ranked.sort_by(compare);
    ranked
}
