use crate::config::RankingConfig;
use crate::listing::Listing;
use rand::seq::SliceRandom;
use rand::Rng;

/// Browse-mode ordering split into its three sections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseOrder {
    /// Fixed-placement listings, most engaged first
    pub fixed: Vec<Listing>,

    /// Top engaged non-fixed listings, in rotated order
    pub featured: Vec<Listing>,

    /// Everything else, shuffled
    pub remainder: Vec<Listing>,
}

impl BrowseOrder {
    pub fn len(&self) -> usize {
        self.fixed.len() + self.featured.len() + self.remainder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_ordered(self) -> Vec<Listing> {
        let mut ordered = self.fixed;
        ordered.extend(self.featured);
        ordered.extend(self.remainder);
        ordered
    }
}

/// Order listings for the no-query feed.
///
/// Only reorders: the output holds exactly the input listings. Randomness comes
/// from `rng`, so a seeded generator reproduces the same order.
pub fn compose_browse_order<R: Rng + ?Sized>(
    listings: &[Listing],
    config: &RankingConfig,
    rng: &mut R,
) -> BrowseOrder {
    let (mut fixed, rest): (Vec<Listing>, Vec<Listing>) = listings
        .iter()
        .cloned()
        .partition(|l| l.sponsorship.fixed_placement);

    // stable: equal counts keep catalog order
    fixed.sort_by(|a, b| b.engagement_count.cmp(&a.engagement_count));

    let (mut engaged, idle): (Vec<Listing>, Vec<Listing>) =
        rest.into_iter().partition(|l| l.engagement_count > 0);
    engaged.sort_by(|a, b| b.engagement_count.cmp(&a.engagement_count));

    let window = config.featured_window_size.min(engaged.len());
    let mut remainder = engaged.split_off(window);
    let mut featured = engaged;

    featured.shuffle(rng);

    remainder.extend(idle);
    remainder.shuffle(rng);

    BrowseOrder {
        fixed,
        featured,
        remainder,
    }
}
