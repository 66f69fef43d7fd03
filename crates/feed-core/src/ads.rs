use crate::config::RankingConfig;
use crate::feed::{FeedEntry, FeedItem};

pub const FIRST_AD_KEY: &str = "ad-first";

/// Number of listings shown before the first ad
pub fn first_ad_position(sponsored_fixed_count: usize, config: &RankingConfig) -> usize {
    let position = if sponsored_fixed_count > 1 {
        sponsored_fixed_count
    } else {
        sponsored_fixed_count + config.featured_window_size
    };
    // an ad never opens the feed
    position.max(1)
}

/// Listing counts above each ad slot, for a feed of `len` listings.
/// A slot is only emitted when at least one listing follows it.
pub fn ad_positions(len: usize, first: usize, cadence: usize) -> Vec<usize> {
    let first = first.max(1);
    if first >= len {
        return Vec::new();
    }
    if cadence == 0 {
        return vec![first];
    }
    (first..len).step_by(cadence).collect()
}

/// Insert ad placeholders into an ordered listing sequence
pub fn interleave_ads(
    ordered: Vec<FeedItem>,
    sponsored_fixed_count: usize,
    config: &RankingConfig,
) -> Vec<FeedEntry> {
    let first = first_ad_position(sponsored_fixed_count, config);
    let positions = ad_positions(ordered.len(), first, config.ad_cadence);

    let mut entries = Vec::with_capacity(ordered.len() + positions.len());
    let mut next_ad = positions.iter().peekable();

    for (shown, item) in ordered.into_iter().enumerate() {
        if next_ad.peek() == Some(&&shown) {
            next_ad.next();
            let key = if shown == first {
                FIRST_AD_KEY.to_string()
            } else {
                format!("ad-{}", shown)
            };
            entries.push(FeedEntry::AdSlot { key });
        }
        entries.push(FeedEntry::Listing(item));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Listing;

    fn items(n: usize) -> Vec<FeedItem> {
        (0..n)
            .map(|i| FeedItem::browse(Listing::new(format!("l{}", i), "L"), false))
            .collect()
    }

    fn config(featured: usize, cadence: usize) -> RankingConfig {
        RankingConfig {
            featured_window_size: featured,
            ad_cadence: cadence,
            ..RankingConfig::default()
        }
    }

    fn ad_indices(entries: &[FeedEntry]) -> Vec<usize> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_ad())
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_first_ad_position() {
        let config = config(3, 5);
        assert_eq!(first_ad_position(0, &config), 3);
        assert_eq!(first_ad_position(1, &config), 4);
        assert_eq!(first_ad_position(2, &config), 2);
        assert_eq!(first_ad_position(5, &config), 5);
    }

    #[test]
    fn test_first_ad_position_never_zero() {
        assert_eq!(first_ad_position(0, &config(0, 5)), 1);
    }

    #[test]
    fn test_ad_positions() {
        assert_eq!(ad_positions(12, 3, 5), vec![3, 8]);
        assert_eq!(ad_positions(13, 3, 5), vec![3, 8]);
        assert_eq!(ad_positions(14, 3, 5), vec![3, 8, 13]);
        assert_eq!(ad_positions(3, 3, 5), Vec::<usize>::new());
        assert_eq!(ad_positions(2, 3, 5), Vec::<usize>::new());
        assert_eq!(ad_positions(10, 3, 0), vec![3]);
    }

    #[test]
    fn test_twelve_listings_cadence_five() {
        let entries = interleave_ads(items(12), 0, &config(3, 5));

        assert_eq!(entries.len(), 14);
        assert_eq!(ad_indices(&entries), vec![3, 9]);
        assert!(!entries.last().unwrap().is_ad());
    }

    #[test]
    fn test_ad_keys() {
        let entries = interleave_ads(items(12), 0, &config(3, 5));
        let keys: Vec<&str> = entries
            .iter()
            .filter_map(|e| match e {
                FeedEntry::AdSlot { key } => Some(key.as_str()),
                FeedEntry::Listing(_) => None,
            })
            .collect();
        assert_eq!(keys, vec!["ad-first", "ad-8"]);
    }

    #[test]
    fn test_short_list_has_no_ads() {
        let entries = interleave_ads(items(2), 0, &config(3, 5));
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.is_ad()));

        // exactly `first` listings: nothing below the slot
        let entries = interleave_ads(items(3), 0, &config(3, 5));
        assert!(entries.iter().all(|e| !e.is_ad()));
    }

    #[test]
    fn test_empty_feed() {
        assert!(interleave_ads(Vec::new(), 0, &config(3, 5)).is_empty());
    }

    #[test]
    fn test_boundary_invariants_over_grid() {
        for len in 0..40 {
            for fixed in 0..5 {
                for featured in 0..5 {
                    for cadence in 1..6 {
                        let entries = interleave_ads(items(len), fixed, &config(featured, cadence));
                        assert_eq!(entries.iter().filter(|e| !e.is_ad()).count(), len);
                        if let Some(first) = entries.first() {
                            assert!(!first.is_ad());
                        }
                        if let Some(last) = entries.last() {
                            assert!(!last.is_ad());
                        }
                        for pair in entries.windows(2) {
                            assert!(!(pair[0].is_ad() && pair[1].is_ad()));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_listing_order_preserved() {
        let entries = interleave_ads(items(20), 2, &config(3, 4));
        let ids: Vec<String> = entries
            .iter()
            .filter_map(FeedEntry::as_item)
            .map(|item| item.listing.id.clone())
            .collect();
        let expected: Vec<String> = (0..20).map(|i| format!("l{}", i)).collect();
        assert_eq!(ids, expected);
    }
}
