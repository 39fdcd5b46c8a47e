//! Display order for a product's offers.

use crate::catalog::models::OfferListing;
use std::cmp::Reverse;

/// Orders offers trust-first, then cheapest.
///
/// Authorised sellers always precede unauthorised ones regardless of price;
/// within each group offers go by ascending price. The sort is stable, so
/// equal (authorised, price) pairs keep their input order.
pub fn rank_offers(offers: &mut [OfferListing]) {
    offers.sort_by_key(|o| (Reverse(o.is_authorised), o.offer.price_inr));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::Offer;
    use chrono::Utc;

    fn listing(id: i64, authorised: bool, price: i64) -> OfferListing {
        OfferListing {
            offer: Offer {
                id,
                product_id: 1,
                seller_id: id,
                price_inr: price,
                warranty_type: "Brand warranty".to_string(),
                return_days: 7,
                product_url: format!("https://seller{}.test/p", id),
                last_checked_at: Utc::now(),
            },
            seller_name: format!("Seller {}", id),
            is_authorised: authorised,
            seller_score: 50,
        }
    }

    fn ids(offers: &[OfferListing]) -> Vec<i64> {
        offers.iter().map(|o| o.offer.id).collect()
    }

    #[test]
    fn test_trust_outranks_price() {
        let mut offers = vec![listing(1, false, 50_000), listing(2, true, 60_000)];
        rank_offers(&mut offers);
        assert_eq!(ids(&offers), vec![2, 1]);
    }

    #[test]
    fn test_cheapest_first_within_group() {
        let mut offers = vec![
            listing(1, true, 72_000),
            listing(2, false, 61_000),
            listing(3, true, 69_900),
            listing(4, false, 58_500),
        ];
        rank_offers(&mut offers);
        assert_eq!(ids(&offers), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut offers = vec![
            listing(5, true, 69_900),
            listing(3, true, 69_900),
            listing(9, true, 69_900),
        ];
        rank_offers(&mut offers);
        assert_eq!(ids(&offers), vec![5, 3, 9]);
    }

    #[test]
    fn test_empty() {
        let mut offers: Vec<OfferListing> = Vec::new();
        rank_offers(&mut offers);
        assert!(offers.is_empty());
    }
}
