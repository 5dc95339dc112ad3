use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::ApiVenue;
use crate::models::{RawReview, VenueMeta};

/// Try to fetch one venue's reviews from the scraping service; return
/// Ok(None) on 404 (the service could not resolve the venue name).
pub async fn fetch_venue_reviews_opt(
    client: &Client,
    api_base: &str,
    venue: &str,
    desired: u32,
) -> Result<Option<(VenueMeta, Vec<RawReview>)>> {
    let url = format!("{}/reviews", api_base.trim_end_matches('/'));
    let start = std::time::Instant::now();

    debug!("Fetching reviews - venue={}, desired={}", venue, desired);

    let resp = client
        .get(&url)
        .query(&[("venue", venue), ("limit", &desired.to_string())])
        .send()
        .await
        .with_context(|| format!("Request failed for {}", url))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        warn!("Venue not found (404) - {}", venue);
        return Ok(None);
    }

    let resp = resp
        .error_for_status()
        .with_context(|| format!("HTTP error for {}", url))?;

    let api: ApiVenue = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {}", url))?;

    let truncated = api.truncated;
    let (meta, reviews) = map_api_venue(api);

    // The scraper must not silently deliver less than min(desired, available).
    let available = meta.review_count.unwrap_or(desired);
    let expected = desired.min(available) as usize;
    if truncated || reviews.len() < expected {
        warn!(
            "Short delivery from scraper - venue={}, delivered={}, expected={}, truncated={}",
            meta.name,
            reviews.len(),
            expected,
            truncated
        );
    }

    let elapsed = start.elapsed();
    info!(
        "Review fetch completed - venue={}, duration={:.2}s, reviews={}",
        meta.name,
        elapsed.as_secs_f32(),
        reviews.len()
    );

    Ok(Some((meta, reviews)))
}

/// Map the wire shape into domain records. Blank review bodies are dropped
/// (the scraper emits them for photo-only reviews); out-of-range star values
/// degrade to None rather than dropping the review.
pub fn map_api_venue(api: ApiVenue) -> (VenueMeta, Vec<RawReview>) {
    let meta = VenueMeta {
        name: api.resolved_name.trim().to_string(),
        rating: api.rating,
        review_count: api.review_count,
    };

    let reviews = api
        .reviews
        .into_iter()
        .filter(|r| !r.text.trim().is_empty())
        .map(|r| RawReview {
            text: r.text.trim().to_string(),
            rating: r.rating.filter(|s| (1..=5).contains(s)),
        })
        .collect();

    (meta, reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_types::ApiReview;

    fn api_venue(reviews: Vec<ApiReview>) -> ApiVenue {
        ApiVenue {
            query: "麥當勞".to_string(),
            resolved_name: " 麥當勞 台北館前店 ".to_string(),
            rating: Some(3.8),
            review_count: Some(1200),
            reviews,
            truncated: false,
        }
    }

    #[test]
    fn maps_wire_reviews_to_domain() {
        let api = api_venue(vec![
            ApiReview {
                text: "  餐點好吃  ".to_string(),
                rating: Some(5),
            },
            ApiReview {
                text: "服務很慢".to_string(),
                rating: None,
            },
        ]);

        let (meta, reviews) = map_api_venue(api);
        assert_eq!(meta.name, "麥當勞 台北館前店");
        assert_eq!(meta.rating, Some(3.8));
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].text, "餐點好吃");
        assert_eq!(reviews[0].rating, Some(5));
        assert_eq!(reviews[1].rating, None);
    }

    #[test]
    fn drops_blank_bodies_keeps_unparsed_stars() {
        let api = api_venue(vec![
            ApiReview {
                text: "   ".to_string(),
                rating: Some(4),
            },
            ApiReview {
                text: "普通".to_string(),
                rating: Some(9), // out of range, degrade to None
            },
        ]);

        let (_, reviews) = map_api_venue(api);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].text, "普通");
        assert_eq!(reviews[0].rating, None);
    }
}
