use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiVenue {
    pub query: String,         // the search string the scraper resolved
    pub resolved_name: String, // listing title as rendered on the page
    pub rating: Option<f32>,   // overall listing rating, null if unparsed
    pub review_count: Option<u32>,
    #[serde(default)]
    pub reviews: Vec<ApiReview>,
    #[serde(default)]
    pub truncated: bool, // scraper stopped before min(requested, available)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiReview {
    pub text: String,
    pub rating: Option<u8>, // stars parsed from the listing markup, null on failure
}
