/// One match card from the live scores page.
///
/// `url` is absolute; relative card links are resolved against the client's
/// base URL while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCard {
    pub title: String,
    pub status: String,
    pub url: String,
}

impl MatchCard {
    pub fn new(
        title: impl Into<String>,
        status: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            status: status.into(),
            url: url.into(),
        }
    }
}

/// Series and match identifiers carried in a match URL slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchIds {
    pub series_id: u64,
    pub match_id: u64,
}
