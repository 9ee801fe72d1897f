//! HTTP adapters for the word and member catalogs.

use tracing::debug;

use type_core::item::{Member, Word};
pub use type_core::source::{MemberSource, SourceError, StaticCatalog, WordSource};

/// Catalog served by the game backend (`/api/words`, `/api/members`).
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub(crate) fn get_text(request: ureq::RequestBuilder<ureq::typestate::WithoutBody>) -> Result<String, SourceError> {
    request
        .call()
        .map_err(|e| SourceError::Http(e.to_string()))?
        .into_body()
        .read_to_string()
        .map_err(|e| SourceError::Http(e.to_string()))
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))
}

impl WordSource for HttpCatalog {
    fn fetch_words(&self, category: Option<&str>) -> Result<Vec<Word>, SourceError> {
        let url = self.url("/api/words");
        let mut request = ureq::get(&url);
        if let Some(category) = category {
            request = request.query("categoryId", category);
        }
        let body = get_text(request)?;
        let words: Vec<Word> = decode(&body)?;
        debug!(%url, count = words.len(), "fetched words");
        Ok(words)
    }
}

impl MemberSource for HttpCatalog {
    fn fetch_members(&self) -> Result<Vec<Member>, SourceError> {
        let url = self.url("/api/members");
        let body = get_text(ureq::get(&url))?;
        let members: Vec<Member> = decode(&body)?;
        debug!(%url, count = members.len(), "fetched members");
        Ok(members)
    }
}
