use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::app::{FetchError, MutationError, Result};
use crate::domain::{Entry, EntryPage, EntryStatus, Scope};
use crate::remote::{CounterSource, EntryMutations, EntrySource, FeedUnread};

const AUTH_HEADER: &str = "X-Auth-Token";

/// Miniflux v1 REST API client.
pub struct MinifluxClient {
    client: Client,
    base: Url,
    token: String,
}

#[derive(Deserialize)]
struct Me {
    id: i64,
}

#[derive(Deserialize)]
struct FeedListing {
    id: i64,
    category: CategoryListing,
}

#[derive(Deserialize)]
struct CategoryListing {
    id: i64,
}

#[derive(Deserialize)]
struct Counters {
    #[serde(default)]
    unreads: HashMap<String, u64>,
}

impl MinifluxClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("tributary/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::from)?;

        Ok(Self {
            client,
            base,
            token: token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, url::ParseError> {
        self.base.join(path)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTH_HEADER, self.token.as_str())
    }

    fn entries_path(scope: &Scope) -> String {
        match scope {
            Scope::All => "v1/entries".to_string(),
            Scope::Feed(id) => format!("v1/feeds/{}/entries", id),
            Scope::Group(id) => format!("v1/categories/{}/entries", id),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
    ) -> std::result::Result<T, FetchError> {
        let response = self.request(Method::GET, url.clone()).send().await?;
        let response = check_fetch(response, &url)?;
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn put(
        &self,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> std::result::Result<bool, MutationError> {
        let mut request = self.request(Method::PUT, url.clone());
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(true)
        } else {
            Err(MutationError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            })
        }
    }

    async fn set_status(
        &self,
        entry_id: i64,
        status: EntryStatus,
    ) -> std::result::Result<bool, MutationError> {
        let url = self
            .endpoint("v1/entries")
            .map_err(|e| MutationError::Other(e.to_string()))?;
        let body = json!({ "entry_ids": [entry_id], "status": status.as_str() });
        self.put(url, Some(body)).await
    }
}

fn check_fetch(response: Response, url: &Url) -> std::result::Result<Response, FetchError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl EntrySource for MinifluxClient {
    async fn fetch_entries(
        &self,
        scope: &Scope,
        offset: u64,
        limit: u64,
    ) -> std::result::Result<EntryPage, FetchError> {
        let mut url = self
            .endpoint(&Self::entries_path(scope))
            .map_err(|e| FetchError::Other(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("order", "published_at")
            .append_pair("direction", "desc")
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        tracing::debug!("GET {}", url);
        self.get_json(url).await
    }
}

#[async_trait]
impl EntryMutations for MinifluxClient {
    async fn update_entry_status(&self, entry: &Entry) -> std::result::Result<bool, MutationError> {
        self.set_status(entry.id, entry.status.toggled()).await
    }

    async fn update_entry_starred(&self, entry: &Entry) -> std::result::Result<bool, MutationError> {
        let url = self
            .endpoint(&format!("v1/entries/{}/bookmark", entry.id))
            .map_err(|e| MutationError::Other(e.to_string()))?;
        self.put(url, None).await
    }

    async fn record_entry_opened(&self, entry: &Entry) -> std::result::Result<bool, MutationError> {
        self.set_status(entry.id, EntryStatus::Read).await
    }

    async fn mark_all_read(&self, scope: &Scope) -> std::result::Result<bool, MutationError> {
        let path = match scope {
            Scope::All => {
                let me_url = self
                    .endpoint("v1/me")
                    .map_err(|e| MutationError::Other(e.to_string()))?;
                let me: Me = self
                    .get_json(me_url)
                    .await
                    .map_err(|e| MutationError::Other(e.to_string()))?;
                format!("v1/users/{}/mark-all-as-read", me.id)
            }
            Scope::Feed(id) => format!("v1/feeds/{}/mark-all-as-read", id),
            Scope::Group(id) => format!("v1/categories/{}/mark-all-as-read", id),
        };
        let url = self
            .endpoint(&path)
            .map_err(|e| MutationError::Other(e.to_string()))?;
        self.put(url, None).await
    }
}

#[async_trait]
impl CounterSource for MinifluxClient {
    async fn fetch_unread_counts(&self) -> std::result::Result<Vec<FeedUnread>, FetchError> {
        let feeds_url = self
            .endpoint("v1/feeds")
            .map_err(|e| FetchError::Other(e.to_string()))?;
        let counters_url = self
            .endpoint("v1/feeds/counters")
            .map_err(|e| FetchError::Other(e.to_string()))?;

        let (feeds, counters) = futures::try_join!(
            self.get_json::<Vec<FeedListing>>(feeds_url),
            self.get_json::<Counters>(counters_url),
        )?;

        Ok(merge_counts(&feeds, &counters))
    }
}

fn merge_counts(feeds: &[FeedListing], counters: &Counters) -> Vec<FeedUnread> {
    feeds
        .iter()
        .map(|feed| FeedUnread {
            feed_id: feed.id,
            group_id: feed.category.id,
            unread: counters
                .unreads
                .get(&feed.id.to_string())
                .copied()
                .unwrap_or(0),
        })
        .collect()
}
