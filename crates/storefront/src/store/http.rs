//! REST Record Store client.
//!
//! Wire format:
//!
//! ```text
//! GET   {base}/collections/{name}/records?filter=<json>&sort=<field>&limit=<n>  -> {"items": [...]}
//! GET   {base}/collections/{name}/records/{id}                                  -> record | 404
//! POST  {base}/collections/{name}/records                                       -> created record
//! PATCH {base}/collections/{name}/records/{id}                                  -> updated record
//! ```
//!
//! Every request carries `Authorization: Bearer <api key>`. Reads are cached
//! with `moka`; any write drops the cached entries of its collection.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use toyshop_core::{Collection, Fields, Record, RecordId};
use url::Url;

use super::cache::{CacheKey, CacheKind, CacheValue};
use super::{ListQuery, RecordPage, RecordStore, StoreError};
use crate::config::HttpStoreConfig;

/// Maximum number of cached responses.
const CACHE_CAPACITY: u64 = 1000;

/// Client for the remote Record Store.
#[derive(Clone)]
pub struct HttpRecordStore {
    inner: Arc<HttpRecordStoreInner>,
}

struct HttpRecordStoreInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpRecordStore {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &HttpStoreConfig) -> Result<Self, StoreError> {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .support_invalidation_closures()
            .build();

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpRecordStoreInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                cache,
            }),
        })
    }

    /// `{base}/collections/{name}/records[/{id}]`
    fn records_url(&self, collection: Collection, id: Option<&RecordId>) -> Result<Url, StoreError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = format!("{base}/collections/{}/records", collection.as_str());
        if let Some(id) = id {
            url.push('/');
            url.push_str(&urlencoding::encode(id.as_str()));
        }
        Ok(Url::parse(&url)?)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.inner.api_key.expose_secret())
    }

    /// Send a request and decode a JSON body, mapping non-success statuses.
    async fn send<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, Option<T>), StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok((status, None));
        }

        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Record store returned non-success status"
            );
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok((status, Some(value))),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse record store response"
                );
                Err(StoreError::Parse(e))
            }
        }
    }

    /// Drop every cached read of `collection`.
    async fn invalidate_collection(&self, collection: Collection) {
        if let Err(e) = self
            .inner
            .cache
            .invalidate_entries_if(move |key, _| key.collection == collection)
        {
            tracing::warn!(error = %e, %collection, "Falling back to full cache invalidation");
            self.inner.cache.invalidate_all();
        }
        self.inner.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    #[instrument(skip(self, query))]
    async fn get_all(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<RecordPage, StoreError> {
        let cache_key = CacheKey {
            collection,
            kind: CacheKind::List(query.cache_key()),
        };
        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for record list");
            return Ok(page);
        }

        let mut url = self.records_url(collection, None)?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.filters.is_empty() {
                pairs.append_pair("filter", &serde_json::to_string(&query.filters)?);
            }
            if let Some(sort) = &query.sort {
                pairs.append_pair("sort", sort);
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }

        let (status, page) = Self::send::<RecordPage>(self.request(reqwest::Method::GET, url)).await?;
        let page = page.ok_or(StoreError::Status {
            status: status.as_u16(),
            body: format!("collection {collection} not found"),
        })?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Page(page.clone()))
            .await;
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> Result<Option<Record>, StoreError> {
        let cache_key = CacheKey {
            collection,
            kind: CacheKind::Record(id.clone()),
        };
        if let Some(CacheValue::Record(record)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for record");
            return Ok(record.map(|r| *r));
        }

        let url = self.records_url(collection, Some(id))?;
        let (_, record) = Self::send::<Record>(self.request(reqwest::Method::GET, url)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Record(record.clone().map(Box::new)))
            .await;
        Ok(record)
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, StoreError> {
        let url = self.records_url(collection, None)?;
        let request = self.request(reqwest::Method::POST, url).json(&fields);
        let (status, record) = Self::send::<Record>(request).await?;
        self.invalidate_collection(collection).await;

        record.ok_or(StoreError::Status {
            status: status.as_u16(),
            body: format!("collection {collection} not found"),
        })
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        let url = self.records_url(collection, Some(id))?;
        let request = self.request(reqwest::Method::PATCH, url).json(&fields);
        let (_, record) = Self::send::<Record>(request).await?;
        self.invalidate_collection(collection).await;

        record.ok_or_else(|| StoreError::NotFound {
            collection,
            id: id.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const API_KEY: &str = "k9$Tq2!vB7@xZ4#mW8";

    fn store(server: &MockServer) -> HttpRecordStore {
        HttpRecordStore::new(&HttpStoreConfig {
            base_url: Url::parse(&format!("{}/api/", server.uri())).unwrap(),
            api_key: SecretString::from(API_KEY),
            cache_ttl: Duration::from_secs(300),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_all_sends_query_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/toycategories/records"))
            .and(query_param("filter", r#"{"active":true}"#))
            .and(query_param("sort", "display_order"))
            .and(query_param("limit", "10"))
            .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "c1", "name": "Dolls", "display_order": 1}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store(&server);
        let query = ListQuery::new()
            .filter("active", true)
            .sort("display_order")
            .limit(10);
        let page = store.get_all(Collection::ToyCategories, &query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].text("name"), Some("Dolls"));

        // Second call is served from cache; `expect(1)` verifies on drop.
        let again = store.get_all(Collection::ToyCategories, &query).await.unwrap();
        assert_eq!(again, page);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/toys/records/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let record = store(&server)
            .get_by_id(Collection::Toys, &RecordId::new("missing"))
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/toys/records"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = store(&server)
            .get_all(Collection::Toys, &ListQuery::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_create_posts_fields_and_invalidates_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/collections/toys/records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/collections/toys/records"))
            .and(body_json(json!({"name": "Kite", "color": "Red"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": "new-1", "name": "Kite", "color": "Red"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store(&server);
        store.get_all(Collection::Toys, &ListQuery::new()).await.unwrap();

        let mut fields = Fields::new();
        fields.insert("name".into(), json!("Kite"));
        fields.insert("color".into(), json!("Red"));
        let created = store.create(Collection::Toys, fields).await.unwrap();
        assert_eq!(created.id.as_str(), "new-1");

        // Cache was dropped, so this hits the server again.
        store.get_all(Collection::Toys, &ListQuery::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/collections/toys/records/t404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = store(&server)
            .update(Collection::Toys, &RecordId::new("t404"), Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
