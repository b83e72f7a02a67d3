//! Meilisearch implementation of [`SearchEngine`].

use async_trait::async_trait;
use repertoire_core::error::DomainError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::domain::documents::{DocumentId, DocumentUpdate, SearchDocument};
use crate::domain::filter::DocumentFilter;
use crate::engine::{SearchEngine, SearchQuery, SearchResults, TaskUid};

/// Page size used when draining `documents/fetch`.
const FETCH_PAGE_SIZE: usize = 1000;

/// Connection settings for a Meilisearch index.
#[derive(Debug, Clone)]
pub struct MeilisearchConfig {
    /// Base URL, e.g. `http://localhost:7700`.
    pub url: String,
    /// API key sent as a bearer token.
    pub api_key: Option<String>,
    /// Uid of the shared index.
    pub index: String,
}

/// HTTP client for one Meilisearch index.
#[derive(Debug, Clone)]
pub struct MeilisearchClient {
    client: Client,
    config: MeilisearchConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnqueuedTask {
    task_uid: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    hits: Vec<SearchDocument>,
    #[serde(default)]
    estimated_total_hits: u64,
}

#[derive(Deserialize)]
struct FetchResponse {
    results: Vec<SearchDocument>,
    total: usize,
}

impl MeilisearchClient {
    /// Creates a client for the configured index.
    #[must_use]
    pub fn new(client: Client, config: MeilisearchConfig) -> Self {
        Self { client, config }
    }

    fn index_url(&self, path: &str) -> String {
        format!(
            "{}/indexes/{}{path}",
            self.config.url.trim_end_matches('/'),
            self.config.index
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("search engine unreachable: {e}")))
    }

    async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Infrastructure(format!(
                "search engine returned {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| DomainError::Serialization(format!("search engine response: {e}")))
    }

    async fn enqueue(&self, request: RequestBuilder) -> Result<TaskUid, DomainError> {
        let task: EnqueuedTask = Self::expect_json(self.send(request).await?).await?;
        Ok(TaskUid(task.task_uid))
    }

    /// Declares the attributes the pipeline filters and sorts on.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the engine rejects the
    /// settings update.
    pub async fn ensure_index_settings(&self) -> Result<TaskUid, DomainError> {
        let body = json!({
            "filterableAttributes": ["userId", "type", "artist.id", "album.id"],
            "sortableAttributes": ["createdAt", "updatedAt", "name", "title"],
        });
        self.enqueue(self.client.patch(self.index_url("/settings")).json(&body))
            .await
    }
}

#[async_trait]
impl SearchEngine for MeilisearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, DomainError> {
        let mut body = json!({
            "q": query.query,
            "filter": query.filter_expression(),
        });
        if !query.sort.is_empty() {
            body["sort"] = json!(query.sort);
        }
        if let Some((offset, limit)) = query.offset_limit() {
            body["offset"] = json!(offset);
            body["limit"] = json!(limit);
        }

        let response: SearchResponse = Self::expect_json(
            self.send(self.client.post(self.index_url("/search")).json(&body))
                .await?,
        )
        .await?;

        Ok(SearchResults {
            hits: response.hits,
            total_count: response.estimated_total_hits,
        })
    }

    async fn add(&self, documents: &[SearchDocument]) -> Result<TaskUid, DomainError> {
        let request = self
            .client
            .post(self.index_url("/documents"))
            .query(&[("primaryKey", "id")])
            .json(documents);
        let task = self.enqueue(request).await?;
        debug!(task_uid = %task, count = documents.len(), "enqueued document add");
        Ok(task)
    }

    async fn update(&self, documents: &[DocumentUpdate]) -> Result<TaskUid, DomainError> {
        let body = documents
            .iter()
            .map(DocumentUpdate::to_index_json)
            .collect::<Result<Vec<_>, _>>()?;
        let task = self
            .enqueue(self.client.put(self.index_url("/documents")).json(&body))
            .await?;
        debug!(task_uid = %task, count = documents.len(), "enqueued document update");
        Ok(task)
    }

    async fn delete(&self, ids: &[DocumentId]) -> Result<TaskUid, DomainError> {
        let task = self
            .enqueue(
                self.client
                    .post(self.index_url("/documents/delete-batch"))
                    .json(ids),
            )
            .await?;
        debug!(task_uid = %task, count = ids.len(), "enqueued document delete");
        Ok(task)
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<SearchDocument>, DomainError> {
        let response = self
            .send(self.client.get(self.index_url(&format!("/documents/{id}"))))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::expect_json(response).await.map(Some)
    }

    async fn get_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<SearchDocument>, DomainError> {
        let expression = filter.to_expression();
        let mut documents = Vec::new();
        loop {
            let body = json!({
                "filter": expression,
                "offset": documents.len(),
                "limit": FETCH_PAGE_SIZE,
            });
            let page: FetchResponse = Self::expect_json(
                self.send(
                    self.client
                        .post(self.index_url("/documents/fetch"))
                        .json(&body),
                )
                .await?,
            )
            .await?;

            let received = page.results.len();
            documents.extend(page.results);
            if received == 0 || documents.len() >= page.total {
                return Ok(documents);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::documents::{ArtistSearch, DocumentType};
    use crate::domain::filter::ParentRef;

    fn client_for(server: &MockServer) -> MeilisearchClient {
        MeilisearchClient::new(
            Client::new(),
            MeilisearchConfig {
                url: server.uri(),
                api_key: Some("master-key".to_owned()),
                index: "search".to_owned(),
            },
        )
    }

    fn artist_doc(user_id: Uuid) -> SearchDocument {
        SearchDocument::Artist(ArtistSearch {
            id: DocumentId::new(DocumentType::Artist, Uuid::new_v4()),
            user_id,
            name: "Muse".to_owned(),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    fn enqueued(task_uid: i64) -> ResponseTemplate {
        ResponseTemplate::new(202).set_body_json(json!({
            "taskUid": task_uid,
            "indexUid": "search",
            "status": "enqueued",
            "type": "documentAdditionOrUpdate",
            "enqueuedAt": "2026-01-15T10:00:00Z"
        }))
    }

    #[tokio::test]
    async fn test_add_posts_documents_and_returns_task_uid() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/search/documents"))
            .and(query_param("primaryKey", "id"))
            .and(header("Authorization", "Bearer master-key"))
            .respond_with(enqueued(17))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);

        // Act
        let task = client.add(&[artist_doc(Uuid::new_v4())]).await.unwrap();

        // Assert
        assert_eq!(task, TaskUid(17));
    }

    #[tokio::test]
    async fn test_delete_posts_prefixed_ids() {
        let server = MockServer::start().await;
        let id = DocumentId::new(DocumentType::Song, Uuid::new_v4());
        Mock::given(method("POST"))
            .and(path("/indexes/search/documents/delete-batch"))
            .and(body_json(json!([id.to_string()])))
            .respond_with(enqueued(3))
            .expect(1)
            .mount(&server)
            .await;

        let task = client_for(&server).delete(&[id]).await.unwrap();

        assert_eq!(task, TaskUid(3));
    }

    #[tokio::test]
    async fn test_search_sends_scoped_filter_and_pagination() {
        // Arrange
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let mut query = SearchQuery::new("muse", user_id);
        query.page = Some(2);
        query.page_size = Some(10);
        Mock::given(method("POST"))
            .and(path("/indexes/search/search"))
            .and(body_json(json!({
                "q": "muse",
                "filter": format!("userId = \"{user_id}\""),
                "offset": 10,
                "limit": 10,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": [artist_doc(user_id)],
                "estimatedTotalHits": 11,
                "query": "muse",
                "offset": 10,
                "limit": 10
            })))
            .mount(&server)
            .await;

        // Act
        let results = client_for(&server).search(&query).await.unwrap();

        // Assert
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.total_count, 11);
    }

    #[tokio::test]
    async fn test_get_document_maps_404_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "document_not_found"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .get_document(&DocumentId::new(DocumentType::Album, Uuid::new_v4()))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_documents_pages_until_total() {
        // Arrange
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let filter = DocumentFilter::ReferencesParent {
            doc_type: DocumentType::Album,
            parent: ParentRef::Artist,
            parent_ids: vec![Uuid::new_v4()],
        };
        let first_page: Vec<SearchDocument> =
            (0..FETCH_PAGE_SIZE).map(|_| artist_doc(user_id)).collect();
        Mock::given(method("POST"))
            .and(path("/indexes/search/documents/fetch"))
            .and(body_json(json!({
                "filter": filter.to_expression(),
                "offset": 0,
                "limit": FETCH_PAGE_SIZE,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": first_page,
                "offset": 0,
                "limit": FETCH_PAGE_SIZE,
                "total": FETCH_PAGE_SIZE + 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes/search/documents/fetch"))
            .and(body_json(json!({
                "filter": filter.to_expression(),
                "offset": FETCH_PAGE_SIZE,
                "limit": FETCH_PAGE_SIZE,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [artist_doc(user_id)],
                "offset": FETCH_PAGE_SIZE,
                "limit": FETCH_PAGE_SIZE,
                "total": FETCH_PAGE_SIZE + 1
            })))
            .mount(&server)
            .await;

        // Act
        let documents = client_for(&server).get_documents(&filter).await.unwrap();

        // Assert
        assert_eq!(documents.len(), FETCH_PAGE_SIZE + 1);
    }

    #[tokio::test]
    async fn test_engine_error_status_is_infrastructure_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .update(&[DocumentUpdate::Full(artist_doc(Uuid::new_v4()))])
            .await;

        match result {
            Err(DomainError::Infrastructure(msg)) => assert!(msg.contains("503")),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }
}
