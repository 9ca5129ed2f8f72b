use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use tracing::{debug, info, warn};

use super::error::VectorDbError;
use super::model::{IndexPoint, Match};
use super::{VectorIndex, WriteConsistency};

#[derive(Clone)]
/// Direct Qdrant client wrapper.
pub struct QdrantClient {
    client: Qdrant,
    url: String,
}

impl QdrantClient {
    /// Creates a client for `url`.
    pub fn new(url: &str, api_key: Option<&str>) -> Result<Self, VectorDbError> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key.to_string());
        }

        let client = builder
            .build()
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Ensures a cosine-distance collection exists (creates it if missing).
    pub async fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDbError> {
        let create_err = |e: qdrant_client::QdrantError| VectorDbError::CreateCollectionFailed {
            collection: name.to_string(),
            message: e.to_string(),
        };

        if self.client.collection_exists(name).await.map_err(create_err)? {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine))
                    .on_disk_payload(true),
            )
            .await
            .map_err(create_err)?;

        info!(collection = name, vector_size = vector_size, "Created collection");
        Ok(())
    }

    pub async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<PointStruct>,
        consistency: WriteConsistency,
    ) -> Result<(), VectorDbError> {
        if points.is_empty() {
            return Ok(());
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(consistency.into()))
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Searches a collection by vector similarity, normalizing hits to [`Match`].
    pub async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<Match>, VectorDbError> {
        let search_result = self
            .client
            .search_points(SearchPointsBuilder::new(collection, query, limit).with_payload(true))
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        let total = search_result.result.len();
        let matches: Vec<Match> = search_result
            .result
            .into_iter()
            .filter_map(Match::from_scored_point)
            .collect();

        if matches.len() < total {
            warn!(
                collection = collection,
                dropped = total - matches.len(),
                "Skipped search hits with incomplete payload"
            );
        }

        Ok(matches)
    }
}

#[derive(Debug, Clone)]
pub struct QdrantIndexConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub vector_size: u64,
    pub consistency: WriteConsistency,
}

/// [`VectorIndex`] over one Qdrant collection.
#[derive(Clone)]
pub struct QdrantIndex {
    client: QdrantClient,
    collection: String,
    vector_size: u64,
    consistency: WriteConsistency,
}

impl std::fmt::Debug for QdrantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantIndex")
            .field("url", &self.client.url())
            .field("collection", &self.collection)
            .field("vector_size", &self.vector_size)
            .finish()
    }
}

impl QdrantIndex {
    /// Connects and makes sure the collection exists.
    pub async fn connect(config: &QdrantIndexConfig) -> Result<Self, VectorDbError> {
        let client = QdrantClient::new(&config.url, config.api_key.as_deref())?;
        client
            .ensure_collection(&config.collection, config.vector_size)
            .await?;

        info!(
            url = %config.url,
            collection = %config.collection,
            "Connected to Qdrant"
        );

        Ok(Self {
            client,
            collection: config.collection.clone(),
            vector_size: config.vector_size,
            consistency: config.consistency,
        })
    }

    pub fn client(&self) -> &QdrantClient {
        &self.client
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn check_dimension(&self, actual: usize) -> Result<(), VectorDbError> {
        if actual as u64 != self.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: self.vector_size as usize,
                actual,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<(), VectorDbError> {
        for point in &points {
            self.check_dimension(point.vector.len())?;
        }

        let count = points.len();
        let structs: Vec<PointStruct> =
            points.into_iter().map(IndexPoint::into_point_struct).collect();
        self.client
            .upsert_points(&self.collection, structs, self.consistency)
            .await?;

        debug!(collection = %self.collection, points = count, "Upserted points");
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<Match>, VectorDbError> {
        self.check_dimension(vector.len())?;
        self.client
            .search(&self.collection, vector, top_k as u64)
            .await
    }
}
