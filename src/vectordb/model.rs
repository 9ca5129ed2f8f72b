use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{PointStruct, ScoredPoint, Value};
use serde::{Deserialize, Serialize};

use crate::chunking::{Segment, SourceKind};
use crate::constants::PAYLOAD_TEXT_LIMIT;
use crate::hashing::segment_point_id;
use crate::lang::Language;

const KEY_SEGMENT_ID: &str = "segment_id";
const KEY_DOC_ID: &str = "doc_id";
const KEY_PAGE: &str = "page";
const KEY_LANGUAGE: &str = "language";
const KEY_SOURCE_KIND: &str = "source_kind";
const KEY_TEXT: &str = "text";
const KEY_SOURCE_LOCATOR: &str = "source_locator";

/// Per-segment metadata stored alongside the vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    pub doc_id: String,
    pub page: u32,
    pub language: Language,
    pub source_kind: SourceKind,
    /// Segment text, cut to [`PAYLOAD_TEXT_LIMIT`] characters.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_locator: Option<String>,
}

/// A vector search hit, already normalized from the index's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub segment_id: String,
    pub similarity_score: f32,
    pub metadata: MatchMetadata,
}

/// A segment ready for upsert.
#[derive(Debug, Clone)]
pub struct IndexPoint {
    pub segment_id: String,
    pub vector: Vec<f32>,
    pub metadata: MatchMetadata,
}

impl IndexPoint {
    pub fn from_segment(segment: &Segment, vector: Vec<f32>, source_locator: Option<&str>) -> Self {
        Self {
            segment_id: segment.id.clone(),
            vector,
            metadata: MatchMetadata {
                doc_id: segment.doc_id.clone(),
                page: segment.page,
                language: segment.language,
                source_kind: segment.source_kind,
                text: truncate_chars(&segment.text, PAYLOAD_TEXT_LIMIT),
                source_locator: source_locator.map(str::to_string),
            },
        }
    }

    /// Deterministic point id; re-upserting the same segment overwrites it.
    pub fn point_id(&self) -> u64 {
        segment_point_id(&self.segment_id)
    }

    pub fn into_point_struct(self) -> PointStruct {
        let id = self.point_id();
        let meta = self.metadata;

        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(KEY_SEGMENT_ID.to_string(), self.segment_id.into());
        payload.insert(KEY_DOC_ID.to_string(), meta.doc_id.into());
        payload.insert(KEY_PAGE.to_string(), (meta.page as i64).into());
        payload.insert(KEY_LANGUAGE.to_string(), meta.language.code().to_string().into());
        payload.insert(
            KEY_SOURCE_KIND.to_string(),
            meta.source_kind.as_str().to_string().into(),
        );
        payload.insert(KEY_TEXT.to_string(), meta.text.into());
        if let Some(locator) = meta.source_locator {
            payload.insert(KEY_SOURCE_LOCATOR.to_string(), locator.into());
        }

        PointStruct::new(id, self.vector, payload)
    }
}

impl Match {
    /// Normalizes a Qdrant hit. Points without a segment id or doc id are
    /// rejected; other missing fields fall back to defaults.
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let numeric_id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => Some(n),
            _ => None,
        };

        let payload = point.payload;
        let text_field = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        let segment_id =
            text_field(KEY_SEGMENT_ID).or_else(|| numeric_id.map(|n| n.to_string()))?;
        let doc_id = text_field(KEY_DOC_ID)?;

        let page = payload
            .get(KEY_PAGE)
            .and_then(|v| v.as_integer())
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(0);

        let language = text_field(KEY_LANGUAGE)
            .map(|code| Language::from_code(&code))
            .unwrap_or_default();

        let source_kind = text_field(KEY_SOURCE_KIND)
            .and_then(|kind| SourceKind::parse(&kind))
            .unwrap_or(SourceKind::Text);

        Some(Match {
            segment_id,
            similarity_score: point.score,
            metadata: MatchMetadata {
                doc_id,
                page,
                language,
                source_kind,
                text: text_field(KEY_TEXT).unwrap_or_default(),
                source_locator: text_field(KEY_SOURCE_LOCATOR),
            },
        })
    }
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
