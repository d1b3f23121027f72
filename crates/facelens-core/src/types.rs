use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("invalid date range {0:?}: expected YYYYMMDD-YYYYMMDD")]
    InvalidDateRange(String),
    #[error("date range starts after it ends: {0}")]
    ReversedDateRange(String),
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("UTC offset out of range: {0}h")]
    InvalidOffset(i32),
    #[error("bounding box {id}: {names} candidate names but {probs} scores")]
    CandidateMismatch {
        id: String,
        names: usize,
        probs: usize,
    },
    #[error("selection index {index} out of range for {len} groups")]
    SelectionOutOfRange { index: usize, len: usize },
}

/// A detected face region with ranked identity candidates.
///
/// `bbox` is `[x0, y0, x1, y1]` in source-image pixels. `names` and
/// `probs` are parallel arrays, best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub id: String,
    pub bbox: [f32; 4],
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub probs: Vec<f32>,
}

/// One ranked identity for a face.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    /// Similarity in [0, 1].
    pub score: f32,
}

impl BoundingBox {
    /// Check that every candidate name has a score.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.names.len() != self.probs.len() {
            return Err(CoreError::CandidateMismatch {
                id: self.id.clone(),
                names: self.names.len(),
                probs: self.probs.len(),
            });
        }
        Ok(())
    }

    /// Candidates paired up in ranked order. Trailing unpaired entries are dropped.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.names
            .iter()
            .zip(self.probs.iter())
            .map(|(name, &score)| Candidate {
                name: name.clone(),
                score,
            })
            .collect()
    }

    pub fn best(&self) -> Option<Candidate> {
        self.candidates().into_iter().next()
    }

    /// Score of the best candidate, or 0.0 when the face matched nobody.
    pub fn best_score(&self) -> f32 {
        self.probs.first().copied().unwrap_or(0.0)
    }

    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }
}

/// A personnel record as returned by `GET /FR/person`.
///
/// The server may send `null` for either field; both collapse to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

/// Body of `PATCH /FR/person`.
///
/// `images` replaces the stored image list; `new_images` appends to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_images: Option<Vec<String>>,
}

impl PersonUpdate {
    pub fn replace(name: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            name: name.into(),
            images: Some(images),
            new_images: None,
        }
    }

    pub fn append(name: impl Into<String>, new_images: Vec<String>) -> Self {
        Self {
            name: name.into(),
            images: None,
            new_images: Some(new_images),
        }
    }
}

/// A stored detection event from `GET /FR/detection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: String,
    /// ISO-8601 timestamp as sent by the server (no offset).
    pub date_time: String,
    /// Base64-encoded source image.
    #[serde(default)]
    pub image_data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bboxes: Vec<BoundingBox>,
}

/// Body of `POST /FR/detection`.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionRequest {
    pub image_data: String,
}

/// Faces found in a freshly submitted image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub bboxes: Vec<BoundingBox>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
