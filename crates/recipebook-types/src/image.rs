use bytes::Bytes;

use crate::Timestamp;

/// Prefix under which recipe images are stored in the blob store.
pub const RECIPE_IMAGES_PREFIX: &str = "recipe-images";

/// Binary image content supplied alongside a recipe update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name as supplied by the client.
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Blob path for this upload at time `at`:
    /// `recipe-images/<unix-ms>-<file name>`.
    ///
    /// Only the last path segment of the client file name is kept.
    pub fn blob_path(&self, at: Timestamp) -> String {
        let base = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("image");
        format!("{RECIPE_IMAGES_PREFIX}/{}-{base}", at.timestamp_millis())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
