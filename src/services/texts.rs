// src/services/texts.rs

use std::sync::Arc;

use super::{TextError, tree};
use crate::{
    models::text::{NO_PARENT, NewText, Text, TextNode},
    store::{StoreError, TextStore},
};

/// Read and write operations on texts, composed from a `TextStore` and
/// the tree assembler.
#[derive(Clone)]
pub struct TextService {
    store: Arc<dyn TextStore>,
}

impl TextService {
    pub fn new(store: Arc<dyn TextStore>) -> Self {
        Self { store }
    }

    /// Lists page `offset` of the direct children of `parent_id`
    /// (root posts when `parent_id` is -1).
    ///
    /// An empty page is reported as `TextError::EndOfResults`.
    pub async fn list_texts(
        &self,
        parent_id: i64,
        limit: i64,
        offset: i64,
        include_comments: bool,
    ) -> Result<Vec<TextNode>, TextError> {
        let texts = self.store.list_by_parent(parent_id, limit, offset).await?;
        if texts.is_empty() {
            return Err(TextError::EndOfResults);
        }

        let mut nodes = Vec::with_capacity(texts.len());
        for text in texts {
            nodes.push(self.resolve(text, include_comments).await?);
        }
        Ok(nodes)
    }

    pub async fn get_text(&self, id: i64, include_comments: bool) -> Result<TextNode, TextError> {
        let text = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(TextError::NotFound(id))?;

        self.resolve(text, include_comments).await
    }

    pub async fn create_text(&self, new_text: NewText) -> Result<Text, TextError> {
        let parent_id = new_text.parent_id();
        if parent_id != NO_PARENT && self.store.get_by_id(parent_id).await?.is_none() {
            return Err(TextError::InvalidParent(parent_id));
        }

        let text = self.store.create(&new_text).await.map_err(|e| match e {
            StoreError::ParentNotFound(id) => TextError::InvalidParent(id),
            other => TextError::Storage(other),
        })?;

        tracing::info!(id = text.id, parent_id = text.parent_id, "Text created");
        Ok(text)
    }

    /// Turns a row into a depth-0 node, expanding its replies on request.
    async fn resolve(&self, text: Text, include_comments: bool) -> Result<TextNode, TextError> {
        let node = TextNode::from_text(text, 0);
        if !include_comments {
            return Ok(node);
        }
        Ok(tree::expand(self.store.as_ref(), node).await?)
    }
}
