// src/models/text.rs

use chrono::{DateTime, Utc};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

/// `parent_id` of a root post.
pub const NO_PARENT: i64 = -1;

/// Username stored when the author does not give one.
pub const DEFAULT_USERNAME: &str = "Anonymous";

const MIN_USERNAME_LEN: usize = 3;

/// Represents the 'texts' table in the database.
/// Rows are never updated or deleted once inserted.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Text {
    pub id: i64,

    /// Id of the text being replied to, or `NO_PARENT` for a root post.
    pub parent_id: i64,

    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A text that passed validation and is ready to be stored.
///
/// Only constructible through `NewText::new` or `TryFrom<CreateTextRequest>`,
/// so the store never sees untrimmed or empty input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewText {
    parent_id: i64,
    username: String,
    text: String,
}

impl NewText {
    pub fn new(
        parent_id: i64,
        username: Option<&str>,
        text: &str,
    ) -> Result<Self, ValidationErrors> {
        CreateTextRequest {
            username: username.map(str::to_owned),
            text: text.to_owned(),
            parent_id,
        }
        .try_into()
    }

    pub fn parent_id(&self) -> i64 {
        self.parent_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TryFrom<CreateTextRequest> for NewText {
    type Error = ValidationErrors;

    fn try_from(request: CreateTextRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let username = request
            .username
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_USERNAME)
            .to_owned();

        Ok(Self {
            parent_id: request.parent_id,
            username,
            text: request.text.trim().to_owned(),
        })
    }
}

/// A text together with its expanded replies.
///
/// `comment_depth` counts edges from the node the expansion started at,
/// so every node returned at the top level of a query has depth 0.
///
/// Reply chains can be arbitrarily deep, so code walking a tree must use
/// an explicit stack rather than recursion; `Drop` does the same.
#[derive(Debug, PartialEq)]
pub struct TextNode {
    pub id: i64,
    pub parent_id: i64,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub comment_depth: u32,
    pub comments: Vec<TextNode>,
}

impl TextNode {
    /// Wraps a stored row as an unexpanded node at the given depth.
    pub fn from_text(text: Text, comment_depth: u32) -> Self {
        Self {
            id: text.id,
            parent_id: text.parent_id,
            username: text.username,
            text: text.text,
            created_at: text.created_at,
            comment_depth,
            comments: Vec::new(),
        }
    }
}

impl Drop for TextNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.comments);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.comments);
        }
    }
}

/// DTO for creating a new text.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTextRequest {
    /// Author name; "Anonymous" when omitted or null.
    #[validate(custom(function = validate_username))]
    #[serde(default)]
    #[schema(default = "Anonymous", min_length = 3)]
    pub username: Option<String>,

    #[validate(custom(function = validate_text))]
    #[schema(min_length = 1)]
    pub text: String,

    /// Id of the text being replied to. Omit (or send -1) for a root post.
    #[serde(default = "default_parent_id")]
    pub parent_id: i64,
}

/// Checks the username length once surrounding whitespace is dropped.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().chars().count() < MIN_USERNAME_LEN {
        let mut err = ValidationError::new("username_too_short");
        err.message = Some("Username must be at least 3 characters long".into());
        return Err(err);
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("text_empty");
        err.message = Some("Text must not be empty".into());
        return Err(err);
    }
    Ok(())
}

fn default_parent_id() -> i64 {
    NO_PARENT
}

fn default_limit() -> i64 {
    100
}

/// Query parameters for listing texts.
///
/// `offset` is a page index: the page starts at row `limit * offset`.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct TextListParams {
    /// Page size (default: 100, range 1..=1000).
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    #[param(default = 100, minimum = 1, maximum = 1000)]
    pub limit: i64,

    /// Page number, starting at 0.
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must not be negative"))]
    #[param(default = 0, minimum = 0)]
    pub offset: i64,

    /// Only list direct replies to this text (-1 lists root posts).
    #[serde(default = "default_parent_id")]
    pub parent_id: i64,

    /// Expand the full reply tree of every returned text.
    #[serde(default)]
    pub include_comments: bool,
}

/// Query parameters for fetching a single text.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct TextQueryParams {
    /// Expand the full reply tree of the text.
    #[serde(default)]
    pub include_comments: bool,
}

/// DTO for returning a text with its replies.
///
/// Serialized by `to_json`, which walks the tree iteratively.
#[derive(Debug, ToSchema)]
pub struct TextResponse {
    pub id: i64,
    pub username: String,
    pub text: String,
    pub parent_id: i64,

    /// Creation time as seconds since the Unix epoch.
    pub created_at_utc: f64,

    pub comment_depth: u32,

    #[schema(no_recursion)]
    pub comments: Vec<TextResponse>,
}

impl TextResponse {
    /// Takes the scalar fields of `node`, leaving its replies in place.
    fn detach(node: &mut TextNode) -> Self {
        Self {
            id: node.id,
            username: std::mem::take(&mut node.username),
            text: std::mem::take(&mut node.text),
            parent_id: node.parent_id,
            created_at_utc: node.created_at.timestamp_micros() as f64 / 1_000_000.0,
            comment_depth: node.comment_depth,
            comments: Vec::new(),
        }
    }

    /// Encodes the whole reply tree as a JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        write_open(self, &mut out)?;

        let mut stack = vec![self.comments.iter()];
        while let Some(replies) = stack.last_mut() {
            match replies.next() {
                Some(reply) => {
                    if !out.ends_with('[') {
                        out.push(',');
                    }
                    write_open(reply, &mut out)?;
                    stack.push(reply.comments.iter());
                }
                None => {
                    out.push_str("]}");
                    stack.pop();
                }
            }
        }

        Ok(out)
    }
}

/// Writes `node` up to and including the `[` that opens its comments.
fn write_open(node: &TextResponse, out: &mut String) -> Result<(), serde_json::Error> {
    out.push_str("{\"id\":");
    out.push_str(&serde_json::to_string(&node.id)?);
    out.push_str(",\"username\":");
    out.push_str(&serde_json::to_string(&node.username)?);
    out.push_str(",\"text\":");
    out.push_str(&serde_json::to_string(&node.text)?);
    out.push_str(",\"parent_id\":");
    out.push_str(&serde_json::to_string(&node.parent_id)?);
    out.push_str(",\"created_at_utc\":");
    out.push_str(&serde_json::to_string(&node.created_at_utc)?);
    out.push_str(",\"comment_depth\":");
    out.push_str(&serde_json::to_string(&node.comment_depth)?);
    out.push_str(",\"comments\":[");
    Ok(())
}

impl Serialize for TextResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let json = self.to_json().map_err(S::Error::custom)?;
        RawValue::from_string(json)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl Drop for TextResponse {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.comments);
        while let Some(mut response) = pending.pop() {
            pending.append(&mut response.comments);
        }
    }
}

impl From<TextNode> for TextResponse {
    fn from(mut root: TextNode) -> Self {
        let mut out = Self::detach(&mut root);
        let mut root_replies = std::mem::take(&mut root.comments).into_iter();
        let mut stack: Vec<(TextResponse, std::vec::IntoIter<TextNode>)> = Vec::new();

        loop {
            let replies = match stack.last_mut() {
                Some((_, replies)) => replies,
                None => &mut root_replies,
            };

            match replies.next() {
                Some(mut reply) => {
                    let nested = std::mem::take(&mut reply.comments).into_iter();
                    stack.push((Self::detach(&mut reply), nested));
                }
                None => match stack.pop() {
                    Some((done, _)) => match stack.last_mut() {
                        Some((parent, _)) => parent.comments.push(done),
                        None => out.comments.push(done),
                    },
                    None => return out,
                },
            }
        }
    }
}

impl From<Text> for TextResponse {
    fn from(text: Text) -> Self {
        TextNode::from_text(text, 0).into()
    }
}

/// Body of the welcome endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub welcome_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_text(id: i64, parent_id: i64) -> Text {
        Text {
            id,
            parent_id,
            username: "Alice".to_string(),
            text: format!("text {id}"),
            created_at: Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap(),
        }
    }

    #[test]
    fn new_text_trims_and_defaults_username() {
        let text = NewText::new(NO_PARENT, None, "  Hello  ").unwrap();
        assert_eq!(text.username(), DEFAULT_USERNAME);
        assert_eq!(text.text(), "Hello");
        assert_eq!(text.parent_id(), NO_PARENT);

        let text = NewText::new(4, Some("  Bob "), "Hi").unwrap();
        assert_eq!(text.username(), "Bob");
        assert_eq!(text.parent_id(), 4);
    }

    #[test]
    fn new_text_rejects_short_username_after_trim() {
        let err = NewText::new(NO_PARENT, Some("  ab   "), "Hello").unwrap_err();
        assert!(err.field_errors().contains_key("username"));
    }

    #[test]
    fn new_text_rejects_blank_text() {
        let err = NewText::new(NO_PARENT, Some("Alice"), "   \n").unwrap_err();
        assert!(err.field_errors().contains_key("text"));
    }

    #[test]
    fn create_request_defaults_when_fields_missing() {
        let request: CreateTextRequest = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
        assert_eq!(request.username, None);
        assert_eq!(request.parent_id, NO_PARENT);

        let request: CreateTextRequest =
            serde_json::from_str(r#"{"username": null, "text": "Hello", "parent_id": 3}"#)
                .unwrap();
        let new_text = NewText::try_from(request).unwrap();
        assert_eq!(new_text.username(), DEFAULT_USERNAME);
        assert_eq!(new_text.parent_id(), 3);
    }

    #[test]
    fn list_params_validate_ranges() {
        let params = TextListParams {
            limit: 0,
            offset: 0,
            parent_id: NO_PARENT,
            include_comments: false,
        };
        assert!(params.validate().is_err());

        let params = TextListParams {
            limit: 1000,
            offset: -1,
            parent_id: NO_PARENT,
            include_comments: false,
        };
        assert!(params.validate().unwrap_err().field_errors().contains_key("offset"));

        let params = TextListParams {
            limit: 1000,
            offset: 7,
            parent_id: NO_PARENT,
            include_comments: true,
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn response_flattens_nested_nodes() {
        let mut root = TextNode::from_text(sample_text(1, NO_PARENT), 0);
        root.comments.push(TextNode::from_text(sample_text(2, 1), 1));

        let response = TextResponse::from(root);
        assert_eq!(response.created_at_utc, 1_700_000_000.5);
        assert_eq!(response.comments.len(), 1);
        assert_eq!(response.comments[0].id, 2);
        assert_eq!(response.comments[0].comment_depth, 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["comments"][0]["comments"], serde_json::json!([]));
        assert!(json.get("created_at").is_none());
    }
}
