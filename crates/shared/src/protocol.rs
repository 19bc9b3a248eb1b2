use serde::{Deserialize, Serialize};

use crate::domain::{ReactionChoice, ReactionCounts, ReactionTarget, TargetKind};

pub const POST_REACT_PATH: &str = "/api/react";
pub const COMMENT_REACT_PATH: &str = "/api/comment/react";

impl TargetKind {
    pub fn endpoint_path(self) -> &'static str {
        match self {
            TargetKind::Post => POST_REACT_PATH,
            TargetKind::Comment => COMMENT_REACT_PATH,
        }
    }
}

/// How the reaction body is encoded on the wire. Deployments differ; the
/// field names are the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    #[default]
    Json,
    Form,
}

impl std::str::FromStr for BodyEncoding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(BodyEncoding::Json),
            "form" | "urlencoded" => Ok(BodyEncoding::Form),
            other => Err(format!("unknown body encoding {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReactRequest {
    Post {
        post_id: i64,
        #[serde(rename = "type")]
        choice: ReactionChoice,
    },
    Comment {
        comment_id: i64,
        #[serde(rename = "type")]
        choice: ReactionChoice,
    },
}

impl ReactRequest {
    pub fn for_target(target: ReactionTarget, choice: ReactionChoice) -> Self {
        match target {
            ReactionTarget::Post(id) => ReactRequest::Post {
                post_id: id.0,
                choice,
            },
            ReactionTarget::Comment(id) => ReactRequest::Comment {
                comment_id: id.0,
                choice,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    pub likes: u64,
    pub dislikes: u64,
}

impl ReactionResponse {
    /// Counts are only authoritative when the server explicitly confirmed
    /// the reaction.
    pub fn into_counts(self) -> Option<ReactionCounts> {
        (self.success == Some(true)).then_some(ReactionCounts {
            likes: self.likes,
            dislikes: self.dislikes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommentId, PostId};
    use serde_json::json;

    #[test]
    fn post_request_uses_post_id_and_type_fields() {
        let body = ReactRequest::for_target(ReactionTarget::Post(PostId(42)), ReactionChoice::Like);
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            json!({"post_id": 42, "type": "like"})
        );
    }

    #[test]
    fn comment_request_uses_comment_id_field() {
        let body = ReactRequest::for_target(
            ReactionTarget::Comment(CommentId(9)),
            ReactionChoice::Dislike,
        );
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            json!({"comment_id": 9, "type": "dislike"})
        );
    }

    #[test]
    fn response_without_success_flag_is_not_authoritative() {
        let body: ReactionResponse =
            serde_json::from_value(json!({"likes": 3, "dislikes": 1})).expect("decode");
        assert_eq!(body.into_counts(), None);

        let body: ReactionResponse =
            serde_json::from_value(json!({"success": false, "likes": 3, "dislikes": 1}))
                .expect("decode");
        assert_eq!(body.into_counts(), None);
    }

    #[test]
    fn confirmed_response_yields_counts() {
        let body: ReactionResponse =
            serde_json::from_value(json!({"success": true, "likes": 3, "dislikes": 1}))
                .expect("decode");
        assert_eq!(
            body.into_counts(),
            Some(ReactionCounts {
                likes: 3,
                dislikes: 1
            })
        );
    }

    #[test]
    fn negative_counts_are_rejected() {
        let decoded = serde_json::from_value::<ReactionResponse>(
            json!({"success": true, "likes": -1, "dislikes": 0}),
        );
        assert!(decoded.is_err());
    }

    #[test]
    fn endpoint_follows_target_kind() {
        assert_eq!(TargetKind::Post.endpoint_path(), "/api/react");
        assert_eq!(TargetKind::Comment.endpoint_path(), "/api/comment/react");
    }
}
