use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PostId);
id_newtype!(CommentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Comment => "comment",
        }
    }
}

impl FromStr for TargetKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "post" => Ok(TargetKind::Post),
            "comment" => Ok(TargetKind::Comment),
            other => Err(DomainError::UnknownKind(other.to_string())),
        }
    }
}

/// The post or comment a reaction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Post(PostId),
    Comment(CommentId),
}

impl ReactionTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            ReactionTarget::Post(_) => TargetKind::Post,
            ReactionTarget::Comment(_) => TargetKind::Comment,
        }
    }

    pub fn raw_id(&self) -> i64 {
        match self {
            ReactionTarget::Post(id) => id.0,
            ReactionTarget::Comment(id) => id.0,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let id = self.raw_id();
        if id <= 0 {
            return Err(DomainError::NonPositiveId {
                kind: self.kind().as_str(),
                id,
            });
        }
        Ok(())
    }

    /// Builds a validated target from the raw attribute values found on a
    /// rendered control.
    pub fn parse(kind: TargetKind, raw_id: &str) -> Result<Self, DomainError> {
        let id = raw_id
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::InvalidId {
                kind: kind.as_str(),
                raw: raw_id.to_string(),
            })?;
        let target = match kind {
            TargetKind::Post => ReactionTarget::Post(PostId(id)),
            TargetKind::Comment => ReactionTarget::Comment(CommentId(id)),
        };
        target.validate()?;
        Ok(target)
    }
}

impl fmt::Display for ReactionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().as_str(), self.raw_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionChoice {
    Like,
    Dislike,
}

impl ReactionChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionChoice::Like => "like",
            ReactionChoice::Dislike => "dislike",
        }
    }

    /// Active choice after this one is submitted on top of `current`:
    /// re-submitting the active choice clears it, anything else switches.
    pub fn toggle_from(self, current: Option<ReactionChoice>) -> Option<ReactionChoice> {
        if current == Some(self) {
            None
        } else {
            Some(self)
        }
    }
}

impl FromStr for ReactionChoice {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "like" => Ok(ReactionChoice::Like),
            "dislike" => Ok(ReactionChoice::Dislike),
            other => Err(DomainError::UnknownChoice(other.to_string())),
        }
    }
}

impl fmt::Display for ReactionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub likes: u64,
    pub dislikes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFilter {
    #[default]
    All,
    Mine,
    Liked,
}

impl PostFilter {
    pub const ALL: [PostFilter; 3] = [PostFilter::All, PostFilter::Mine, PostFilter::Liked];

    pub fn as_str(self) -> &'static str {
        match self {
            PostFilter::All => "all",
            PostFilter::Mine => "mine",
            PostFilter::Liked => "liked",
        }
    }

    pub fn admits(self, is_mine: bool, is_liked: bool) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Mine => is_mine,
            PostFilter::Liked => is_liked,
        }
    }
}

impl FromStr for PostFilter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(PostFilter::All),
            // older templates render the "mine" button as "my"
            "mine" | "my" => Ok(PostFilter::Mine),
            "liked" => Ok(PostFilter::Liked),
            other => Err(DomainError::UnknownFilter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_targets_only() {
        assert_eq!(
            ReactionTarget::parse(TargetKind::Post, "12"),
            Ok(ReactionTarget::Post(PostId(12)))
        );
        assert_eq!(
            ReactionTarget::parse(TargetKind::Comment, " 7 "),
            Ok(ReactionTarget::Comment(CommentId(7)))
        );
        assert!(matches!(
            ReactionTarget::parse(TargetKind::Post, "0"),
            Err(DomainError::NonPositiveId { id: 0, .. })
        ));
        assert!(matches!(
            ReactionTarget::parse(TargetKind::Comment, "abc"),
            Err(DomainError::InvalidId { .. })
        ));
    }

    #[test]
    fn toggle_clears_same_choice_and_switches_other() {
        use ReactionChoice::*;
        assert_eq!(Like.toggle_from(None), Some(Like));
        assert_eq!(Like.toggle_from(Some(Like)), None);
        assert_eq!(Like.toggle_from(Some(Dislike)), Some(Like));
        assert_eq!(Dislike.toggle_from(Some(Like)), Some(Dislike));
        assert_eq!(Dislike.toggle_from(Some(Dislike)), None);
    }

    #[test]
    fn rejects_unknown_choice() {
        assert_eq!(
            "love".parse::<ReactionChoice>(),
            Err(DomainError::UnknownChoice("love".into()))
        );
        assert!("Like".parse::<ReactionChoice>().is_err());
    }

    #[test]
    fn filter_accepts_legacy_my_value() {
        assert_eq!("my".parse::<PostFilter>(), Ok(PostFilter::Mine));
        assert_eq!("liked".parse::<PostFilter>(), Ok(PostFilter::Liked));
        assert!("popular".parse::<PostFilter>().is_err());
    }

    #[test]
    fn target_serializes_with_kind_tag() {
        let json = serde_json::to_value(ReactionTarget::Comment(CommentId(3))).expect("json");
        assert_eq!(json, serde_json::json!({"kind": "comment", "id": 3}));
    }
}
