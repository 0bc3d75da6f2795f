//! Typed helpers for the Vidora backend endpoints.
//!
//! Each write helper invalidates the cached reads it can make stale, and
//! only after the write succeeded.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::client::RequestClient;
use crate::error::ClientError;
use crate::options::RequestOptions;
use crate::params::Params;

/// TTL for recommendation reads.
pub const RECOMMENDATIONS_TTL: Duration = Duration::from_secs(10 * 60);

/// Default analytics window.
pub const DEFAULT_TIME_RANGE: &str = "30d";

/// Filters for the video listing.
#[derive(Debug, Clone, Default)]
pub struct VideoQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
    /// `newest`, `oldest`, `popular`...
    pub sort: Option<String>,
}

impl VideoQuery {
    fn to_params(&self) -> Params {
        Params::new()
            .with_opt("page", self.page)
            .with_opt("limit", self.limit)
            .with_opt("category", self.category.as_deref())
            .with_opt("search", self.search.as_deref())
            .with_opt("sort", self.sort.as_deref())
    }
}

/// Inputs for the recommendation panel.
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
    pub limit: Option<u32>,
    /// Video currently playing.
    pub exclude: Option<String>,
    pub categories: Vec<String>,
    pub user_id: Option<String>,
}

impl RecommendationQuery {
    fn to_params(&self) -> Params {
        let categories = (!self.categories.is_empty()).then(|| self.categories.join(","));
        Params::new()
            .with_opt("limit", self.limit)
            .with_opt("exclude", self.exclude.as_deref())
            .with_opt("categories", categories)
            .with_opt("userId", self.user_id.as_deref())
    }
}

/// Like or dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

pub fn video_path(video_id: &str) -> String {
    format!("/api/videos/{video_id}")
}

pub fn comments_path(video_id: &str) -> String {
    format!("/api/videos/{video_id}/comments")
}

fn comment_reaction_path(video_id: &str, comment_id: &str, reply_id: Option<&str>) -> String {
    match reply_id {
        Some(reply_id) => format!(
            "{}/{comment_id}/replies/{reply_id}/react",
            comments_path(video_id)
        ),
        None => format!("{}/{comment_id}/react", comments_path(video_id)),
    }
}

pub fn user_path(user_id: &str) -> String {
    format!("/api/users/{user_id}")
}

/// Video platform API on top of a shared [`RequestClient`].
#[derive(Clone)]
pub struct VideoApi {
    client: Arc<RequestClient>,
}

impl VideoApi {
    pub fn new(client: Arc<RequestClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    /// Paged video listing.
    pub async fn videos(&self, query: &VideoQuery) -> Result<Arc<Value>, ClientError> {
        self.client
            .get("/api/videos", &query.to_params(), &RequestOptions::default())
            .await
    }

    /// Single video with its comments.
    pub async fn video(&self, video_id: &str) -> Result<Arc<Value>, ClientError> {
        self.client
            .get(&video_path(video_id), &Params::new(), &RequestOptions::default())
            .await
    }

    /// Recommendations, cached for ten minutes.
    pub async fn recommendations(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Arc<Value>, ClientError> {
        self.client
            .get(
                "/api/videos/recommendations",
                &query.to_params(),
                &RequestOptions::new().ttl(RECOMMENDATIONS_TTL),
            )
            .await
    }

    /// Channel analytics for a time range such as `7d`, `30d` or `90d`.
    pub async fn analytics(
        &self,
        user_id: &str,
        time_range: Option<&str>,
    ) -> Result<Arc<Value>, ClientError> {
        let params = Params::new()
            .with("userId", user_id)
            .with("timeRange", time_range.unwrap_or(DEFAULT_TIME_RANGE));
        self.client
            .get("/api/dashboard/analytics", &params, &RequestOptions::default())
            .await
    }

    /// Videos owned by `user_id`, as shown on the dashboard.
    pub async fn dashboard_videos(&self, user_id: &str) -> Result<Arc<Value>, ClientError> {
        self.client
            .get(
                "/api/dashboard/videos",
                &Params::new().with("userId", user_id),
                &RequestOptions::default(),
            )
            .await
    }

    /// Whether the current user follows `channel_id`.
    pub async fn subscription_status(&self, channel_id: &str) -> Result<Arc<Value>, ClientError> {
        self.client
            .get(
                &format!("{}/subscribe", user_path(channel_id)),
                &Params::new(),
                &RequestOptions::default(),
            )
            .await
    }

    /// Likes or dislikes a video.
    pub async fn react(
        &self,
        video_id: &str,
        reaction: Reaction,
        user_id: &str,
    ) -> Result<Value, ClientError> {
        let endpoint = format!("{}/{}", video_path(video_id), reaction.as_str());
        let result = self
            .client
            .post(&endpoint, &json!({ "userId": user_id }), &RequestOptions::default())
            .await?;
        self.invalidate(&[video_path(video_id).as_str()]);
        Ok(result)
    }

    /// Posts a top-level comment.
    pub async fn add_comment(&self, video_id: &str, text: &str) -> Result<Value, ClientError> {
        let result = self
            .client
            .post(&comments_path(video_id), &json!({ "text": text }), &RequestOptions::default())
            .await?;
        self.invalidate(&[comments_path(video_id).as_str()]);
        Ok(result)
    }

    /// Replies to a comment.
    pub async fn reply(
        &self,
        video_id: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<Value, ClientError> {
        let endpoint = format!("{}/{}/replies", comments_path(video_id), comment_id);
        let result = self
            .client
            .post(&endpoint, &json!({ "text": text }), &RequestOptions::default())
            .await?;
        self.invalidate(&[comments_path(video_id).as_str()]);
        Ok(result)
    }

    /// Adds an emoji reaction to a comment, or to one of its replies when
    /// `reply_id` is set.
    pub async fn react_to_comment(
        &self,
        video_id: &str,
        comment_id: &str,
        reply_id: Option<&str>,
        emoji: &str,
    ) -> Result<Value, ClientError> {
        let endpoint = comment_reaction_path(video_id, comment_id, reply_id);
        let result = self
            .client
            .post(&endpoint, &json!({ "emoji": emoji }), &RequestOptions::default())
            .await?;
        self.invalidate(&[comments_path(video_id).as_str()]);
        Ok(result)
    }

    /// Follows a channel.
    pub async fn subscribe(&self, channel_id: &str) -> Result<Value, ClientError> {
        let endpoint = format!("{}/subscribe", user_path(channel_id));
        let result = self
            .client
            .post(&endpoint, &json!({}), &RequestOptions::default())
            .await?;
        self.invalidate(&[user_path(channel_id).as_str()]);
        Ok(result)
    }

    /// Unfollows a channel.
    pub async fn unsubscribe(&self, channel_id: &str) -> Result<Value, ClientError> {
        let endpoint = format!("{}/subscribe", user_path(channel_id));
        let result = self
            .client
            .delete(&endpoint, &RequestOptions::default())
            .await?;
        self.invalidate(&[user_path(channel_id).as_str()]);
        Ok(result)
    }

    /// Updates video metadata.
    pub async fn update_video(&self, video_id: &str, changes: &Value) -> Result<Value, ClientError> {
        let result = self
            .client
            .put(&video_path(video_id), changes, &RequestOptions::default())
            .await?;
        self.invalidate(&[video_path(video_id).as_str(), "/api/dashboard"]);
        Ok(result)
    }

    /// Deletes a video. Every listing may have included it.
    pub async fn delete_video(&self, video_id: &str) -> Result<Value, ClientError> {
        let result = self
            .client
            .delete(&video_path(video_id), &RequestOptions::default())
            .await?;
        self.invalidate(&["/api/videos", "/api/dashboard"]);
        Ok(result)
    }

    fn invalidate(&self, patterns: &[&str]) {
        let count: usize = patterns
            .iter()
            .map(|pattern| self.client.clear_cache(pattern).count)
            .sum();
        debug!(patterns = ?patterns, count = count, "Invalidated reads after write");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_query_params() {
        let query = VideoQuery {
            page: Some(2),
            sort: Some("popular".to_string()),
            ..Default::default()
        };

        assert_eq!(query.to_params().to_query_string(), "page=2&sort=popular");
    }

    #[test]
    fn test_recommendation_params_join_categories() {
        let query = RecommendationQuery {
            limit: Some(6),
            exclude: Some("v1".to_string()),
            categories: vec!["music".to_string(), "gaming".to_string()],
            user_id: None,
        };

        let params = query.to_params();
        assert_eq!(params.get("categories"), Some("music,gaming"));
        assert_eq!(params.get("userId"), None);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_categories_are_omitted() {
        let params = RecommendationQuery::default().to_params();
        assert!(params.is_empty());
    }

    #[test]
    fn test_paths() {
        assert_eq!(video_path("v1"), "/api/videos/v1");
        assert_eq!(comments_path("v1"), "/api/videos/v1/comments");
        assert_eq!(user_path("u1"), "/api/users/u1");
        assert_eq!(Reaction::Dislike.as_str(), "dislike");
    }

    #[test]
    fn test_comment_reaction_paths() {
        assert_eq!(
            comment_reaction_path("v1", "c1", None),
            "/api/videos/v1/comments/c1/react"
        );
        assert_eq!(
            comment_reaction_path("v1", "c1", Some("r1")),
            "/api/videos/v1/comments/c1/replies/r1/react"
        );
    }
}
