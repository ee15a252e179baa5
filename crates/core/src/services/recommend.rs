//! Recommendation service: ranks posts by style similarity to the viewer's
//! latest liked post, falling back to popularity.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sharegraph_common::{AppError, AppResult, config::RecommendConfig};
use sharegraph_db::{
    entities::post::PostVisibility,
    models::CandidatePost,
    store::FeatureReader,
};

/// Limit used when the caller passes a non-positive one.
const FALLBACK_LIMIT: i64 = 10;

/// Cosine similarity over the shared prefix of `a` and `b`.
///
/// Returns 0 when the shared length is 0 or either prefix has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a[..n]
        .iter()
        .zip(&b[..n])
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    dot / denominator
}

/// A recommended post as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedPost {
    pub post_id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub cover_url: String,
    pub visibility: PostVisibility,
    pub author_name: String,
    pub author_avatar: String,
    pub tags: Vec<String>,
    pub like_count: i64,
    pub is_liked: bool,
    pub is_saved: bool,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    /// Similarity to the seed; absent for popularity fallback items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl RecommendedPost {
    fn from_candidate(post: CandidatePost, score: Option<f64>) -> Self {
        Self {
            post_id: post.post_id,
            author_id: post.author_id,
            title: post.title,
            description: post.description,
            cover_url: post.cover_url,
            visibility: post.visibility,
            author_name: post.author_name,
            author_avatar: post.author_avatar,
            tags: post.tags,
            like_count: post.like_count,
            is_liked: post.is_liked,
            is_saved: post.is_saved,
            created_at: post.created_at,
            score,
        }
    }

    /// Whether this item came from the popularity fallback.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.score.is_none()
    }
}

/// Recommendation service.
#[derive(Clone)]
pub struct RecommendService {
    reader: Arc<dyn FeatureReader>,
    config: RecommendConfig,
}

impl RecommendService {
    /// Create a new recommendation service.
    #[must_use]
    pub fn new(reader: Arc<dyn FeatureReader>, config: RecommendConfig) -> Self {
        Self { reader, config }
    }

    /// Recommend up to `limit` posts for `user_id`.
    ///
    /// The list is shorter than `limit` only when fewer posts are visible.
    /// A post id never appears twice.
    pub async fn recommend_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> AppResult<Vec<RecommendedPost>> {
        if user_id <= 0 {
            return Err(AppError::BadRequest("Invalid user id".to_string()));
        }
        let limit = if limit <= 0 { FALLBACK_LIMIT } else { limit };
        let wanted = usize::try_from(limit).unwrap_or(usize::MAX);

        let Some(seed) = self.reader.latest_liked_seed(user_id).await? else {
            tracing::debug!(user_id, "No liked seed, serving popular posts");
            return self.fallback(user_id, limit).await;
        };

        let pool = scaled(limit, self.config.candidate_factor);
        let candidates = self
            .reader
            .list_candidates(user_id, seed.post_id, &seed.label, pool)
            .await?;
        if candidates.is_empty() {
            tracing::debug!(user_id, label = %seed.label, "No candidates, serving popular posts");
            return self.fallback(user_id, limit).await;
        }

        let mut scored: Vec<(f64, CandidatePost)> = candidates
            .into_iter()
            .filter(|c| !seed.vector.is_empty() && !c.vector.is_empty())
            .map(|c| (cosine_similarity(&seed.vector, &c.vector), c))
            .collect();
        // Stable, so equal scores keep retrieval order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut seen = HashSet::new();
        let mut out: Vec<RecommendedPost> = Vec::with_capacity(wanted.min(scored.len()));
        for (score, candidate) in scored {
            if out.len() >= wanted {
                break;
            }
            if seen.insert(candidate.post_id) {
                out.push(RecommendedPost::from_candidate(candidate, Some(score)));
            }
        }

        if out.len() < wanted {
            let pool = scaled(limit, self.config.fallback_factor);
            match self.reader.list_fallback(user_id, pool).await {
                Ok(popular) => {
                    for post in popular {
                        if out.len() >= wanted {
                            break;
                        }
                        if seen.insert(post.post_id) {
                            out.push(RecommendedPost::from_candidate(post, None));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, user_id, "Fallback top-up failed");
                }
            }
        }

        tracing::debug!(user_id, seed_post_id = seed.post_id, count = out.len(), "Recommended");
        Ok(out)
    }

    async fn fallback(&self, user_id: i64, limit: i64) -> AppResult<Vec<RecommendedPost>> {
        let popular = self
            .reader
            .list_fallback(user_id, scaled(limit, 1))
            .await?;

        let mut seen = HashSet::new();
        Ok(popular
            .into_iter()
            .filter(|p| seen.insert(p.post_id))
            .map(|p| RecommendedPost::from_candidate(p, None))
            .collect())
    }
}

fn scaled(limit: i64, factor: i64) -> u64 {
    u64::try_from(limit.saturating_mul(factor.max(1))).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use sharegraph_db::entities::{document_feature, post};
    use sharegraph_db::models::SeedPost;
    use sharegraph_db::InMemoryStore;
    use std::sync::Mutex;

    fn feature(document_id: i64, label: &str, vector: &[f64]) -> document_feature::Model {
        let now = Utc::now().into();
        document_feature::Model {
            document_id,
            status: document_feature::FeatureStatus::Done,
            style_label: Some(label.to_string()),
            style_vector: Some(serde_json::json!(vector)),
            cluster_id: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn post(id: i64, author_id: i64, age_minutes: i64) -> post::Model {
        post::Model {
            id,
            author_id,
            title: format!("post {id}"),
            description: None,
            cover_url: None,
            visibility: post::PostVisibility::Public,
            document_id: Some(id * 100),
            like_count: 0,
            created_at: (Utc::now() - Duration::minutes(age_minutes)).into(),
        }
    }

    fn service(store: Arc<InMemoryStore>) -> RecommendService {
        RecommendService::new(store, RecommendConfig::default())
    }

    async fn corpus() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.add_user(1, "viewer", None).await;
        store.add_user(2, "author", None).await;
        store.add_user(3, "fan", None).await;
        store
    }

    fn ids(posts: &[RecommendedPost]) -> Vec<i64> {
        posts.iter().map(|p| p.post_id).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).abs() < f64::EPSILON);
        assert!(cosine_similarity(&[], &[1.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cosine_similarity_uses_shared_prefix() {
        let score = cosine_similarity(&[1.0, 0.0, 5.0], &[1.0, 0.0]);
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_rejects_invalid_user() {
        let store = corpus().await;
        assert!(matches!(
            service(store).recommend_for_user(0, 3).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_scenario_prefers_matching_label() {
        let store = corpus().await;
        store.add_post(post(1, 2, 30), &[]).await;
        store.add_post(post(2, 2, 20), &[]).await;
        store.add_post(post(3, 2, 10), &[]).await;
        store.set_feature(feature(100, "minimalist", &[1.0, 0.0, 0.0])).await;
        store.set_feature(feature(200, "minimalist", &[0.9, 0.1, 0.0])).await;
        store.set_feature(feature(300, "ornate", &[1.0, 0.0, 0.0])).await;
        store.like_post(1, 1).await;

        let out = service(store).recommend_for_user(1, 1).await.unwrap();

        assert_eq!(ids(&out), vec![2]);
        assert!(out[0].score.is_some());
    }

    #[tokio::test]
    async fn test_ranks_by_similarity() {
        let store = corpus().await;
        for (id, age) in [(1, 40), (2, 30), (3, 20), (4, 10)] {
            store.add_post(post(id, 2, age), &[]).await;
        }
        store.set_feature(feature(100, "bold", &[1.0, 0.0])).await;
        store.set_feature(feature(200, "bold", &[0.0, 1.0])).await;
        store.set_feature(feature(300, "bold", &[1.0, 0.1])).await;
        store.set_feature(feature(400, "bold", &[1.0, 1.0])).await;
        store.like_post(1, 1).await;

        let out = service(store).recommend_for_user(1, 3).await.unwrap();

        assert_eq!(ids(&out), vec![3, 4, 2]);
        assert!(out.iter().all(|p| !p.is_fallback()));
    }

    #[tokio::test]
    async fn test_cold_start_serves_popular_posts() {
        let store = corpus().await;
        for (id, age) in [(1, 50), (2, 40), (3, 30), (4, 20), (5, 10), (6, 5)] {
            store.add_post(post(id, 2, age), &[]).await;
        }
        store.like_post(3, 2).await;
        store.like_post(2, 2).await;
        store.like_post(3, 4).await;

        let out = service(store).recommend_for_user(1, 5).await.unwrap();

        // Likes desc, then newest first
        assert_eq!(ids(&out), vec![2, 4, 6, 5, 3]);
        assert!(out.iter().all(RecommendedPost::is_fallback));
    }

    #[tokio::test]
    async fn test_top_up_never_duplicates() {
        let store = corpus().await;
        for (id, age) in [(1, 40), (2, 30), (3, 20), (4, 10)] {
            store.add_post(post(id, 2, age), &[]).await;
        }
        store.set_feature(feature(100, "bold", &[1.0, 0.0])).await;
        store.set_feature(feature(200, "bold", &[1.0, 0.2])).await;
        store.like_post(1, 1).await;
        // Post 2 is also the most popular, so the top-up sees it again
        store.like_post(3, 2).await;

        let out = service(store).recommend_for_user(1, 4).await.unwrap();

        let mut unique = ids(&out);
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), out.len());
        assert_eq!(out[0].post_id, 2);
        assert!(out[0].score.is_some());
        assert_eq!(out.len(), 4);
        assert!(out[1..].iter().all(RecommendedPost::is_fallback));
    }

    #[tokio::test]
    async fn test_friends_only_posts_stay_hidden() {
        let store = corpus().await;
        let mut hidden = post(2, 2, 10);
        hidden.visibility = post::PostVisibility::Friends;
        store.add_post(post(1, 2, 20), &[]).await;
        store.add_post(hidden, &[]).await;

        let out = service(store).recommend_for_user(1, 5).await.unwrap();

        assert_eq!(ids(&out), vec![1]);
    }

    #[tokio::test]
    async fn test_equal_scores_keep_newest_first() {
        let store = corpus().await;
        store.add_post(post(1, 2, 50), &[]).await;
        store.add_post(post(2, 2, 30), &[]).await;
        store.add_post(post(3, 2, 10), &[]).await;
        store.set_feature(feature(100, "bold", &[1.0, 0.0])).await;
        store.set_feature(feature(200, "bold", &[1.0, 1.0])).await;
        store.set_feature(feature(300, "bold", &[1.0, 1.0])).await;
        store.like_post(1, 1).await;

        let out = service(store).recommend_for_user(1, 2).await.unwrap();

        assert_eq!(ids(&out), vec![3, 2]);
        assert_eq!(out[0].score, out[1].score);
    }

    #[tokio::test]
    async fn test_huge_limit_returns_what_exists() {
        let store = corpus().await;
        store.add_post(post(1, 2, 30), &[]).await;
        store.add_post(post(2, 2, 20), &[]).await;
        store.add_post(post(3, 2, 10), &[]).await;
        store.set_feature(feature(100, "bold", &[1.0, 0.0])).await;
        store.set_feature(feature(200, "bold", &[1.0, 0.5])).await;
        store.set_feature(feature(300, "bold", &[0.5, 1.0])).await;
        store.like_post(1, 1).await;

        let out = service(store).recommend_for_user(1, i64::MAX).await.unwrap();

        // Two scored candidates, then the seed post from the top-up
        assert_eq!(ids(&out), vec![2, 3, 1]);
        assert!(out[2].is_fallback());
    }

    struct RecordingReader {
        inner: Arc<InMemoryStore>,
        candidate_limits: Mutex<Vec<u64>>,
        fallback_limits: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl FeatureReader for RecordingReader {
        async fn latest_liked_seed(&self, user_id: i64) -> AppResult<Option<SeedPost>> {
            self.inner.latest_liked_seed(user_id).await
        }

        async fn list_candidates(
            &self,
            user_id: i64,
            exclude_post_id: i64,
            label: &str,
            limit: u64,
        ) -> AppResult<Vec<CandidatePost>> {
            self.candidate_limits.lock().unwrap().push(limit);
            self.inner
                .list_candidates(user_id, exclude_post_id, label, limit)
                .await
        }

        async fn list_fallback(&self, user_id: i64, limit: u64) -> AppResult<Vec<CandidatePost>> {
            self.fallback_limits.lock().unwrap().push(limit);
            self.inner.list_fallback(user_id, limit).await
        }
    }

    #[tokio::test]
    async fn test_pool_sizes_scale_with_limit() {
        let store = corpus().await;
        store.add_post(post(1, 2, 20), &[]).await;
        store.add_post(post(2, 2, 10), &[]).await;
        store.set_feature(feature(100, "bold", &[1.0, 0.0])).await;
        store.set_feature(feature(200, "bold", &[1.0, 0.0])).await;
        store.like_post(1, 1).await;

        let reader = Arc::new(RecordingReader {
            inner: store,
            candidate_limits: Mutex::new(Vec::new()),
            fallback_limits: Mutex::new(Vec::new()),
        });
        let config = RecommendConfig::default();
        let service = RecommendService::new(reader.clone(), config);
        let out = service.recommend_for_user(1, 3).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(
            *reader.candidate_limits.lock().unwrap(),
            vec![3 * config.candidate_factor as u64]
        );
        assert_eq!(
            *reader.fallback_limits.lock().unwrap(),
            vec![3 * config.fallback_factor as u64]
        );
    }

    struct BrokenFallback {
        inner: Arc<InMemoryStore>,
    }

    #[async_trait]
    impl FeatureReader for BrokenFallback {
        async fn latest_liked_seed(&self, user_id: i64) -> AppResult<Option<SeedPost>> {
            self.inner.latest_liked_seed(user_id).await
        }

        async fn list_candidates(
            &self,
            user_id: i64,
            exclude_post_id: i64,
            label: &str,
            limit: u64,
        ) -> AppResult<Vec<CandidatePost>> {
            self.inner
                .list_candidates(user_id, exclude_post_id, label, limit)
                .await
        }

        async fn list_fallback(&self, _user_id: i64, _limit: u64) -> AppResult<Vec<CandidatePost>> {
            Err(AppError::Database("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn test_top_up_failure_keeps_personalized_results() {
        let store = corpus().await;
        store.add_post(post(1, 2, 20), &[]).await;
        store.add_post(post(2, 2, 10), &[]).await;
        store.set_feature(feature(100, "bold", &[1.0, 0.0])).await;
        store.set_feature(feature(200, "bold", &[1.0, 0.0])).await;
        store.like_post(1, 1).await;

        let reader = Arc::new(BrokenFallback { inner: store });
        let service = RecommendService::new(reader, RecommendConfig::default());
        let out = service.recommend_for_user(1, 3).await.unwrap();

        assert_eq!(ids(&out), vec![2]);
    }

    #[tokio::test]
    async fn test_cold_start_fallback_failure_propagates() {
        let store = corpus().await;
        let reader = Arc::new(BrokenFallback { inner: store });
        let service = RecommendService::new(reader, RecommendConfig::default());

        assert!(matches!(
            service.recommend_for_user(1, 3).await,
            Err(AppError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_non_positive_limit_uses_default() {
        let store = corpus().await;
        for id in 1..=12 {
            store.add_post(post(id, 2, 100 - id), &[]).await;
        }

        let out = service(store).recommend_for_user(1, 0).await.unwrap();

        assert_eq!(out.len(), 10);
    }
}
