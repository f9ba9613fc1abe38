use serde::{Deserialize, Serialize};

/// One rendition of a preview image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewImage {
    pub source: Option<Resolution>,
    pub resolutions: Vec<Resolution>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preview {
    pub images: Vec<PreviewImage>,
    pub enabled: bool,
}

/// A link or self post (`t3`). Upstream omits fields freely, so everything
/// except the id defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
    pub id: String,
    pub name: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub subreddit_name_prefixed: String,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u64,
    pub over_18: bool,
    pub stickied: bool,
    pub locked: bool,
    pub upvote_ratio: Option<f64>,
    pub thumbnail: Option<String>,
    pub is_self: bool,
    pub is_video: bool,
    pub domain: String,
    pub link_flair_text: Option<String>,
    pub preview: Option<Preview>,
}

impl PostData {
    /// Resolutions of the first preview image, if the post has one.
    pub fn preview_resolutions(&self) -> Option<&[Resolution]> {
        self.preview
            .as_ref()
            .and_then(|preview| preview.images.first())
            .map(|image| image.resolutions.as_slice())
    }
}

/// A comment (`t1`). `replies` is either an empty string or a nested
/// listing envelope, so it stays raw JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentData {
    pub id: String,
    pub name: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
    pub parent_id: String,
    pub link_id: String,
    pub depth: u32,
    pub permalink: String,
    pub stickied: bool,
    pub replies: serde_json::Value,
}

/// A subreddit (`t5`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubredditData {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub display_name_prefixed: String,
    pub title: String,
    pub public_description: String,
    pub subscribers: Option<u64>,
    pub active_user_count: Option<u64>,
    pub created_utc: f64,
    pub over18: bool,
    pub url: String,
    pub icon_img: Option<String>,
    pub community_icon: Option<String>,
}

/// Flattened post ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub permalink: String,
    pub url: String,
    pub score: i64,
    pub num_comments: u64,
    pub created_utc: i64,
    pub time_ago: String,
    pub slug: String,
    pub thumbnail: Option<Resolution>,
    pub over_18: bool,
}

impl PostSummary {
    pub fn from_post(post: PostData, now: i64) -> Self {
        let created_utc = post.created_utc as i64;
        let thumbnail = crate::format::get_medium_image(post.preview_resolutions()).cloned();
        Self {
            time_ago: crate::format::format_time_ago_at(created_utc, now),
            slug: crate::format::generate_post_slug(Some(post.title.as_str())),
            id: post.id,
            title: post.title,
            author: post.author,
            subreddit: post.subreddit,
            permalink: post.permalink,
            url: post.url,
            score: post.score,
            num_comments: post.num_comments,
            created_utc,
            thumbnail,
            over_18: post.over_18,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_post_parses() {
        let post: PostData = serde_json::from_value(json!({
            "id": "abc",
            "title": "Hello",
            "thumbnail": null
        }))
        .unwrap();

        assert_eq!(post.id, "abc");
        assert_eq!(post.score, 0);
        assert!(post.thumbnail.is_none());
        assert!(post.preview_resolutions().is_none());
    }

    #[test]
    fn test_summary_from_post() {
        let post: PostData = serde_json::from_value(json!({
            "id": "1a2b3c",
            "title": "Padres' Dugout Reaction to Umpires!",
            "author": "someone",
            "subreddit": "baseball",
            "permalink": "/r/baseball/comments/1a2b3c/padres_dugout/",
            "created_utc": 1_700_000_000.0,
            "score": 1234,
            "num_comments": 56,
            "preview": {
                "images": [{
                    "source": {"width": 1920, "height": 1080, "url": "https://i.redd.it/src.jpg"},
                    "resolutions": [
                        {"width": 320, "height": 180, "url": "https://i.redd.it/320.jpg"},
                        {"width": 640, "height": 360, "url": "https://i.redd.it/640.jpg"},
                        {"width": 1080, "height": 608, "url": "https://i.redd.it/1080.jpg"}
                    ]
                }]
            }
        }))
        .unwrap();

        let summary = PostSummary::from_post(post, 1_700_000_000 + 7200);
        assert_eq!(summary.slug, "padres_dugout_reaction_to_umpires");
        assert_eq!(summary.time_ago, "2h ago");
        assert_eq!(summary.thumbnail.map(|r| r.width), Some(640));
        assert_eq!(summary.created_utc, 1_700_000_000);
    }

    #[test]
    fn test_comment_replies_stay_raw() {
        let comment: CommentData = serde_json::from_value(json!({
            "id": "c1",
            "body": "nice",
            "replies": ""
        }))
        .unwrap();
        assert_eq!(comment.replies, json!(""));
    }
}
