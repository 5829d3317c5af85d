//! Turning a feed entry into something postable
//!
//! [`assemble`] normalizes an entry into a [`PostRecord`]; [`render_caption`]
//! builds the status text under the platform's character budget.

use crate::config::StatusConfig;
use crate::error::{EntryError, Result};
use crate::types::{FeedEntry, PostRecord};

/// Newlines contributed by the postscript: two before the link, two after
const POSTSCRIPT_NEWLINES: usize = 4;

const ELLIPSIS: char = '…';

/// Character-budget rules of the target platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionRules {
    pub character_limit: usize,
    /// Length the platform charges for any link, whatever its real length
    pub url_length: usize,
    pub hashtag: String,
}

impl CaptionRules {
    /// Characters the postscript costs against the limit
    pub fn postscript_reserved(&self) -> usize {
        self.hashtag.chars().count() + POSTSCRIPT_NEWLINES + self.url_length
    }

    /// Longest summary that fits without truncation
    pub fn summary_budget(&self) -> usize {
        self.character_limit.saturating_sub(self.postscript_reserved())
    }
}

impl Default for CaptionRules {
    fn default() -> Self {
        StatusConfig::default().into()
    }
}

impl From<StatusConfig> for CaptionRules {
    fn from(status: StatusConfig) -> Self {
        Self {
            character_limit: status.character_limit,
            url_length: status.url_length,
            hashtag: status.hashtag,
        }
    }
}

/// Project a feed entry onto the fields needed to publish it
pub fn assemble(entry: &FeedEntry) -> Result<PostRecord> {
    let id = entry.id().to_string();

    let media = entry
        .enclosure()
        .ok_or_else(|| EntryError::MissingEnclosure { id: id.clone() })?;

    let link = entry
        .link
        .clone()
        .ok_or_else(|| EntryError::MissingLink { id: id.clone() })?;

    Ok(PostRecord {
        id,
        link,
        summary: clean_summary(&entry.summary),
        media_url: media.href.clone(),
        media_filename: media_filename(&media.href),
        media_mime: media.media_type.clone().unwrap_or_default(),
    })
}

/// Turn `<br />` markers into newlines and trim surrounding whitespace
pub fn clean_summary(raw: &str) -> String {
    raw.replace("<br />", "\n").trim().to_string()
}

/// Trailing path segment of a URL
fn media_filename(href: &str) -> String {
    href.rsplit('/').next().unwrap_or(href).to_string()
}

/// Summary plus postscript, truncated so the platform accepts it
///
/// A summary over budget is cut to one character less than the budget and
/// ends in an ellipsis. The cut counts characters, not words.
pub fn render_caption(post: &PostRecord, rules: &CaptionRules) -> String {
    let postscript = format!("\n\n{}\n\n{}", post.link, rules.hashtag);
    let budget = rules.summary_budget();

    let mut caption = if post.summary.chars().count() > budget {
        let mut truncated: String = post.summary.chars().take(budget.saturating_sub(1)).collect();
        truncated.push(ELLIPSIS);
        truncated
    } else {
        post.summary.clone()
    };

    caption.push_str(&postscript);
    caption
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedLink;
    use crate::MemebotError;

    /// Exactly as long as the platform charges for a link
    const LINK: &str = "https://memes.test/m/42";

    fn post_with_summary(summary: &str) -> PostRecord {
        PostRecord {
            id: "42".to_string(),
            link: LINK.to_string(),
            summary: summary.to_string(),
            media_url: "https://cdn.test/img/42.jpg".to_string(),
            media_filename: "42.jpg".to_string(),
            media_mime: "image/jpeg".to_string(),
        }
    }

    fn entry(summary: &str, links: Vec<FeedLink>) -> FeedEntry {
        FeedEntry {
            guid: "https://memes.sucho.org/#42".to_string(),
            link: Some(LINK.to_string()),
            summary: summary.to_string(),
            links,
        }
    }

    fn enclosure(href: &str, media_type: &str) -> FeedLink {
        FeedLink {
            rel: Some("enclosure".to_string()),
            href: href.to_string(),
            media_type: Some(media_type.to_string()),
        }
    }

    #[test]
    fn test_assemble_extracts_media() {
        let entry = entry(
            "  Meme caption<br />second line  ",
            vec![
                FeedLink {
                    rel: Some("alternate".to_string()),
                    href: LINK.to_string(),
                    media_type: None,
                },
                enclosure("https://cdn.test/img/abc.png", "image/png"),
            ],
        );

        let post = assemble(&entry).unwrap();
        assert_eq!(post.id, "42");
        assert_eq!(post.link, LINK);
        assert_eq!(post.summary, "Meme caption\nsecond line");
        assert_eq!(post.media_url, "https://cdn.test/img/abc.png");
        assert_eq!(post.media_filename, "abc.png");
        assert_eq!(post.media_mime, "image/png");
    }

    #[test]
    fn test_assemble_untyped_enclosure_has_empty_mime() {
        let entry = entry(
            "summary",
            vec![FeedLink {
                rel: Some("enclosure".to_string()),
                href: "https://cdn.test/img/raw".to_string(),
                media_type: None,
            }],
        );

        let post = assemble(&entry).unwrap();
        assert_eq!(post.media_filename, "raw");
        assert_eq!(post.media_mime, "");
    }

    #[test]
    fn test_assemble_without_enclosure_fails() {
        let entry = entry("summary", vec![]);
        let result = assemble(&entry);
        assert!(matches!(
            result,
            Err(MemebotError::Entry(EntryError::MissingEnclosure { ref id })) if id == "42"
        ));
    }

    #[test]
    fn test_assemble_without_link_fails() {
        let mut entry = entry("summary", vec![enclosure("https://cdn.test/a.gif", "image/gif")]);
        entry.link = None;
        assert!(matches!(
            assemble(&entry),
            Err(MemebotError::Entry(EntryError::MissingLink { .. }))
        ));
    }

    #[test]
    fn test_clean_summary() {
        assert_eq!(clean_summary("a<br />b<br /><br />c"), "a\nb\n\nc");
        assert_eq!(clean_summary("\n\t  padded  \n"), "padded");
        assert_eq!(clean_summary("<br />edge<br />"), "edge");
        assert_eq!(clean_summary("keeps <br> other tags"), "keeps <br> other tags");
    }

    #[test]
    fn test_default_rules() {
        let rules = CaptionRules::default();
        assert_eq!(rules.character_limit, 500);
        assert_eq!(rules.postscript_reserved(), 6 + 4 + 23);
        assert_eq!(rules.summary_budget(), 467);
    }

    #[test]
    fn test_caption_passthrough_under_budget() {
        let rules = CaptionRules::default();
        let summary = "Putin's new car";
        let caption = render_caption(&post_with_summary(summary), &rules);
        assert_eq!(caption, format!("{}\n\n{}\n\n#SUCHO", summary, LINK));
    }

    #[test]
    fn test_caption_passthrough_at_exact_budget() {
        let rules = CaptionRules::default();
        let summary = "x".repeat(rules.summary_budget());
        let caption = render_caption(&post_with_summary(&summary), &rules);

        assert_eq!(caption, format!("{}\n\n{}\n\n#SUCHO", summary, LINK));
        assert_eq!(caption.chars().count(), 500);
        assert!(!caption.contains(ELLIPSIS));
    }

    #[test]
    fn test_caption_truncates_one_over_budget() {
        let rules = CaptionRules::default();
        let summary = "y".repeat(rules.summary_budget() + 1);
        let caption = render_caption(&post_with_summary(&summary), &rules);

        let (body, _) = caption.split_once("\n\n").unwrap();
        assert_eq!(body.chars().count(), 467);
        assert!(body.ends_with(ELLIPSIS));
        assert_eq!(body.chars().filter(|c| *c == 'y').count(), 466);
        assert_eq!(caption.chars().count(), 500);
    }

    #[test]
    fn test_caption_budget_invariant_for_many_lengths() {
        let rules = CaptionRules::default();
        for len in [0, 1, 100, 466, 467, 468, 499, 500, 501, 2000] {
            let summary = "z".repeat(len);
            let caption = render_caption(&post_with_summary(&summary), &rules);
            assert!(
                caption.chars().count() <= 500,
                "summary of {} chars rendered to {} chars",
                len,
                caption.chars().count()
            );
        }
    }

    #[test]
    fn test_caption_without_hashtag_keeps_472_chars() {
        let rules = CaptionRules {
            character_limit: 500,
            url_length: 23,
            hashtag: String::new(),
        };
        let summary = "w".repeat(600);
        let caption = render_caption(&post_with_summary(&summary), &rules);

        let ellipsis_at = caption.find(ELLIPSIS).unwrap();
        assert_eq!(caption[..ellipsis_at].chars().count(), 472);
        assert!(caption[ellipsis_at..].starts_with("…\n\n"));
    }

    #[test]
    fn test_caption_counts_characters_not_bytes() {
        let rules = CaptionRules::default();
        let summary = "Слава Україні! ".repeat(40);
        let caption = render_caption(&post_with_summary(&summary), &rules);

        assert_eq!(caption.chars().count(), 500);
        assert!(caption.ends_with(&format!("…\n\n{}\n\n#SUCHO", LINK)));
    }

    #[test]
    fn test_caption_cut_is_not_word_aware() {
        let rules = CaptionRules {
            character_limit: 60,
            url_length: 23,
            hashtag: "#T".to_string(),
        };
        // budget: 60 - (2 + 4 + 23) = 31, so 30 characters survive
        let summary = "the quick brown fox jumps over the lazy dog";
        let caption = render_caption(&post_with_summary(summary), &rules);
        assert!(caption.starts_with("the quick brown fox jumps over…\n\n"));
    }
}
