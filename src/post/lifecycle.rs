use mongodb::bson::DateTime;
use regex::Regex;

use crate::post::post_model::{Post, PostContent};
use crate::utils::error::CustomError;

/// What to do with the draft when a post is unpublished.
#[derive(Debug, PartialEq)]
pub enum UnpublishAction {
    /// No draft existed; the published content becomes the draft again.
    RestoreDraft(PostContent),
    /// Edits are in flight; only the published version goes away.
    KeepDraft,
}

fn filled(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn filled_tags(value: &Option<Vec<String>>) -> Option<Vec<String>> {
    value.as_ref().filter(|t| !t.is_empty()).cloned()
}

/// First three sentences of the text, whitespace collapsed.
pub fn summarize(text: &str) -> String {
    let summary = text.split('.').take(3).collect::<Vec<_>>().join(".") + ".";
    let collapse = Regex::new(r"\s+").unwrap();
    collapse.replace_all(&summary, " ").trim().to_string()
}

/// Builds the next published version by layering the draft over the
/// current published content. Fails when there is nothing staged or
/// when the merge would go live without a title or body.
pub fn publish(post: &Post, now: DateTime) -> Result<PostContent, CustomError> {
    let draft = post
        .draft
        .as_ref()
        .ok_or_else(|| CustomError::BadRequestError("No staged changes found".to_string()))?;
    let published = post.published.clone().unwrap_or_default();

    let title = filled(&draft.title).or_else(|| filled(&published.title));
    let html = filled(&draft.html).or_else(|| filled(&published.html));
    let text = filled(&draft.text)
        .or_else(|| filled(&published.text))
        .unwrap_or_default();

    let (Some(title), Some(html)) = (title, html) else {
        return Err(CustomError::BadRequestError(
            "Title and text are required".to_string(),
        ));
    };

    Ok(PostContent {
        title: Some(title),
        summary: Some(summarize(&text)),
        text: Some(text),
        html: Some(html),
        image: filled(&draft.image).or_else(|| filled(&published.image)),
        tags: Some(filled_tags(&draft.tags).or_else(|| filled_tags(&published.tags)).unwrap_or_default()),
        published_at: Some(published.published_at.unwrap_or(now)),
        version: Some(published.version.unwrap_or(0) + 1),
    })
}

pub fn unpublish(post: &Post) -> Result<UnpublishAction, CustomError> {
    let published = post
        .published
        .as_ref()
        .ok_or_else(|| CustomError::BadRequestError("Post is not published".to_string()))?;

    if post.draft.is_some() {
        Ok(UnpublishAction::KeepDraft)
    } else {
        Ok(UnpublishAction::RestoreDraft(published.clone()))
    }
}

pub fn can_delete(post: &Post) -> Result<(), CustomError> {
    if post.published.is_some() {
        return Err(CustomError::BadRequestError(
            "Cannot delete published posts".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_post(draft: PostContent) -> Post {
        Post {
            draft: Some(draft),
            ..Post::new()
        }
    }

    fn full_draft() -> PostContent {
        PostContent {
            title: Some("A title".to_string()),
            text: Some("One. Two. Three. Four.".to_string()),
            html: Some("<p>body</p>".to_string()),
            tags: Some(vec!["rust".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn publish_without_draft_fails() {
        let post = Post {
            draft: None,
            ..Post::new()
        };
        let err = publish(&post, DateTime::now()).unwrap_err();
        assert!(err.to_string().contains("No staged changes found"));
    }

    #[test]
    fn publish_requires_title_and_html() {
        let post = draft_post(PostContent {
            text: Some("Some text.".to_string()),
            ..Default::default()
        });
        assert!(publish(&post, DateTime::now()).is_err());

        let post = draft_post(PostContent {
            title: Some("Title".to_string()),
            html: Some("".to_string()),
            ..Default::default()
        });
        assert!(publish(&post, DateTime::now()).is_err());
    }

    #[test]
    fn publish_increments_version_by_one() {
        let now = DateTime::now();
        let mut post = draft_post(full_draft());

        let first = publish(&post, now).unwrap();
        assert_eq!(first.version, Some(1));

        post.published = Some(first);
        post.draft = Some(full_draft());
        let second = publish(&post, now).unwrap();
        assert_eq!(second.version, Some(2));
    }

    #[test]
    fn publish_preserves_original_publish_date() {
        let first_date = DateTime::from_millis(1_600_000_000_000);
        let mut post = draft_post(full_draft());
        let first = publish(&post, first_date).unwrap();
        assert_eq!(first.published_at, Some(first_date));

        post.published = Some(first);
        post.draft = Some(full_draft());
        let second = publish(&post, DateTime::now()).unwrap();
        assert_eq!(second.published_at, Some(first_date));
    }

    #[test]
    fn publish_merges_draft_over_published() {
        let now = DateTime::now();
        let mut post = draft_post(full_draft());
        post.published = Some(publish(&post, now).unwrap());

        // Draft only changes the title; body and tags carry over.
        post.draft = Some(PostContent {
            title: Some("New title".to_string()),
            ..Default::default()
        });
        let next = publish(&post, now).unwrap();
        assert_eq!(next.title.as_deref(), Some("New title"));
        assert_eq!(next.html.as_deref(), Some("<p>body</p>"));
        assert_eq!(next.tags, Some(vec!["rust".to_string()]));
    }

    #[test]
    fn summary_is_first_three_sentences() {
        assert_eq!(
            summarize("One. Two. Three. Four. Five."),
            "One. Two. Three."
        );
        assert_eq!(summarize("No periods here"), "No periods here.");
        assert_eq!(summarize("Spaced \n  out. Text. Ok. Nope."), "Spaced out. Text. Ok.");
    }

    #[test]
    fn unpublish_without_published_fails() {
        let post = draft_post(full_draft());
        assert!(unpublish(&post).is_err());
    }

    #[test]
    fn unpublish_restores_draft_when_none_exists() {
        let mut post = draft_post(full_draft());
        let published = publish(&post, DateTime::now()).unwrap();
        post.published = Some(published.clone());
        post.draft = None;

        assert_eq!(
            unpublish(&post).unwrap(),
            UnpublishAction::RestoreDraft(published)
        );
    }

    #[test]
    fn unpublish_keeps_existing_draft() {
        let mut post = draft_post(full_draft());
        post.published = Some(publish(&post, DateTime::now()).unwrap());

        assert_eq!(unpublish(&post).unwrap(), UnpublishAction::KeepDraft);
    }

    #[test]
    fn unpublish_then_publish_restores_prior_content() {
        let now = DateTime::now();
        let mut post = draft_post(full_draft());
        let published = publish(&post, now).unwrap();
        post.published = Some(published.clone());
        post.draft = None;

        // Unpublish with no new edits, then publish straight away.
        let UnpublishAction::RestoreDraft(draft) = unpublish(&post).unwrap() else {
            panic!("expected restored draft");
        };
        post.draft = Some(draft);
        post.published = None;

        let republished = publish(&post, now).unwrap();
        assert_eq!(republished.title, published.title);
        assert_eq!(republished.text, published.text);
        assert_eq!(republished.html, published.html);
        assert_eq!(republished.tags, published.tags);
    }

    #[test]
    fn delete_rejected_while_published() {
        let mut post = draft_post(full_draft());
        post.published = Some(publish(&post, DateTime::now()).unwrap());
        assert!(can_delete(&post).is_err());

        post.published = None;
        assert!(can_delete(&post).is_ok());
    }
}
