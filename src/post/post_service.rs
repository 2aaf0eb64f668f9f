use mongodb::bson::{DateTime, Document, doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::database::blog_database;
use crate::post::lifecycle::{self, UnpublishAction};
use crate::post::post_model::{Post, UpdatePostRequest};
use crate::utils::error::CustomError;
use crate::utils::pagination::{Page, paginate};

pub struct PostService {
    collection: Collection<Post>,
}

fn parse_post_id(id: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(id).map_err(|_| CustomError::BadRequestError("Invalid post ID".to_string()))
}

/// Turns draft edits into a `$set` document of `draft.*` paths.
fn build_draft_update(update: &UpdatePostRequest) -> Document {
    let mut set = doc! { "updatedAt": DateTime::now() };
    if let Some(title) = &update.title {
        set.insert("draft.title", title);
    }
    if let Some(text) = &update.text {
        set.insert("draft.text", text);
    }
    if let Some(html) = &update.html {
        set.insert("draft.html", html);
    }
    if let Some(image) = &update.image {
        set.insert("draft.image", image);
    }
    if let Some(tags) = &update.tags {
        set.insert("draft.tags", tags.clone());
    }
    doc! { "$set": set }
}

impl PostService {
    pub fn new(client: &Client) -> Self {
        let collection = blog_database(client).collection::<Post>("posts");
        PostService { collection }
    }

    async fn find(&self, id: &ObjectId) -> Result<Post, CustomError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to fetch post: {}", e)))?
            .ok_or_else(|| CustomError::NotFoundError("Post does not exist".to_string()))
    }

    pub async fn create_post(&self) -> Result<Post, CustomError> {
        let post = Post::new();
        self.collection
            .insert_one(&post)
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to create post: {}", e)))?;
        Ok(post)
    }

    pub async fn list_drafts(&self, page: u64, limit: i64) -> Result<Page<Post>, CustomError> {
        paginate(
            &self.collection,
            doc! { "draft": { "$exists": true } },
            doc! { "createdAt": -1 },
            page,
            limit,
        )
        .await
    }

    /// Published posts, newest first, with drafts stripped from the
    /// returned documents.
    pub async fn list_published(
        &self,
        page: u64,
        limit: i64,
        search: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Page<Post>, CustomError> {
        let mut filter = doc! { "published": { "$exists": true } };
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            let pattern = regex::escape(search);
            let rgx = doc! { "$regex": &pattern, "$options": "i" };
            filter.insert(
                "$or",
                vec![
                    doc! { "published.text": rgx.clone() },
                    doc! { "published.title": rgx.clone() },
                    doc! { "published.tags": rgx },
                ],
            );
        }
        if let Some(tag) = tag.filter(|t| !t.is_empty()) {
            filter.insert("published.tags", tag);
        }

        let mut result = paginate(&self.collection, filter, doc! { "createdAt": -1 }, page, limit).await?;
        for post in &mut result.items {
            post.draft = None;
        }
        Ok(result)
    }

    pub async fn get_published(&self, id: &str) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        let mut post = self
            .collection
            .find_one(doc! { "_id": object_id, "published": { "$exists": true } })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to fetch post: {}", e)))?
            .ok_or_else(|| CustomError::NotFoundError("Post does not exist".to_string()))?;
        post.draft = None;
        Ok(post)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        self.find(&object_id).await
    }

    pub async fn update_draft(
        &self,
        id: &str,
        update: &UpdatePostRequest,
    ) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        self.collection
            .find_one_and_update(doc! { "_id": object_id }, build_draft_update(update))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to update post: {}", e)))?
            .ok_or_else(|| CustomError::NotFoundError("Post does not exist".to_string()))
    }

    pub async fn delete_draft(&self, id: &str) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        self.collection
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$unset": { "draft": 1 } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to update post: {}", e)))?
            .ok_or_else(|| CustomError::NotFoundError("Post does not exist".to_string()))
    }

    /// Merges the draft into the published version, clears the draft
    /// and bumps the version counter.
    pub async fn publish(&self, id: &str) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        let post = self.find(&object_id).await?;

        let version = lifecycle::publish(&post, DateTime::now())?;
        let version_bson = to_bson(&version)
            .map_err(|e| CustomError::InternalServerError(format!("Failed to serialize post: {}", e)))?;

        self.collection
            .update_one(
                doc! { "_id": object_id },
                doc! { "$unset": { "draft": true }, "$set": { "published": version_bson } },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to publish post: {}", e)))?;

        self.find(&object_id).await
    }

    /// Removes the published version; when no draft exists the
    /// published content is moved back into the draft.
    pub async fn unpublish(&self, id: &str) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        let post = self.find(&object_id).await?;

        let update = match lifecycle::unpublish(&post)? {
            UnpublishAction::RestoreDraft(content) => {
                let content_bson = to_bson(&content).map_err(|e| {
                    CustomError::InternalServerError(format!("Failed to serialize post: {}", e))
                })?;
                doc! { "$set": { "draft": content_bson }, "$unset": { "published": 1 } }
            }
            UnpublishAction::KeepDraft => doc! { "$unset": { "published": 1 } },
        };

        self.collection
            .update_one(doc! { "_id": object_id }, update)
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to unpublish post: {}", e)))?;

        self.find(&object_id).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<Post, CustomError> {
        let object_id = parse_post_id(id)?;
        let post = self.find(&object_id).await?;
        lifecycle::can_delete(&post)?;

        self.collection
            .delete_one(doc! { "_id": object_id })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to delete post: {}", e)))?;

        Ok(post)
    }

    pub async fn distinct_tags(&self) -> Result<Vec<String>, CustomError> {
        let tags = self
            .collection
            .distinct("published.tags", doc! { "published": { "$exists": true } })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to fetch tags: {}", e)))?;

        Ok(tags
            .into_iter()
            .filter_map(|tag| tag.as_str().map(|s| s.to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_update_uses_prefixed_paths() {
        let update = UpdatePostRequest {
            title: Some("Hello".to_string()),
            text: None,
            html: Some("<p>hi</p>".to_string()),
            image: None,
            tags: Some(vec!["a".to_string(), "b".to_string()]),
        };

        let doc = build_draft_update(&update);
        let set = doc.get_document("$set").unwrap();
        assert_eq!(set.get_str("draft.title").unwrap(), "Hello");
        assert_eq!(set.get_str("draft.html").unwrap(), "<p>hi</p>");
        assert!(set.get_array("draft.tags").is_ok());
        assert!(set.get("draft.text").is_none());
        assert!(set.get("draft.image").is_none());
        assert!(set.get("updatedAt").is_some());
    }

    #[test]
    fn invalid_post_id_is_a_bad_request() {
        assert!(matches!(
            parse_post_id("nope"),
            Err(CustomError::BadRequestError(_))
        ));
        assert!(parse_post_id("64f000000000000000000001").is_ok());
    }
}
