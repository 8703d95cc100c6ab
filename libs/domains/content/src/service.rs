//! Blog, Testimonial and FAQ services

use axum_helpers::{public_only, Actor, Paginated, UploadedFile, Visible};
use std::sync::Arc;
use storage::{delete_quietly, folders, SharedStorage};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ContentError, ContentResult};
use crate::models::{
    Blog, BlogFilter, BlogQuery, Comment, CreateBlog, CreateComment, CreateFaq,
    CreateTestimonial, Faq, FaqCategory, Testimonial, UpdateBlog, UpdateFaq, UpdateTestimonial,
    FEATURED_TESTIMONIALS,
};
use crate::repository::{BlogRepository, FaqRepository, TestimonialRepository};

fn validation(e: validator::ValidationErrors) -> ContentError {
    ContentError::Validation(e.to_string())
}

/// Upload `file` and return its URL plus the URL it replaces
async fn replace_image(
    storage: &SharedStorage,
    folder: &str,
    slot: &mut Option<String>,
    file: UploadedFile,
) -> ContentResult<Option<String>> {
    let url = storage
        .upload(folder, &file.file_name, &file.content_type, file.bytes.to_vec())
        .await?;
    Ok(slot.replace(url))
}

/// Blog service
pub struct BlogService<R: BlogRepository> {
    repository: Arc<R>,
    storage: SharedStorage,
}

impl<R: BlogRepository> Clone for BlogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<R: BlogRepository> BlogService<R> {
    pub fn new(repository: R, storage: SharedStorage) -> Self {
        Self {
            repository: Arc::new(repository),
            storage,
        }
    }

    /// Newest posts first; drafts only for admins
    #[instrument(skip(self, filter, actor))]
    pub async fn list(
        &self,
        filter: BlogFilter,
        actor: Option<&Actor>,
    ) -> ContentResult<Paginated<Blog>> {
        let query = BlogQuery::from_filter(filter, public_only(actor));
        let page = query.page;

        let (blogs, total) = self.repository.list(query).await?;
        Ok(Paginated::new(blogs, total, page))
    }

    #[instrument(skip(self, actor))]
    pub async fn get(&self, id: Uuid, actor: Option<&Actor>) -> ContentResult<Blog> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|b| b.is_visible_to(actor))
            .ok_or(ContentError::BlogNotFound)
    }

    async fn load(&self, id: Uuid) -> ContentResult<Blog> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ContentError::BlogNotFound)
    }

    pub async fn comments(&self, id: Uuid, actor: Option<&Actor>) -> ContentResult<Vec<Comment>> {
        Ok(self.get(id, actor).await?.comments)
    }

    #[instrument(skip(self, actor, input))]
    pub async fn add_comment(
        &self,
        id: Uuid,
        actor: Option<&Actor>,
        input: CreateComment,
    ) -> ContentResult<Comment> {
        input.validate().map_err(validation)?;

        let mut blog = self.load(id).await?;
        let comment = blog.add_comment(actor, input)?;
        self.repository.update(blog).await?;

        tracing::info!(blog_id = %id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateBlog) -> ContentResult<Blog> {
        input.validate().map_err(validation)?;
        self.repository.create(Blog::new(input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateBlog) -> ContentResult<Blog> {
        input.validate().map_err(validation)?;

        let mut blog = self.load(id).await?;
        blog.apply_update(input);
        self.repository.update(blog).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ContentResult<()> {
        let blog = self.load(id).await?;
        if !self.repository.delete(id).await? {
            return Err(ContentError::BlogNotFound);
        }

        delete_quietly(self.storage.as_ref(), blog.featured_image).await;
        Ok(())
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn upload_featured_image(&self, id: Uuid, file: UploadedFile) -> ContentResult<Blog> {
        let mut blog = self.load(id).await?;
        let previous =
            replace_image(&self.storage, folders::BLOGS, &mut blog.featured_image, file).await?;
        blog.updated_at = chrono::Utc::now();

        let blog = self.repository.update(blog).await?;
        delete_quietly(self.storage.as_ref(), previous).await;
        Ok(blog)
    }
}

/// Testimonial service
pub struct TestimonialService<R: TestimonialRepository> {
    repository: Arc<R>,
    storage: SharedStorage,
}

impl<R: TestimonialRepository> Clone for TestimonialService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<R: TestimonialRepository> TestimonialService<R> {
    pub fn new(repository: R, storage: SharedStorage) -> Self {
        Self {
            repository: Arc::new(repository),
            storage,
        }
    }

    #[instrument(skip(self, actor))]
    pub async fn list(&self, actor: Option<&Actor>) -> ContentResult<Vec<Testimonial>> {
        self.repository.list(public_only(actor)).await
    }

    #[instrument(skip(self))]
    pub async fn featured(&self) -> ContentResult<Vec<Testimonial>> {
        self.repository.featured(FEATURED_TESTIMONIALS).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ContentResult<Testimonial> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ContentError::TestimonialNotFound)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateTestimonial) -> ContentResult<Testimonial> {
        input.validate().map_err(validation)?;
        self.repository.create(Testimonial::new(input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateTestimonial) -> ContentResult<Testimonial> {
        input.validate().map_err(validation)?;

        let mut testimonial = self.get(id).await?;
        testimonial.apply_update(input);
        self.repository.update(testimonial).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ContentResult<()> {
        let testimonial = self.get(id).await?;
        if !self.repository.delete(id).await? {
            return Err(ContentError::TestimonialNotFound);
        }

        delete_quietly(self.storage.as_ref(), testimonial.image).await;
        Ok(())
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn upload_image(&self, id: Uuid, file: UploadedFile) -> ContentResult<Testimonial> {
        let mut testimonial = self.get(id).await?;
        let previous =
            replace_image(&self.storage, folders::TESTIMONIALS, &mut testimonial.image, file)
                .await?;
        testimonial.updated_at = chrono::Utc::now();

        let testimonial = self.repository.update(testimonial).await?;
        delete_quietly(self.storage.as_ref(), previous).await;
        Ok(testimonial)
    }
}

/// FAQ service
pub struct FaqService<R: FaqRepository> {
    repository: Arc<R>,
}

impl<R: FaqRepository> Clone for FaqService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: FaqRepository> FaqService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, actor))]
    pub async fn list(&self, actor: Option<&Actor>) -> ContentResult<Vec<Faq>> {
        self.repository.list(public_only(actor), None).await
    }

    /// FAQs of one category; `category` is its wire name, e.g. `shipping`
    #[instrument(skip(self, actor))]
    pub async fn by_category(&self, category: &str, actor: Option<&Actor>) -> ContentResult<Vec<Faq>> {
        let category: FaqCategory = category
            .parse()
            .map_err(|_| ContentError::InvalidCategory(category.to_string()))?;

        self.repository
            .list(public_only(actor), Some(category))
            .await
    }

    #[instrument(skip(self, actor))]
    pub async fn get(&self, id: Uuid, actor: Option<&Actor>) -> ContentResult<Faq> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|f| f.is_visible_to(actor))
            .ok_or(ContentError::FaqNotFound)
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateFaq) -> ContentResult<Faq> {
        input.validate().map_err(validation)?;
        self.repository.create(Faq::new(input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateFaq) -> ContentResult<Faq> {
        input.validate().map_err(validation)?;

        let mut faq = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ContentError::FaqNotFound)?;
        faq.apply_update(input);
        self.repository.update(faq).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ContentResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ContentError::FaqNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockBlogRepository, MockFaqRepository, MockTestimonialRepository};
    use mockall::predicate::eq;
    use storage::InMemoryStorage;

    fn draft() -> Blog {
        Blog::new(CreateBlog {
            title: "Upcoming releases".to_string(),
            content: "Soon".to_string(),
            excerpt: None,
            author: "Editor".to_string(),
            category: None,
            tags: None,
            is_published: Some(false),
        })
    }

    #[tokio::test]
    async fn test_comment_on_draft_does_not_save() {
        let blog = draft();
        let id = blog.id;
        let mut repo = MockBlogRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(blog.clone())));
        repo.expect_update().never();

        let service = BlogService::new(repo, Arc::new(InMemoryStorage::new()));
        let result = service
            .add_comment(
                id,
                None,
                CreateComment {
                    name: Some("Kim".to_string()),
                    email: Some("kim@example.com".to_string()),
                    comment: "First".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(ContentError::CommentOnUnpublished)));
    }

    #[tokio::test]
    async fn test_draft_hidden_from_shoppers() {
        let blog = draft();
        let id = blog.id;
        let mut repo = MockBlogRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(blog.clone())));

        let service = BlogService::new(repo, Arc::new(InMemoryStorage::new()));
        assert!(matches!(
            service.get(id, None).await,
            Err(ContentError::BlogNotFound)
        ));
    }

    #[tokio::test]
    async fn test_featured_testimonials_are_capped() {
        let mut repo = MockTestimonialRepository::new();
        repo.expect_featured()
            .with(eq(FEATURED_TESTIMONIALS))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = TestimonialService::new(repo, Arc::new(InMemoryStorage::new()));
        assert!(service.featured().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_faq_category_is_rejected() {
        let mut repo = MockFaqRepository::new();
        repo.expect_list().never();

        let service = FaqService::new(repo);
        let result = service.by_category("refunds", None).await;

        assert!(matches!(result, Err(ContentError::InvalidCategory(c)) if c == "refunds"));
    }

    #[tokio::test]
    async fn test_faq_category_listing_for_admin_includes_inactive() {
        let mut repo = MockFaqRepository::new();
        repo.expect_list()
            .with(eq(false), eq(Some(FaqCategory::Warranty)))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let admin = Actor {
            id: Uuid::now_v7(),
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            role: axum_helpers::Role::Admin,
        };
        let service = FaqService::new(repo);
        service.by_category("warranty", Some(&admin)).await.unwrap();
    }
}
