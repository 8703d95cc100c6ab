//! MongoDB implementations of the content repositories

use async_trait::async_trait;
use database::mongodb::{contains_ci, find_page, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ContentError, ContentResult};
use crate::models::{Blog, BlogQuery, Faq, FaqCategory, Testimonial};
use crate::repository::{BlogRepository, FaqRepository, TestimonialRepository};

fn index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build()
}

/// MongoDB implementation of the BlogRepository
#[derive(Clone)]
pub struct MongoBlogRepository {
    collection: Collection<Blog>,
}

impl MongoBlogRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Blog>("blogs");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> ContentResult<()> {
        let indexes = vec![
            index(doc! { "is_published": 1, "created_at": -1 }, "idx_published_created"),
            index(doc! { "category": 1 }, "idx_category"),
            index(doc! { "tags": 1 }, "idx_tags"),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Blog indexes created successfully");
        Ok(())
    }

    fn build_filter(query: &BlogQuery) -> Document {
        let mut filter = Document::new();

        if query.published_only {
            filter.insert("is_published", true);
        }
        if let Some(category) = &query.category {
            filter.insert("category", category.as_str());
        }
        if let Some(tag) = &query.tag {
            filter.insert("tags", tag.as_str());
        }
        if let Some(term) = &query.search {
            filter.insert(
                "$or",
                vec![
                    doc! { "title": contains_ci(term) },
                    doc! { "content": contains_ci(term) },
                ],
            );
        }

        filter
    }
}

#[async_trait]
impl BlogRepository for MongoBlogRepository {
    #[instrument(skip(self, blog), fields(blog_id = %blog.id))]
    async fn create(&self, blog: Blog) -> ContentResult<Blog> {
        self.collection.insert_one(&blog).await?;
        tracing::info!(blog_id = %blog.id, "Blog post created successfully");
        Ok(blog)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Blog>> {
        let blog = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(blog)
    }

    #[instrument(skip(self, query), fields(page = query.page.page, limit = query.page.limit))]
    async fn list(&self, query: BlogQuery) -> ContentResult<(Vec<Blog>, u64)> {
        let (blogs, total) = find_page(
            &self.collection,
            Self::build_filter(&query),
            doc! { "created_at": -1 },
            query.page.skip(),
            query.page.limit as i64,
        )
        .await?;

        Ok((blogs, total))
    }

    #[instrument(skip(self, blog), fields(blog_id = %blog.id))]
    async fn update(&self, blog: Blog) -> ContentResult<Blog> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(blog.id) }, &blog)
            .await?;

        if result.matched_count == 0 {
            return Err(ContentError::BlogNotFound);
        }

        tracing::info!(blog_id = %blog.id, "Blog post updated successfully");
        Ok(blog)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ContentResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(blog_id = %id, "Blog post deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

/// MongoDB implementation of the TestimonialRepository
#[derive(Clone)]
pub struct MongoTestimonialRepository {
    collection: Collection<Testimonial>,
}

impl MongoTestimonialRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Testimonial>("testimonials");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> ContentResult<()> {
        let indexes = vec![index(
            doc! { "is_approved": 1, "is_active": 1, "featured": 1, "created_at": -1 },
            "idx_public_featured_created",
        )];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Testimonial indexes created successfully");
        Ok(())
    }

    fn public_filter() -> Document {
        doc! { "is_approved": true, "is_active": true }
    }
}

#[async_trait]
impl TestimonialRepository for MongoTestimonialRepository {
    #[instrument(skip(self, testimonial), fields(testimonial_id = %testimonial.id))]
    async fn create(&self, testimonial: Testimonial) -> ContentResult<Testimonial> {
        self.collection.insert_one(&testimonial).await?;
        tracing::info!(testimonial_id = %testimonial.id, "Testimonial created successfully");
        Ok(testimonial)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Testimonial>> {
        let testimonial = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(testimonial)
    }

    #[instrument(skip(self))]
    async fn list(&self, public_only: bool) -> ContentResult<Vec<Testimonial>> {
        let filter = if public_only {
            Self::public_filter()
        } else {
            Document::new()
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?;
        let testimonials: Vec<Testimonial> = cursor.try_collect().await?;
        Ok(testimonials)
    }

    #[instrument(skip(self))]
    async fn featured(&self, limit: usize) -> ContentResult<Vec<Testimonial>> {
        let mut filter = Self::public_filter();
        filter.insert("featured", true);

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .limit(limit as i64)
            .await?;
        let testimonials: Vec<Testimonial> = cursor.try_collect().await?;
        Ok(testimonials)
    }

    #[instrument(skip(self, testimonial), fields(testimonial_id = %testimonial.id))]
    async fn update(&self, testimonial: Testimonial) -> ContentResult<Testimonial> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(testimonial.id) }, &testimonial)
            .await?;

        if result.matched_count == 0 {
            return Err(ContentError::TestimonialNotFound);
        }

        tracing::info!(testimonial_id = %testimonial.id, "Testimonial updated successfully");
        Ok(testimonial)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ContentResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(testimonial_id = %id, "Testimonial deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

/// MongoDB implementation of the FaqRepository
#[derive(Clone)]
pub struct MongoFaqRepository {
    collection: Collection<Faq>,
}

impl MongoFaqRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Faq>("faqs");
        Self { collection }
    }

    pub async fn init_indexes(&self) -> ContentResult<()> {
        let indexes = vec![index(doc! { "category": 1, "order": 1 }, "idx_category_order")];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("FAQ indexes created successfully");
        Ok(())
    }

    fn build_filter(active_only: bool, category: Option<FaqCategory>) -> Document {
        let mut filter = Document::new();
        if active_only {
            filter.insert("is_active", true);
        }
        if let Some(category) = category {
            filter.insert("category", category.to_string());
        }
        filter
    }
}

#[async_trait]
impl FaqRepository for MongoFaqRepository {
    #[instrument(skip(self, faq), fields(faq_id = %faq.id))]
    async fn create(&self, faq: Faq) -> ContentResult<Faq> {
        self.collection.insert_one(&faq).await?;
        tracing::info!(faq_id = %faq.id, "FAQ created successfully");
        Ok(faq)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Faq>> {
        let faq = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(faq)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        active_only: bool,
        category: Option<FaqCategory>,
    ) -> ContentResult<Vec<Faq>> {
        let cursor = self
            .collection
            .find(Self::build_filter(active_only, category))
            .sort(doc! { "category": 1, "order": 1 })
            .await?;
        let faqs: Vec<Faq> = cursor.try_collect().await?;
        Ok(faqs)
    }

    #[instrument(skip(self, faq), fields(faq_id = %faq.id))]
    async fn update(&self, faq: Faq) -> ContentResult<Faq> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(faq.id) }, &faq)
            .await?;

        if result.matched_count == 0 {
            return Err(ContentError::FaqNotFound);
        }

        tracing::info!(faq_id = %faq.id, "FAQ updated successfully");
        Ok(faq)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ContentResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(faq_id = %id, "FAQ deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlogFilter;

    #[test]
    fn test_blog_filter() {
        let query = BlogQuery::from_filter(
            BlogFilter {
                search: Some("lume".to_string()),
                tag: Some("diver".to_string()),
                ..Default::default()
            },
            true,
        );

        let filter = MongoBlogRepository::build_filter(&query);
        assert!(filter.get_bool("is_published").unwrap());
        assert_eq!(filter.get_str("tags").unwrap(), "diver");
        assert_eq!(filter.get_array("$or").unwrap().len(), 2);
        assert!(filter.get("category").is_none());
    }

    #[test]
    fn test_faq_filter_uses_wire_name() {
        let filter = MongoFaqRepository::build_filter(false, Some(FaqCategory::Returns));
        assert_eq!(filter.get_str("category").unwrap(), "returns");
        assert!(filter.get("is_active").is_none());
    }
}
