use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ContentError, ContentResult};
use crate::models::{Blog, BlogQuery, Faq, FaqCategory, Testimonial};

/// Repository trait for Blog persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create(&self, blog: Blog) -> ContentResult<Blog>;

    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Blog>>;

    /// One page of posts, newest first, plus the total match count
    async fn list(&self, query: BlogQuery) -> ContentResult<(Vec<Blog>, u64)>;

    async fn update(&self, blog: Blog) -> ContentResult<Blog>;

    async fn delete(&self, id: Uuid) -> ContentResult<bool>;
}

/// Repository trait for Testimonial persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn create(&self, testimonial: Testimonial) -> ContentResult<Testimonial>;

    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Testimonial>>;

    /// Newest first; `public_only` keeps approved and active ones
    async fn list(&self, public_only: bool) -> ContentResult<Vec<Testimonial>>;

    /// Newest featured, approved and active testimonials
    async fn featured(&self, limit: usize) -> ContentResult<Vec<Testimonial>>;

    async fn update(&self, testimonial: Testimonial) -> ContentResult<Testimonial>;

    async fn delete(&self, id: Uuid) -> ContentResult<bool>;
}

/// Repository trait for FAQ persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaqRepository: Send + Sync {
    async fn create(&self, faq: Faq) -> ContentResult<Faq>;

    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Faq>>;

    /// Sorted by category then `order`
    async fn list(&self, active_only: bool, category: Option<FaqCategory>)
        -> ContentResult<Vec<Faq>>;

    async fn update(&self, faq: Faq) -> ContentResult<Faq>;

    async fn delete(&self, id: Uuid) -> ContentResult<bool>;
}

/// In-memory implementation of BlogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryBlogRepository {
    blogs: Arc<RwLock<HashMap<Uuid, Blog>>>,
}

impl InMemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogRepository for InMemoryBlogRepository {
    async fn create(&self, blog: Blog) -> ContentResult<Blog> {
        self.blogs.write().await.insert(blog.id, blog.clone());
        tracing::info!(blog_id = %blog.id, "Created blog post");
        Ok(blog)
    }

    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Blog>> {
        Ok(self.blogs.read().await.get(&id).cloned())
    }

    async fn list(&self, query: BlogQuery) -> ContentResult<(Vec<Blog>, u64)> {
        let blogs = self.blogs.read().await;

        let mut matching: Vec<Blog> = blogs.values().filter(|b| b.matches(&query)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.page.skip() as usize)
            .take(query.page.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update(&self, blog: Blog) -> ContentResult<Blog> {
        let mut blogs = self.blogs.write().await;
        if !blogs.contains_key(&blog.id) {
            return Err(ContentError::BlogNotFound);
        }
        blogs.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn delete(&self, id: Uuid) -> ContentResult<bool> {
        let removed = self.blogs.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(blog_id = %id, "Deleted blog post");
        }
        Ok(removed)
    }
}

/// In-memory implementation of TestimonialRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryTestimonialRepository {
    testimonials: Arc<RwLock<HashMap<Uuid, Testimonial>>>,
}

impl InMemoryTestimonialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first<F>(&self, keep: F) -> Vec<Testimonial>
    where
        F: Fn(&Testimonial) -> bool,
    {
        let testimonials = self.testimonials.read().await;
        let mut matching: Vec<Testimonial> =
            testimonials.values().filter(|t| keep(t)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }
}

#[async_trait]
impl TestimonialRepository for InMemoryTestimonialRepository {
    async fn create(&self, testimonial: Testimonial) -> ContentResult<Testimonial> {
        self.testimonials
            .write()
            .await
            .insert(testimonial.id, testimonial.clone());
        tracing::info!(testimonial_id = %testimonial.id, "Created testimonial");
        Ok(testimonial)
    }

    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Testimonial>> {
        Ok(self.testimonials.read().await.get(&id).cloned())
    }

    async fn list(&self, public_only: bool) -> ContentResult<Vec<Testimonial>> {
        Ok(self
            .newest_first(|t| !public_only || (t.is_approved && t.is_active))
            .await)
    }

    async fn featured(&self, limit: usize) -> ContentResult<Vec<Testimonial>> {
        let mut featured = self
            .newest_first(|t| t.featured && t.is_approved && t.is_active)
            .await;
        featured.truncate(limit);
        Ok(featured)
    }

    async fn update(&self, testimonial: Testimonial) -> ContentResult<Testimonial> {
        let mut testimonials = self.testimonials.write().await;
        if !testimonials.contains_key(&testimonial.id) {
            return Err(ContentError::TestimonialNotFound);
        }
        testimonials.insert(testimonial.id, testimonial.clone());
        Ok(testimonial)
    }

    async fn delete(&self, id: Uuid) -> ContentResult<bool> {
        let removed = self.testimonials.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(testimonial_id = %id, "Deleted testimonial");
        }
        Ok(removed)
    }
}

/// In-memory implementation of FaqRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryFaqRepository {
    faqs: Arc<RwLock<HashMap<Uuid, Faq>>>,
}

impl InMemoryFaqRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FaqRepository for InMemoryFaqRepository {
    async fn create(&self, faq: Faq) -> ContentResult<Faq> {
        self.faqs.write().await.insert(faq.id, faq.clone());
        tracing::info!(faq_id = %faq.id, "Created FAQ");
        Ok(faq)
    }

    async fn get_by_id(&self, id: Uuid) -> ContentResult<Option<Faq>> {
        Ok(self.faqs.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        active_only: bool,
        category: Option<FaqCategory>,
    ) -> ContentResult<Vec<Faq>> {
        let faqs = self.faqs.read().await;
        let mut matching: Vec<Faq> = faqs
            .values()
            .filter(|f| !active_only || f.is_active)
            .filter(|f| category.is_none_or(|c| f.category == c))
            .cloned()
            .collect();
        matching.sort_by_key(Faq::sort_key);
        Ok(matching)
    }

    async fn update(&self, faq: Faq) -> ContentResult<Faq> {
        let mut faqs = self.faqs.write().await;
        if !faqs.contains_key(&faq.id) {
            return Err(ContentError::FaqNotFound);
        }
        faqs.insert(faq.id, faq.clone());
        Ok(faq)
    }

    async fn delete(&self, id: Uuid) -> ContentResult<bool> {
        let removed = self.faqs.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(faq_id = %id, "Deleted FAQ");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateFaq;

    fn faq(category: FaqCategory, order: i32) -> Faq {
        Faq::new(CreateFaq {
            question: format!("{category} #{order}"),
            answer: "Yes".to_string(),
            category: Some(category),
            order: Some(order),
            is_active: None,
        })
    }

    #[tokio::test]
    async fn test_faqs_sorted_by_category_then_order() {
        let repo = InMemoryFaqRepository::new();
        for (category, order) in [
            (FaqCategory::Shipping, 2),
            (FaqCategory::General, 1),
            (FaqCategory::Shipping, 1),
        ] {
            repo.create(faq(category, order)).await.unwrap();
        }

        let questions: Vec<_> = repo
            .list(true, None)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.question)
            .collect();
        assert_eq!(questions, ["general #1", "shipping #1", "shipping #2"]);

        let shipping = repo.list(true, Some(FaqCategory::Shipping)).await.unwrap();
        assert_eq!(shipping.len(), 2);
    }
}
