use axum_helpers::{Actor, PageQuery, Visible};
use chrono::{DateTime, Utc};
use database::mongodb::serde_helpers::{datetime, option_datetime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ContentError, ContentResult};

pub const FEATURED_TESTIMONIALS: usize = 6;

fn default_true() -> bool {
    true
}

// Blogs

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    /// Set when the commenter was signed in
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub comment: String,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Blog {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub author: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
    #[serde(default, with = "option_datetime")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    pub fn new(input: CreateBlog) -> Self {
        let now = Utc::now();
        let is_published = input.is_published.unwrap_or(true);
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            content: input.content,
            excerpt: input.excerpt.unwrap_or_default(),
            author: input.author,
            featured_image: None,
            category: input.category,
            tags: input.tags.unwrap_or_default(),
            is_published,
            published_at: is_published.then_some(now),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply present fields; `published_at` is stamped the first time the post goes live
    pub fn apply_update(&mut self, update: UpdateBlog) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(excerpt) = update.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(is_published) = update.is_published {
            self.is_published = is_published;
        }

        let now = Utc::now();
        if self.is_published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.updated_at = now;
    }

    /// Append a comment; a signed-in actor fills in a missing name or email
    pub fn add_comment(
        &mut self,
        actor: Option<&Actor>,
        input: CreateComment,
    ) -> ContentResult<Comment> {
        if !self.is_published {
            return Err(ContentError::CommentOnUnpublished);
        }

        let name = input.name.or_else(|| actor.map(|a| a.name.clone()));
        let email = input.email.or_else(|| actor.map(|a| a.email.clone()));
        let (Some(name), Some(email)) = (name, email) else {
            return Err(ContentError::MissingCommenter);
        };

        let comment = Comment {
            id: Uuid::now_v7(),
            user_id: actor.map(|a| a.id),
            name,
            email,
            comment: input.comment,
            created_at: Utc::now(),
        };
        self.comments.push(comment.clone());
        self.updated_at = Utc::now();
        Ok(comment)
    }

    pub fn matches(&self, query: &BlogQuery) -> bool {
        if query.published_only && !self.is_published {
            return false;
        }
        if let Some(category) = &query.category {
            if self.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(tag) = &query.tag {
            if !self.tags.contains(tag) {
                return false;
            }
        }
        if let Some(term) = &query.search {
            let term = term.to_lowercase();
            if !self.title.to_lowercase().contains(&term)
                && !self.content.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}

impl Visible for Blog {
    fn is_public(&self) -> bool {
        self.is_published
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBlog {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBlog {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub comment: String,
}

/// Query parameters for listing blog posts
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BlogFilter {
    /// Case-insensitive match on title or content
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub published_only: bool,
    pub page: PageQuery,
}

impl BlogQuery {
    pub fn from_filter(filter: BlogFilter, published_only: bool) -> Self {
        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            search: non_empty(filter.search),
            category: non_empty(filter.category),
            tag: non_empty(filter.tag),
            published_only,
            page: PageQuery::new(filter.page, filter.limit),
        }
    }
}

// Testimonials

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Testimonial {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub content: String,
    pub rating: u8,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Testimonial {
    pub fn new(input: CreateTestimonial) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            position: input.position,
            company: input.company,
            image: None,
            content: input.content,
            rating: input.rating,
            is_approved: input.is_approved.unwrap_or(false),
            is_active: input.is_active.unwrap_or(true),
            featured: input.featured.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateTestimonial) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(position) = update.position {
            self.position = Some(position);
        }
        if let Some(company) = update.company {
            self.company = Some(company);
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(is_approved) = update.is_approved {
            self.is_approved = is_approved;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        self.updated_at = Utc::now();
    }
}

impl Visible for Testimonial {
    fn is_public(&self) -> bool {
        self.is_approved && self.is_active
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateTestimonial {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub position: Option<String>,
    pub company: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    pub is_approved: Option<bool>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTestimonial {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub content: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<u8>,
    pub is_approved: Option<bool>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
}

// FAQs

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FaqCategory {
    #[default]
    General,
    Product,
    Shipping,
    Payment,
    Warranty,
    Returns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Faq {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: FaqCategory,
    /// Position within the category, ascending
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Faq {
    pub fn new(input: CreateFaq) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            question: input.question,
            answer: input.answer,
            category: input.category.unwrap_or_default(),
            order: input.order.unwrap_or(0),
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateFaq) {
        if let Some(question) = update.question {
            self.question = question;
        }
        if let Some(answer) = update.answer {
            self.answer = answer;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }

    /// Listing order: category name, then `order`
    pub fn sort_key(&self) -> (String, i32) {
        (self.category.to_string(), self.order)
    }
}

impl Visible for Faq {
    fn is_public(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateFaq {
    #[validate(length(min = 1, max = 500))]
    pub question: String,
    #[validate(length(min = 1, max = 5000))]
    pub answer: String,
    pub category: Option<FaqCategory>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateFaq {
    #[validate(length(min = 1, max = 500))]
    pub question: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub answer: Option<String>,
    pub category: Option<FaqCategory>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::Role;

    fn post(is_published: bool) -> Blog {
        Blog::new(CreateBlog {
            title: "Caring for a mechanical watch".to_string(),
            content: "Wind it daily".to_string(),
            excerpt: None,
            author: "Editor".to_string(),
            category: Some("care".to_string()),
            tags: Some(vec!["maintenance".to_string()]),
            is_published: Some(is_published),
        })
    }

    fn comment(name: Option<&str>, email: Option<&str>) -> CreateComment {
        CreateComment {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            comment: "Helpful".to_string(),
        }
    }

    #[test]
    fn test_publish_stamps_once() {
        let mut draft = post(false);
        assert!(draft.published_at.is_none());

        draft.apply_update(UpdateBlog {
            is_published: Some(true),
            ..Default::default()
        });
        let first = draft.published_at.unwrap();

        draft.apply_update(UpdateBlog {
            title: Some("Winding".to_string()),
            ..Default::default()
        });
        assert_eq!(draft.published_at, Some(first));
    }

    #[test]
    fn test_comment_identity() {
        let mut blog = post(true);

        let anonymous = blog.add_comment(None, comment(Some("Kim"), None));
        assert!(matches!(anonymous, Err(ContentError::MissingCommenter)));

        let actor = Actor {
            id: Uuid::now_v7(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::User,
        };
        let added = blog
            .add_comment(Some(&actor), comment(Some("A. L."), None))
            .unwrap();
        assert_eq!(added.name, "A. L.");
        assert_eq!(added.email, "ada@example.com");
        assert_eq!(added.user_id, Some(actor.id));
        assert_eq!(blog.comments.len(), 1);
    }

    #[test]
    fn test_no_comments_on_drafts() {
        let mut draft = post(false);
        let result = draft.add_comment(None, comment(Some("Kim"), Some("kim@example.com")));
        assert!(matches!(result, Err(ContentError::CommentOnUnpublished)));
    }

    #[test]
    fn test_blog_query_matching() {
        let blog = post(true);
        let query = |filter: BlogFilter| BlogQuery::from_filter(filter, true);

        assert!(blog.matches(&query(BlogFilter {
            search: Some("DAILY".to_string()),
            ..Default::default()
        })));
        assert!(blog.matches(&query(BlogFilter {
            tag: Some("maintenance".to_string()),
            category: Some("care".to_string()),
            ..Default::default()
        })));
        assert!(!blog.matches(&query(BlogFilter {
            category: Some("news".to_string()),
            ..Default::default()
        })));
        assert!(!post(false).matches(&query(BlogFilter::default())));
    }

    #[test]
    fn test_faq_category_parsing() {
        assert_eq!("returns".parse::<FaqCategory>().unwrap(), FaqCategory::Returns);
        assert!("refunds".parse::<FaqCategory>().is_err());
        assert_eq!(FaqCategory::default().to_string(), "general");
    }

    #[test]
    fn test_testimonial_visibility_needs_approval() {
        let mut testimonial = Testimonial::new(CreateTestimonial {
            name: "Jo".to_string(),
            position: None,
            company: None,
            content: "Great service".to_string(),
            rating: 5,
            is_approved: None,
            is_active: None,
            featured: None,
        });
        assert!(!testimonial.is_public());

        testimonial.is_approved = true;
        assert!(testimonial.is_public());
    }
}
