//! Product Service - Business logic layer

use axum_helpers::{Actor, PageQuery, Paginated, UploadedFile, Visible};
use std::sync::Arc;
use storage::{delete_quietly, folders, SharedStorage};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, CreateReview, Highlight, Product, ProductFilter, ProductQuery, ReviewAdded,
    SearchParams, SearchStage, UpdateProduct, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT,
};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    storage: SharedStorage,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, storage: SharedStorage) -> Self {
        Self {
            repository: Arc::new(repository),
            storage,
        }
    }

    /// Filtered, sorted page of products; inactive ones only for admins
    #[instrument(skip(self, filter, actor))]
    pub async fn list(
        &self,
        filter: ProductFilter,
        actor: Option<&Actor>,
    ) -> ProductResult<Paginated<Product>> {
        let public_only = !actor.is_some_and(Actor::is_admin);
        let query = ProductQuery::from_filter(filter, public_only)?;
        let page: PageQuery = query.page;

        let (products, total) = self.repository.list(query).await?;
        Ok(Paginated::new(products, total, page))
    }

    #[instrument(skip(self, actor))]
    pub async fn get(&self, id: Uuid, actor: Option<&Actor>) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|p| p.is_visible_to(actor))
            .ok_or(ProductError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn highlights(&self, shelf: Highlight) -> ProductResult<Vec<Product>> {
        self.repository.highlights(shelf).await
    }

    /// Quick search: the first stage of [`SearchStage::CHAIN`] with any hits wins
    #[instrument(skip(self))]
    pub async fn search(&self, params: SearchParams) -> ProductResult<Vec<Product>> {
        let term = params.q.as_deref().map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(ProductError::EmptySearch);
        }
        let limit = params
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT);

        for stage in SearchStage::CHAIN {
            let hits = self.repository.search(stage, term, limit).await?;
            if !hits.is_empty() {
                tracing::debug!(%stage, hits = hits.len(), "Search matched");
                return Ok(hits);
            }
        }

        Ok(Vec::new())
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        self.repository.create(Product::new(input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let mut product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;
        product.apply_update(input);

        self.repository.update(product).await
    }

    /// Delete a product and its images
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ProductResult<()> {
        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;

        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound);
        }

        delete_quietly(self.storage.as_ref(), &product.images).await;
        Ok(())
    }

    /// Replace the product's images with `files`
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_images(&self, id: Uuid, files: Vec<UploadedFile>) -> ProductResult<Product> {
        let mut product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;

        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let uploaded = self
                .storage
                .upload(
                    folders::PRODUCTS,
                    &file.file_name,
                    &file.content_type,
                    file.bytes.to_vec(),
                )
                .await;
            match uploaded {
                Ok(url) => urls.push(url),
                Err(e) => {
                    delete_quietly(self.storage.as_ref(), &urls).await;
                    return Err(e.into());
                }
            }
        }

        let previous = std::mem::replace(&mut product.images, urls);
        product.updated_at = chrono::Utc::now();

        let product = self.repository.update(product).await?;
        delete_quietly(self.storage.as_ref(), &previous).await;

        tracing::info!(product_id = %id, images = product.images.len(), "Product images replaced");
        Ok(product)
    }

    /// One review per user; refreshes the product's rating summary
    #[instrument(skip(self, actor, input), fields(user_id = %actor.id))]
    pub async fn add_review(
        &self,
        id: Uuid,
        actor: &Actor,
        input: CreateReview,
    ) -> ProductResult<ReviewAdded> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let mut product = self.get(id, Some(actor)).await?;
        product.add_review(actor.id, &actor.name, input)?;

        let product = self.repository.update(product).await?;
        tracing::info!(product_id = %id, ratings = product.ratings, "Review added");

        Ok(ReviewAdded {
            message: "Review added".to_string(),
            num_reviews: product.num_reviews,
            ratings: product.ratings,
        })
    }
}
