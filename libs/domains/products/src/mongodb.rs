//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use database::mongodb::{contains_ci, find_page, uuid_bson, uuid_in};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Highlight, Product, ProductQuery, SearchStage, SortKey};
use crate::repository::ProductRepository;

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Product>("products");
        Self { collection }
    }

    /// Initialize indexes for optimal query performance
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        let indexes = vec![
            index(doc! { "is_active": 1, "created_at": -1 }, "idx_active_created"),
            index(doc! { "category_id": 1 }, "idx_category"),
            index(doc! { "brand_id": 1 }, "idx_brand"),
            index(doc! { "ratings": -1 }, "idx_ratings"),
            index(doc! { "name": 1 }, "idx_name"),
            index(doc! { "tags": 1 }, "idx_tags"),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    fn build_filter(query: &ProductQuery) -> Document {
        let mut filter = Document::new();

        if query.public_only {
            filter.insert("is_active", true);
        }
        if let Some(category) = query.category {
            filter.insert("category_id", uuid_bson(category));
        }
        if let Some(brand) = query.brand {
            filter.insert("brand_id", uuid_bson(brand));
        }

        let mut price = Document::new();
        if let Some(min) = query.min_price {
            price.insert("$gte", min);
        }
        if let Some(max) = query.max_price {
            price.insert("$lte", max);
        }
        if !price.is_empty() {
            filter.insert("price", price);
        }

        if let Some(min) = query.min_rating {
            filter.insert("ratings", doc! { "$gte": min });
        }
        if query.in_stock {
            filter.insert("stock", doc! { "$gt": 0 });
        }
        if let Some(featured) = query.featured {
            filter.insert("featured", featured);
        }
        if let Some(flag) = query.is_best_seller {
            filter.insert("is_best_seller", flag);
        }
        if let Some(flag) = query.is_new_arrival {
            filter.insert("is_new_arrival", flag);
        }
        if let Some(gender) = query.gender {
            filter.insert("watch_details.gender", gender.to_string());
        }
        if let Some(movement) = query.movement {
            filter.insert("watch_details.movement", movement.to_string());
        }
        if !query.tags.is_empty() {
            filter.insert("tags", doc! { "$in": query.tags.clone() });
        }
        if let Some(term) = &query.search {
            filter.insert(
                "$or",
                vec![
                    doc! { "name": contains_ci(term) },
                    doc! { "description": contains_ci(term) },
                ],
            );
        }

        filter
    }

    fn build_sort(keys: &[SortKey]) -> Document {
        let mut sort = Document::new();
        for key in keys {
            sort.insert(key.field.to_string(), if key.descending { -1 } else { 1 });
        }
        sort
    }

    fn highlight_filter(shelf: Highlight) -> Document {
        match shelf {
            Highlight::TopRated => doc! { "is_active": true },
            Highlight::Featured => doc! { "is_active": true, "featured": true },
            Highlight::BestSellers => doc! { "is_active": true, "is_best_seller": true },
            Highlight::NewArrivals => doc! { "is_active": true, "is_new_arrival": true },
        }
    }

    fn search_filter(stage: SearchStage, term: &str) -> Document {
        match stage {
            SearchStage::NamePrefix => {
                let mut pattern = contains_ci(term);
                let anchored = pattern
                    .get_str("$regex")
                    .map(|escaped| format!("^{escaped}"))
                    .unwrap_or_default();
                pattern.insert("$regex", anchored);
                doc! { "is_active": true, "name": pattern }
            }
            SearchStage::NameContains => doc! { "is_active": true, "name": contains_ci(term) },
            SearchStage::DescriptionOrTags => doc! {
                "is_active": true,
                "$or": [
                    { "description": contains_ci(term) },
                    { "tags": contains_ci(term) },
                ],
            },
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert_one(&product).await?;
        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?;
        Ok(product)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(doc! { "_id": uuid_in(ids) }).await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        Ok(products)
    }

    #[instrument(skip(self, query), fields(page = query.page.page, limit = query.page.limit))]
    async fn list(&self, query: ProductQuery) -> ProductResult<(Vec<Product>, u64)> {
        let (products, total) = find_page(
            &self.collection,
            Self::build_filter(&query),
            Self::build_sort(&query.sort),
            query.page.skip(),
            query.page.limit as i64,
        )
        .await?;

        Ok((products, total))
    }

    #[instrument(skip(self))]
    async fn highlights(&self, shelf: Highlight) -> ProductResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(Self::build_sort(&[shelf.sort()]))
            .limit(shelf.limit())
            .build();

        let cursor = self
            .collection
            .find(Self::highlight_filter(shelf))
            .with_options(options)
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        stage: SearchStage,
        term: &str,
        limit: i64,
    ) -> ProductResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "name": 1 })
            .limit(limit)
            .build();

        let cursor = self
            .collection
            .find(Self::search_filter(stage, term))
            .with_options(options)
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: Product) -> ProductResult<Product> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(product.id) }, &product)
            .await?;

        if result.matched_count == 0 {
            return Err(ProductError::NotFound);
        }

        tracing::info!(product_id = %product.id, "Product updated successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": uuid_bson(id) }).await?;

        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_brand(&self, brand_id: Uuid) -> ProductResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "brand_id": uuid_bson(brand_id) })
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, ProductFilter};

    #[test]
    fn test_build_filter() {
        let query = ProductQuery::from_filter(
            ProductFilter {
                min_price: Some(1_000),
                in_stock: Some(true),
                gender: Some(Gender::Women),
                tags: Some("dress,gold".to_string()),
                search: Some("moon".to_string()),
                ..Default::default()
            },
            true,
        )
        .unwrap();

        let filter = MongoProductRepository::build_filter(&query);
        assert!(filter.get_bool("is_active").unwrap());
        assert_eq!(
            filter.get_document("price").unwrap().get_i64("$gte").unwrap(),
            1_000
        );
        assert!(!filter.get_document("price").unwrap().contains_key("$lte"));
        assert_eq!(filter.get_str("watch_details.gender").unwrap(), "women");
        assert_eq!(filter.get_document("tags").unwrap().get_array("$in").unwrap().len(), 2);
        assert_eq!(filter.get_array("$or").unwrap().len(), 2);
    }

    #[test]
    fn test_admin_filter_includes_inactive() {
        let query = ProductQuery::from_filter(ProductFilter::default(), false).unwrap();
        assert!(MongoProductRepository::build_filter(&query).is_empty());
    }

    #[test]
    fn test_build_sort_preserves_order() {
        let keys = SortKey::parse_list(Some("-ratings,name")).unwrap();
        let sort = MongoProductRepository::build_sort(&keys);
        let fields: Vec<&String> = sort.keys().collect();
        assert_eq!(fields, ["ratings", "name"]);
        assert_eq!(sort.get_i32("ratings").unwrap(), -1);
    }

    #[test]
    fn test_prefix_search_is_anchored_and_escaped() {
        let filter = MongoProductRepository::search_filter(SearchStage::NamePrefix, "G.M.T");
        let name = filter.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "^G\\.M\\.T");
    }
}
