use axum_helpers::Visible;
use chrono::{DateTime, Utc};
use database::mongodb::serde_helpers::datetime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

/// Product category; at most one level of nesting is rendered in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(input: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description.unwrap_or_default(),
            image: None,
            parent_id: input.parent_id,
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateCategory) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(parent_id) = update.parent_id {
            self.parent_id = Some(parent_id);
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

impl Visible for Category {
    fn is_public(&self) -> bool {
        self.is_active
    }
}

/// A top-level category with its direct children
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Category>,
}

/// Group `categories` under their top-level parents.
///
/// Children whose parent is missing from the input (e.g. an inactive parent
/// filtered out for shoppers) are dropped along with it.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let (roots, children): (Vec<_>, Vec<_>) =
        categories.into_iter().partition(|c| c.parent_id.is_none());

    roots
        .into_iter()
        .map(|category| {
            let subcategories = children
                .iter()
                .filter(|child| child.parent_id == Some(category.id))
                .cloned()
                .collect();
            CategoryNode {
                category,
                subcategories,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Watch manufacturer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Public URL of the uploaded logo
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(with = "datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(input: CreateBrand) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description.unwrap_or_default(),
            logo: None,
            featured: input.featured.unwrap_or(false),
            is_active: input.is_active.unwrap_or(true),
            country: input.country,
            founded_year: input.founded_year,
            website: input.website,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateBrand) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(country) = update.country {
            self.country = Some(country);
        }
        if let Some(founded_year) = update.founded_year {
            self.founded_year = Some(founded_year);
        }
        if let Some(website) = update.website {
            self.website = Some(website);
        }
        self.updated_at = Utc::now();
    }
}

impl Visible for Brand {
    fn is_public(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateBrand {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub featured: Option<bool>,
    pub is_active: Option<bool>,
    pub country: Option<String>,
    #[validate(range(min = 1700, max = 2100))]
    pub founded_year: Option<i32>,
    #[validate(url)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBrand {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub featured: Option<bool>,
    pub is_active: Option<bool>,
    pub country: Option<String>,
    #[validate(range(min = 1700, max = 2100))]
    pub founded_year: Option<i32>,
    #[validate(url)]
    pub website: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        Category::new(CreateCategory {
            name: name.to_string(),
            description: None,
            parent_id,
            is_active: None,
        })
    }

    #[test]
    fn test_build_tree_groups_children() {
        let dress = category("Dress", None);
        let sport = category("Sport", None);
        let diver = category("Diver", Some(sport.id));
        let chrono = category("Chronograph", Some(sport.id));
        let orphan = category("Orphan", Some(Uuid::now_v7()));

        let tree = build_tree(vec![dress.clone(), diver, sport.clone(), chrono, orphan]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.id, dress.id);
        assert!(tree[0].subcategories.is_empty());
        assert_eq!(tree[1].category.id, sport.id);
        let names: Vec<_> = tree[1].subcategories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Diver", "Chronograph"]);
    }

    #[test]
    fn test_node_flattens_category_fields() {
        let node = CategoryNode {
            category: category("Dress", None),
            subcategories: vec![],
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["name"], "Dress");
        assert!(json["subcategories"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_brand_update_keeps_absent_fields() {
        let mut brand = Brand::new(CreateBrand {
            name: " Omega ".to_string(),
            description: Some("Biel".to_string()),
            featured: Some(true),
            is_active: None,
            country: Some("CH".to_string()),
            founded_year: Some(1848),
            website: None,
        });
        assert_eq!(brand.name, "Omega");

        brand.apply_update(UpdateBrand {
            featured: Some(false),
            ..Default::default()
        });
        assert!(!brand.featured);
        assert!(brand.is_active);
        assert_eq!(brand.founded_year, Some(1848));
    }
}
