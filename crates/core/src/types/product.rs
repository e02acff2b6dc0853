//! Catalog types: products, paginated listings, categories and list queries.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::money::Money;

// =============================================================================
// Products
// =============================================================================

/// A product as returned by `GET /products/{id}` and the listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_information: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_information: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_policy: Option<String>,
}

/// One page of a product listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total number of products matching the query across all pages.
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl ProductPage {
    /// Number of pages needed to show `total` products at this page's limit.
    #[must_use]
    pub const fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }

    /// Zero-based index of this page.
    #[must_use]
    pub const fn page_index(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.skip / self.limit
    }
}

// =============================================================================
// Categories
// =============================================================================

/// A product category in canonical form.
///
/// The categories endpoint has returned both bare slugs (`"smartphones"`)
/// and records (`{"slug", "name", "url"}`). Both decode into this type so
/// nothing downstream has to care which shape the server used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Category {
    /// Build a category from a bare slug, deriving a display name.
    #[must_use]
    pub fn from_slug(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        let name = display_name(&slug);
        Self {
            slug,
            name,
            url: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCategory {
    Slug(String),
    Record {
        slug: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawCategory::deserialize(deserializer)? {
            RawCategory::Slug(slug) => Self::from_slug(slug),
            RawCategory::Record { slug, name, url } => {
                let name = name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| display_name(&slug));
                Self { slug, name, url }
            }
        })
    }
}

/// `"home-decoration"` -> `"Home Decoration"`.
fn display_name(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Listing queries
// =============================================================================

/// Field a listing is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortField {
    #[default]
    Id,
    Title,
    Price,
    Rating,
}

impl SortField {
    /// Value sent in the `sortBy` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Price => "price",
            Self::Rating => "rating",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Value sent in the `order` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Error parsing a `<field>-<order>` sort expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortParseError {
    #[error("sort must look like <field>-<order>, got '{0}'")]
    Malformed(String),
    #[error("unknown sort field '{0}' (expected id, title, price or rating)")]
    UnknownField(String),
    #[error("unknown sort order '{0}' (expected asc or desc)")]
    UnknownOrder(String),
}

/// Sort order of a listing, written as `id-asc`, `price-desc`, ...
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProductSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl FromStr for ProductSort {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| SortParseError::Malformed(s.to_owned()))?;

        let field = match field.to_ascii_lowercase().as_str() {
            "id" => SortField::Id,
            "title" => SortField::Title,
            "price" => SortField::Price,
            "rating" => SortField::Rating,
            _ => return Err(SortParseError::UnknownField(field.to_owned())),
        };
        let order = match order.to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Err(SortParseError::UnknownOrder(order.to_owned())),
        };

        Ok(Self { field, order })
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.field.as_str(), self.order.as_str())
    }
}

/// Parameters of a product listing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub limit: u32,
    pub skip: u32,
    pub sort: ProductSort,
    /// Free-text search. Blank strings are treated as no search.
    pub search: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_PAGE_SIZE,
            skip: 0,
            sort: ProductSort::default(),
            search: None,
        }
    }
}

impl ProductQuery {
    /// Page size used by the product listing unless the caller picks one.
    pub const DEFAULT_PAGE_SIZE: u32 = 12;

    /// Query for the zero-based `page` of `page_size` products.
    #[must_use]
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            limit: page_size,
            skip: page.saturating_mul(page_size),
            ..Self::default()
        }
    }

    /// Set the sort order.
    #[must_use]
    pub const fn with_sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }

    /// Set the search text.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The search text, if it is not blank.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Query string pairs in the order the API documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("skip", self.skip.to_string()),
            ("sortBy", self.sort.field.as_str().to_owned()),
            ("order", self.sort.order.as_str().to_owned()),
        ];
        if let Some(search) = self.search_text() {
            pairs.push(("search", search.to_owned()));
        }
        pairs
    }
}
