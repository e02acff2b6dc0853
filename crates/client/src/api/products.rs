//! Catalog endpoints, cached for the configured TTL.

use mid_shop_core::{Category, Product, ProductId, ProductPage, ProductQuery};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::cache::{self, CATEGORIES_KEY, CacheValue};
use super::{ApiClient, ApiError};

/// Data of `GET /products/categories`.
#[derive(Debug, Deserialize)]
struct CategoryList {
    #[serde(default)]
    categories: serde_json::Value,
}

impl ApiClient {
    /// A page of the full product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        self.product_page(None, query).await
    }

    /// A page of the products in `category` (a category slug).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_in_category(
        &self,
        category: &str,
        query: &ProductQuery,
    ) -> Result<ProductPage, ApiError> {
        self.product_page(Some(category), query).await
    }

    async fn product_page(
        &self,
        category: Option<&str>,
        query: &ProductQuery,
    ) -> Result<ProductPage, ApiError> {
        let cache_key = cache::page_key(category, query);

        // Check cache (search queries are never cached)
        if let (Some(cache), Some(key)) = (&self.inner.cache, &cache_key)
            && let Some(CacheValue::Page(page)) = cache.get(key).await
        {
            debug!("Cache hit for product page");
            return Ok(page);
        }

        let path = category.map_or_else(
            || "products".to_string(),
            |slug| format!("products/category/{}", urlencoding::encode(slug)),
        );
        let mut url = self.endpoint(&path)?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());

        let page: ProductPage = self
            .execute(self.request(Method::GET, url))
            .await?
            .unwrap_or_default();

        if let (Some(cache), Some(key)) = (&self.inner.cache, cache_key) {
            cache.insert(key, CacheValue::Page(page.clone())).await;
        }

        Ok(page)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` (404) or `ApiError::NotFound` if the
    /// product does not exist, or an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = cache::product_key(id);

        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Product(product)) = cache.get(&cache_key).await
        {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/{id}"))?;
        let product: Product = self
            .execute_required(self.request(Method::GET, url), &format!("product {id}"))
            .await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// All product categories in canonical `{slug, name, url}` form.
    ///
    /// Entries that are neither a slug nor a category record are skipped, and
    /// a payload that is not a list yields no categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Categories(categories)) = cache.get(CATEGORIES_KEY).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint("products/categories")?;
        let list: Option<CategoryList> = self.execute(self.request(Method::GET, url)).await?;
        let categories = list.map(|l| normalize_categories(l.categories)).unwrap_or_default();

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(
                    CATEGORIES_KEY.to_string(),
                    CacheValue::Categories(categories.clone()),
                )
                .await;
        }

        Ok(categories)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop every cached catalog response.
    pub async fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }
}

fn normalize_categories(raw: serde_json::Value) -> Vec<Category> {
    let serde_json::Value::Array(entries) = raw else {
        debug!("Categories payload is not a list");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Category>(entry) {
            Ok(category) => Some(category),
            Err(e) => {
                debug!(error = %e, "Skipping unrecognised category entry");
                None
            }
        })
        .collect()
}
