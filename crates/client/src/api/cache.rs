//! Cache types for catalog responses.

use mid_shop_core::{Category, Product, ProductId, ProductPage, ProductQuery};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Page(ProductPage),
    Categories(Vec<Category>),
}

/// Cache key for a single product.
pub fn product_key(id: ProductId) -> String {
    format!("product:{id}")
}

/// Cache key for a listing page, `None` for searches (never cached).
pub fn page_key(category: Option<&str>, query: &ProductQuery) -> Option<String> {
    if query.search_text().is_some() {
        return None;
    }
    Some(format!(
        "products:{}:{}:{}:{}",
        category.unwrap_or(""),
        query.limit,
        query.skip,
        query.sort
    ))
}

/// Cache key for the category list.
pub const CATEGORIES_KEY: &str = "categories";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pages_are_not_cached() {
        let query = ProductQuery::default().with_search("phone");
        assert_eq!(page_key(None, &query), None);
    }

    #[test]
    fn test_page_keys_distinguish_category_and_sort() {
        let query = ProductQuery::page(1, 12);
        let all = page_key(None, &query);
        let laptops = page_key(Some("laptops"), &query);
        let sorted = page_key(None, &query.clone().with_sort("price-desc".parse().unwrap_or_default()));
        assert_ne!(all, laptops);
        assert_ne!(all, sorted);
        assert_eq!(all.as_deref(), Some("products::12:12:id-asc"));
    }
}
