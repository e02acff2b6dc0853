//! Catalog commands.

use mid_shop_core::{ProductId, ProductQuery};

use super::{CliError, Context};
use crate::output;

pub async fn list(
    ctx: &Context,
    category: Option<&str>,
    query: &ProductQuery,
) -> Result<(), CliError> {
    let page = match category {
        Some(category) => ctx.api.products_in_category(category, query).await?,
        None => ctx.api.products(query).await?,
    };
    output::product_page(&page);
    Ok(())
}

pub async fn show(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let product = ctx.api.product(id).await?;
    let favorite = if ctx.session.is_authenticated() {
        ctx.favorites.refresh().await?;
        Some(ctx.favorites.contains(id))
    } else {
        None
    };
    output::product(&product, favorite);
    Ok(())
}

pub async fn categories(ctx: &Context) -> Result<(), CliError> {
    let categories = ctx.api.categories().await?;
    output::categories(&categories);
    Ok(())
}
