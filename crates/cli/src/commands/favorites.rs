//! Favorite product commands.

use mid_shop_core::ProductId;

use super::{CliError, Context};
use crate::output;

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    ctx.require_session()?;
    ctx.favorites.refresh().await?;

    let mut products = Vec::new();
    for id in ctx.favorites.ids() {
        products.push(ctx.api.product(id).await?);
    }
    output::favorites(&products);
    Ok(())
}

pub async fn add(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    ctx.require_session()?;
    ctx.favorites.add(id).await?;
    output::message(&format!("Product {id} added to favorites."));
    Ok(())
}

pub async fn remove(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    ctx.require_session()?;
    ctx.favorites.remove(id).await?;
    output::message(&format!("Product {id} removed from favorites."));
    Ok(())
}

pub async fn toggle(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    ctx.require_session()?;
    // The mark may have changed elsewhere since the last run
    ctx.favorites.refresh().await?;

    if ctx.favorites.toggle(id).await? {
        output::message(&format!("Product {id} added to favorites."));
    } else {
        output::message(&format!("Product {id} removed from favorites."));
    }
    Ok(())
}
