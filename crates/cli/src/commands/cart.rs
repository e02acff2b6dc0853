//! Cart commands. Each one prints the cart the server answered with.

use mid_shop_core::ProductId;

use super::{CliError, Context};
use crate::output;

pub async fn show(ctx: &Context) -> Result<(), CliError> {
    ctx.require_session()?;
    ctx.cart.fetch_cart().await?;
    output::cart(&ctx.cart.cart());
    Ok(())
}

pub async fn add(ctx: &Context, id: ProductId, quantity: u32) -> Result<(), CliError> {
    ctx.require_session()?;
    let product = ctx.api.product(id).await?;
    ctx.cart.add_item(&product, quantity).await?;
    output::cart(&ctx.cart.cart());
    Ok(())
}

pub async fn update(ctx: &Context, id: ProductId, quantity: i64) -> Result<(), CliError> {
    ctx.require_session()?;
    ctx.cart.update_quantity(id, quantity).await?;
    output::cart(&ctx.cart.cart());
    Ok(())
}

pub async fn remove(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    ctx.require_session()?;
    ctx.cart.remove_item(id).await?;
    output::cart(&ctx.cart.cart());
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<(), CliError> {
    ctx.require_session()?;
    ctx.cart.clear_cart().await?;
    output::message("Cart cleared.");
    Ok(())
}
