//! Terminal rendering of command results.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use mid_shop_core::{Cart, Category, Identity, Product, ProductPage};

use crate::commands::CliError;

pub fn message(text: &str) {
    println!("{text}");
}

pub fn failure(err: &CliError) {
    eprintln!("Error: {}", err.user_message());
}

pub fn session_expired() {
    eprintln!("Your session has expired. Run `mid-shop login` to sign in again.");
}

pub fn signed_in(identity: &Identity) {
    println!("Signed in as {}.", identity.display_name());
}

pub fn identity(identity: &Identity) {
    println!("{} <{}>", identity.display_name(), identity.email);
    println!("  username: {}", identity.username);
}

pub fn product_page(page: &ProductPage) {
    if page.products.is_empty() {
        println!("No products found.");
        return;
    }

    for product in &page.products {
        println!(
            "{:>6}  {:<40}  {:>10}  {}",
            product.id, product.title, product.price, product.category
        );
    }
    println!(
        "\nPage {} of {} ({} products)",
        page.page_index() + 1,
        page.page_count(),
        page.total
    );
}

pub fn product(product: &Product, favorite: Option<bool>) {
    println!("{} (#{})", product.title, product.id);
    if let Some(brand) = &product.brand {
        println!("  brand:    {brand}");
    }
    println!("  category: {}", product.category);
    println!("  price:    {}", product.price);
    if product.discount_percentage > 0.0 {
        println!("  discount: {:.1}%", product.discount_percentage);
    }
    println!("  rating:   {:.2}", product.rating);
    println!("  stock:    {}", product.stock);
    if let Some(favorite) = favorite {
        println!("  favorite: {}", if favorite { "yes" } else { "no" });
    }
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
}

pub fn categories(categories: &[Category]) {
    for category in categories {
        println!("{:<24}  {}", category.slug, category.name);
    }
}

pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in &cart.items {
        println!(
            "{:>6}  {:<40}  {:>4} x {:>10}  {:>10}",
            item.product_id, item.product_title, item.quantity, item.product_price, item.subtotal
        );
    }
    println!("\n{} items, total {}", cart.total_items, cart.total);
}

pub fn favorites(products: &[Product]) {
    if products.is_empty() {
        println!("No favorites yet.");
        return;
    }

    for product in products {
        println!("{:>6}  {:<40}  {:>10}", product.id, product.title, product.price);
    }
}
