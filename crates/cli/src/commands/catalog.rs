//! Catalog browsing commands.

use lindo_core::{CategoryId, Price, ProductId, Wishlist};
use lindo_storefront::error::AppError;
use lindo_storefront::pages::{CategoryPage, ProductPage, SearchPage};
use lindo_storefront::remote::CatalogRemote;
use lindo_storefront::state::Storefront;

use super::{CommandError, fail_on_error, print_products, print_state};

async fn saved_ids(store: &Storefront) -> Wishlist {
    store.shop().load_wishlist().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not load wishlist");
        Wishlist::new()
    })
}

/// `lindo catalog products`
pub async fn products(store: &Storefront) -> Result<(), CommandError> {
    let products = store
        .client()
        .fetch_products()
        .await
        .map_err(AppError::from)?;
    let saved = saved_ids(store).await;
    print_products(&products, |p| saved.contains(&p.id));
    Ok(())
}

/// `lindo catalog home`
#[allow(clippy::print_stdout)]
pub async fn home(store: &Storefront) -> Result<(), CommandError> {
    let client = store.client();
    let (banners, icons, adverts) = tokio::join!(
        client.fetch_banners(),
        client.fetch_icons(),
        client.fetch_adds()
    );

    for banner in banners.map_err(AppError::from)? {
        println!("[banner] {}", banner.title);
    }
    // The shelves still render without icons or promos
    match icons {
        Ok(icons) if !icons.is_empty() => {
            let names: Vec<&str> = icons.iter().map(|i| i.name.as_str()).collect();
            println!("Shop by: {}", names.join(" | "));
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not load icons"),
    }
    match adverts {
        Ok(adverts) => {
            for advert in adverts {
                println!("[promo] {}", advert.title);
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not load promotions"),
    }
    Ok(())
}

/// `lindo catalog categories`
#[allow(clippy::print_stdout)]
pub async fn categories(store: &Storefront) -> Result<(), CommandError> {
    let categories = store
        .client()
        .fetch_categories()
        .await
        .map_err(AppError::from)?;
    for category in categories {
        println!("{:<26} {}", category.id, category.name);
    }
    Ok(())
}

/// `lindo catalog product <id>`
#[allow(clippy::print_stdout)]
pub async fn product(store: &Storefront, id: &str) -> Result<(), CommandError> {
    let mut page = ProductPage::new(store.shop().clone());
    page.load(&ProductId::from(id)).await;

    print_state(page.state(), |view| {
        let product = &view.product;
        let heart = if view.wishlisted { " ♥" } else { "" };
        println!("{}{heart}", product.name);
        println!("{}", Price::rwf(product.price).display());
        if let Some(stock) = product.stock {
            println!("{stock} in stock");
        }
        if !product.description.is_empty() {
            println!();
            println!("{}", product.description);
        }
        if !view.related.is_empty() {
            println!();
            println!("You may also like:");
            print_products(&view.related, |_| false);
        }
    });
    fail_on_error(page.state())
}

/// `lindo catalog search <query>`
#[allow(clippy::print_stdout)]
pub async fn search(store: &Storefront, query: &str) -> Result<(), CommandError> {
    let mut page = SearchPage::new(store.shop().clone());
    page.search(query).await;

    print_state(page.state(), |results| {
        println!("{} result(s) for \"{}\"", results.products.len(), results.query);
        print_products(&results.products, |p| results.wishlist.contains(&p.id));
    });
    if !page.history().is_empty() {
        println!("Recent: {}", page.history().join(", "));
    }
    fail_on_error(page.state())
}

/// `lindo catalog category <id>`
#[allow(clippy::print_stdout)]
pub async fn category(store: &Storefront, id: &str) -> Result<(), CommandError> {
    let mut page = CategoryPage::new(store.shop().clone());
    page.load(&CategoryId::from(id)).await;

    print_state(page.state(), |view| {
        let name = view.category.as_ref().map_or(id, |c| c.name.as_str());
        println!("{name}");
        print_products(&view.products, |p| view.wishlist.contains(&p.id));
    });
    fail_on_error(page.state())
}
