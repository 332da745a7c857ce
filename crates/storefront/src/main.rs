//! Slice House Storefront - terminal ordering front end.
//!
//! # Architecture
//!
//! - `catalog` - the fixed three-pizza menu
//! - `views` - render structs and string renderers for menu/cart/badge
//! - `orders` - order placement with empty-cart validation
//!
//! The cart itself lives in `slice-house-cart`: this binary constructs one
//! [`CartManager`] over a [`FileStore`] at startup, hands it to the
//! presentation code, and re-renders through a subscription after every
//! mutation. The cart survives restarts the way a browser cart survives
//! page reloads.
//!
//! # Commands
//!
//! ```text
//! menu               show the menu
//! cart               show the cart summary
//! add <id>           add one unit of a product
//! remove <id>        remove a line item
//! qty <id> <n>       set a line item quantity (min 1)
//! order              place the order
//! quit               exit
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal front end; stdout is the UI.
#![allow(clippy::print_stdout)]

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use slice_house_cart::{CartManager, CartStore, FileStore, StorageEventBus};
use slice_house_core::{Cart, ProductId};

mod catalog;
mod config;
mod orders;
mod views;

use config::StorefrontConfig;
use views::CartView;

fn main() {
    // Initialize tracing with EnvFilter.
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "slice_house_storefront=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let store: Rc<dyn CartStore> = Rc::new(FileStore::new(&config.data_dir));
    let manager = CartManager::new(store, config.cart_key.clone());

    // Cross-tab event source. A single terminal process has no sibling
    // contexts, but the listener lifecycle (attach here, detach on drop)
    // matches the multi-tab wiring exercised in the integration tests.
    let events = Rc::new(StorageEventBus::new());
    manager.attach(&events);

    // Re-render the header badge on every state change, local or remote.
    manager.subscribe(|cart: &Cart| {
        println!("{}", views::render_badge(cart.item_count()));
    });

    tracing::info!(data_dir = %config.data_dir.display(), key = %config.cart_key, "storefront ready");
    println!("Slice House - type 'menu' to get started, 'help' for commands.");
    println!("{}", views::render_badge(manager.item_count()));

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        }

        if !dispatch(line.trim(), &manager) {
            break;
        }
    }

    manager.detach();
}

/// Handle one command line. Returns `false` when the user quits.
fn dispatch(line: &str, manager: &CartManager) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("menu") => println!("{}", views::render_menu(&catalog::products())),
        Some("cart") => {
            println!("{}", views::render_cart(&CartView::from(&manager.snapshot())));
        }
        Some("add") => match parse_id(parts.next()) {
            Some(id) => match catalog::find(id) {
                Some(product) => manager.add_item(&product),
                None => println!("No product with id {id}"),
            },
            None => println!("Usage: add <id>"),
        },
        Some("remove") => match parse_id(parts.next()) {
            Some(id) => manager.remove_item(id),
            None => println!("Usage: remove <id>"),
        },
        Some("qty") => match (parse_id(parts.next()), parts.next().and_then(|q| q.parse().ok())) {
            (Some(id), Some(qty)) => manager.update_qty(id, qty),
            _ => println!("Usage: qty <id> <n>"),
        },
        Some("order") => match orders::place_order(manager) {
            Ok(confirmation) => println!(
                "Order placed - thank you! {} items, {}",
                confirmation.item_count, confirmation.total
            ),
            Err(e) => println!("{e}"),
        },
        Some("help") => println!("Commands: menu, cart, add <id>, remove <id>, qty <id> <n>, order, quit"),
        Some("quit" | "exit") => return false,
        Some(other) => println!("Unknown command '{other}' - try 'help'"),
    }
    true
}

fn parse_id(arg: Option<&str>) -> Option<ProductId> {
    arg.and_then(|raw| raw.parse::<i32>().ok()).map(ProductId::new)
}
