//! Catalog browsing.
//!
//! ```bash
//! mstall products list --category electronics --search lamp --page 2
//! mstall products show 665f1c2e9b1d4a0012ab34cd
//! ```

use clap::Subcommand;
use marketstall_core::{Money, ProductId};
use marketstall_storefront::Storefront;
use marketstall_storefront::listing::ListQuery;
use marketstall_storefront::services::CatalogFilter;
use marketstall_storefront::services::catalog::CATALOG_PAGE_SIZE;

use super::{Result, list_outcome, parse_money};
use crate::output;

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List published products
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = CATALOG_PAGE_SIZE)]
        limit: u32,

        /// Category slug
        #[arg(long)]
        category: Option<String>,

        /// Search term (at least two characters)
        #[arg(long)]
        search: Option<String>,

        /// Sort key understood by the API (e.g. `price_asc`)
        #[arg(long)]
        sort: Option<String>,

        #[arg(long, value_parser = parse_money)]
        min_price: Option<Money>,

        #[arg(long, value_parser = parse_money)]
        max_price: Option<Money>,
    },
    /// Show one product
    Show { id: String },
}

pub async fn run(app: &Storefront, action: ProductsAction) -> Result<()> {
    match action {
        ProductsAction::List {
            page,
            limit,
            category,
            search,
            sort,
            min_price,
            max_price,
        } => {
            let catalog = app.catalog();
            let refresh = catalog
                .load_query(ListQuery {
                    page,
                    limit,
                    search,
                    filter: CatalogFilter {
                        category,
                        sort,
                        min_price,
                        max_price,
                    },
                })
                .await;
            let state = catalog.state().await;
            list_outcome(refresh, &state)?;
            output::products(&state.items);
            output::page_footer(&state);
        }
        ProductsAction::Show { id } => {
            let product = app.catalog().source().get_product(&ProductId::new(id)).await?;
            output::product(&product);
        }
    }
    Ok(())
}
