//! Category listing.

use marketstall_storefront::Storefront;

use crate::output;

/// Print categories. Shoppers see active ones only.
pub fn run(app: &Storefront, admin: bool) {
    let categories = app.categories();
    categories.initialize();
    if admin {
        output::categories(&categories.for_admin());
    } else {
        output::categories(&categories.for_user());
    }
}
