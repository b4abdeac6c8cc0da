//! Terminal rendering for notices and domain objects.

#![allow(clippy::print_stdout)]

use marketstall_core::{Cart, Category, DashboardStats, Order, Product, User};
use marketstall_storefront::listing::ListState;
use marketstall_storefront::notify::{Notice, NoticeLevel, Notifier};

/// Prints notices as they arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let marker = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "--",
            NoticeLevel::Warning => "!!",
            NoticeLevel::Error => "xx",
        };
        match notice.detail {
            Some(detail) if !detail.is_empty() => {
                println!("[{marker}] {}: {detail}", notice.title);
            }
            _ => println!("[{marker}] {}", notice.title),
        }
    }
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for p in products {
        let mut flags = Vec::new();
        if p.published {
            flags.push("published");
        }
        if p.featured {
            flags.push("featured");
        }
        if !p.is_available() {
            flags.push("out of stock");
        }
        println!(
            "{:<26} {:<32} {:>10} {:>5}  {:<16} {}",
            p.id,
            truncate(&p.name, 32),
            p.price.to_string(),
            p.quantity,
            p.category,
            flags.join(", ")
        );
    }
}

pub fn product(p: &Product) {
    println!("{} ({})", p.name, p.id);
    println!("  Price:     {}", p.price);
    println!("  In stock:  {}", p.quantity);
    println!("  Category:  {}", p.category);
    println!("  Published: {}  Featured: {}", p.published, p.featured);
    if !p.description.is_empty() {
        println!("  {}", p.description);
    }
    for url in &p.images {
        println!("  image: {url}");
    }
}

pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:<38} {:<32} {:>3} x {:>9} = {:>10}",
            item.id,
            truncate(&item.product.name, 32),
            item.quantity,
            item.product.price.to_string(),
            item.line_total().to_string()
        );
    }
    println!("{} item(s), total {}", cart.item_count(), cart.total());
}

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders found.");
        return;
    }
    for o in orders {
        let placed = o
            .created_at
            .map_or_else(String::new, |at| at.format("%Y-%m-%d").to_string());
        println!(
            "{:<26} {:<10} {:<18} {:>10} {:>3} unit(s)  {}",
            o.id,
            placed,
            o.status.label(),
            o.total.to_string(),
            o.unit_count(),
            o.customer_email
        );
    }
}

pub fn order(o: &Order) {
    println!("Order {} ({})", o.id, o.status.label());
    if !o.customer_email.is_empty() {
        println!("  Customer: {}", o.customer_email);
    }
    let a = &o.address;
    println!("  Ship to:  {}, {}, {}, {}", a.street, a.city, a.post_code, a.country);
    for item in &o.items {
        println!(
            "  {:>3} x {:<32} {:>10}",
            item.quantity,
            truncate(&item.name, 32),
            item.line_total().to_string()
        );
    }
    println!("  Total:    {}", o.total);
}

pub fn user(u: &User) {
    println!("{} <{}> ({})", u.full_name(), u.email, u.role);
    println!("  Id:     {}", u.id);
    println!("  Active: {}", u.is_active);
    if let Some(a) = u.shipping_address() {
        println!("  Address: {}, {}, {}, {}", a.street, a.city, a.post_code, a.country);
    }
}

pub fn users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    for u in users {
        println!(
            "{:<26} {:<28} {:<32} {:<9} {}",
            u.id,
            truncate(&u.full_name(), 28),
            u.email,
            u.role,
            if u.is_active { "active" } else { "inactive" }
        );
    }
}

pub fn categories(categories: &[Category]) {
    for c in categories {
        println!(
            "{:<14} {:<22} {:>4} product(s){}",
            c.slug,
            c.name,
            c.product_count,
            if c.is_active { "" } else { "  (inactive)" }
        );
    }
}

pub fn dashboard(stats: &DashboardStats) {
    println!("Revenue:   {}", stats.total_revenue);
    println!("Orders:    {} ({} pending)", stats.total_orders, stats.pending_orders);
    println!(
        "Products:  {} ({} published)",
        stats.total_products, stats.published_products
    );
    let o = &stats.order_status;
    println!(
        "By status: pending {}, confirmed {}, processing {}, out for delivery {}, completed {}",
        o.pending, o.confirmed, o.processing, o.out_for_delivery, o.completed
    );
}

/// "Page 2 of 5 (48 total)".
pub fn page_footer<T, F>(state: &ListState<T, F>) {
    if state.total_pages > 0 {
        println!(
            "Page {} of {} ({} total)",
            state.page, state.total_pages, state.total
        );
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Mug", 5), "Mug");
        assert_eq!(truncate("Ceramic Mug", 6), "Ceram~");
    }
}
