//! Update merge policies. PUT and PATCH differ only in how they treat blank text,
//! and are kept apart so one cannot leak into the other.

use super::repo_types::{Product, ProductChanges};

/// PUT: every field that was sent overwrites, blank strings included. Unsent fields keep their value.
pub fn apply_full_update(product: &mut Product, changes: ProductChanges) {
    if let Some(name) = changes.name {
        product.name = name.trim().to_string();
    }
    if let Some(description) = changes.description {
        product.description = description;
    }
    if let Some(price) = changes.price {
        product.price = price;
    }
    if let Some(stock) = changes.stock_quantity {
        product.stock_quantity = stock;
    }
    if let Some(category) = changes.category {
        product.category = category;
    }
}

/// PATCH: a field overwrites only if it was sent and, for text, is not blank.
pub fn apply_partial_update(product: &mut Product, changes: ProductChanges) {
    if let Some(name) = present(changes.name) {
        product.name = name.trim().to_string();
    }
    if let Some(description) = present(changes.description) {
        product.description = description;
    }
    if let Some(price) = changes.price {
        product.price = price;
    }
    if let Some(stock) = changes.stock_quantity {
        product.stock_quantity = stock;
    }
    if let Some(category) = present(changes.category) {
        product.category = category;
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn widget() -> Product {
        let now = OffsetDateTime::now_utc();
        Product {
            id: Uuid::new_v4(),
            name: "Widget".into(),
            description: "Small widget".into(),
            price: Decimal::new(999, 2),
            stock_quantity: 5,
            category: "Tools".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn full_update_overwrites_blank_text() {
        let mut p = widget();
        apply_full_update(
            &mut p,
            ProductChanges {
                description: Some(String::new()),
                category: Some(String::new()),
                ..Default::default()
            },
        );
        assert_eq!(p.description, "");
        assert_eq!(p.category, "");
        assert_eq!(p.name, "Widget");
    }

    #[test]
    fn partial_update_ignores_blank_text() {
        let mut p = widget();
        apply_partial_update(
            &mut p,
            ProductChanges {
                name: Some("  ".into()),
                description: Some(String::new()),
                stock_quantity: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(p.name, "Widget");
        assert_eq!(p.description, "Small widget");
        assert_eq!(p.stock_quantity, 2);
    }

    #[test]
    fn both_policies_keep_unsent_fields() {
        let original = widget();
        let mut full = original.clone();
        let mut partial = original.clone();
        apply_full_update(&mut full, ProductChanges::default());
        apply_partial_update(&mut partial, ProductChanges::default());
        assert_eq!(full, original);
        assert_eq!(partial, original);
    }

    #[test]
    fn zero_stock_is_applied() {
        let mut p = widget();
        apply_partial_update(
            &mut p,
            ProductChanges {
                stock_quantity: Some(0),
                ..Default::default()
            },
        );
        assert_eq!(p.stock_quantity, 0);
    }

    #[test]
    fn names_are_trimmed_by_both_policies() {
        let mut full = widget();
        let mut partial = widget();
        let changes = ProductChanges {
            name: Some("  Gadget ".into()),
            ..Default::default()
        };
        apply_full_update(&mut full, changes.clone());
        apply_partial_update(&mut partial, changes);
        assert_eq!(full.name, "Gadget");
        assert_eq!(partial.name, "Gadget");
    }
}
