use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::ProductStore;
use super::repo_types::{ActivityScope, PageRequest, Product, ProductFilter};

/// Store double backed by a map, with the same filtering and ordering as `PgProductStore`.
#[derive(Default)]
pub struct InMemoryProductStore {
    rows: Mutex<HashMap<Uuid, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<Product> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    /// Sets the flag directly, as another request committing in between would.
    pub fn force_active(&self, id: Uuid, active: bool) {
        if let Some(p) = self.rows.lock().unwrap().get_mut(&id) {
            p.is_active = active;
        }
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: &Product) -> anyhow::Result<Product> {
        let mut rows = self.rows.lock().unwrap();
        anyhow::ensure!(!rows.contains_key(&product.id), "duplicate product id {}", product.id);
        rows.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn find_by_id(&self, id: Uuid, scope: ActivityScope) -> anyhow::Result<Option<Product>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).filter(|p| in_scope(scope, p)).cloned())
    }

    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> anyhow::Result<Vec<Product>> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<Product> = rows.values().filter(|p| matches(filter, p)).cloned().collect();
        matched.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn update_fields(&self, product: &Product) -> anyhow::Result<Option<Product>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(existing) = rows.get_mut(&product.id).filter(|p| p.is_active) else {
            return Ok(None);
        };
        existing.name = product.name.clone();
        existing.description = product.description.clone();
        existing.price = product.price;
        existing.stock_quantity = product.stock_quantity;
        existing.category = product.category.clone();
        existing.updated_at = product.updated_at;
        Ok(Some(existing.clone()))
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        touched_at: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<Product>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(existing) = rows.get_mut(&id).filter(|p| p.is_active != active) else {
            return Ok(None);
        };
        existing.is_active = active;
        if let Some(at) = touched_at {
            existing.updated_at = at;
        }
        Ok(Some(existing.clone()))
    }

    async fn delete_inactive(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows.get(&id).is_some_and(|p| !p.is_active) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

fn in_scope(scope: ActivityScope, p: &Product) -> bool {
    match scope {
        ActivityScope::Active => p.is_active,
        ActivityScope::Inactive => !p.is_active,
        ActivityScope::Any => true,
    }
}

// Mirrors the WHERE clause built by `repo::list_query`.
fn matches(filter: &ProductFilter, p: &Product) -> bool {
    if p.is_active != filter.active {
        return false;
    }
    if let Some(category) = &filter.category {
        if !contains_ignore_case(&p.category, category) {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        if !contains_ignore_case(&p.name, search) && !contains_ignore_case(&p.description, search) {
            return false;
        }
    }
    filter.stock_below.map_or(true, |t| p.stock_quantity < t)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(name: &str, description: &str, category: &str, stock: i32, active: bool) -> Product {
        let now = OffsetDateTime::now_utc();
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            price: Decimal::new(100, 2),
            stock_quantity: stock,
            category: category.into(),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn category_matches_substring_case_insensitively() {
        let f = ProductFilter::new(true, Some("tool".into()), None);
        assert!(matches(&f, &product("Hammer", "", "Power Tools", 3, true)));
        assert!(!matches(&f, &product("Apple", "", "Fruit", 3, true)));
    }

    #[test]
    fn search_hits_name_or_description() {
        let f = ProductFilter::new(true, None, Some("STEEL".into()));
        assert!(matches(&f, &product("Steel rule", "", "Tools", 1, true)));
        assert!(matches(&f, &product("Rule", "stainless steel", "Tools", 1, true)));
        assert!(!matches(&f, &product("Rule", "wooden", "Tools", 1, true)));
    }

    #[test]
    fn active_flag_and_threshold_are_enforced() {
        let f = ProductFilter::new(false, None, None).with_stock_below(5);
        assert!(matches(&f, &product("A", "", "", 4, false)));
        assert!(!matches(&f, &product("A", "", "", 5, false)));
        assert!(!matches(&f, &product("A", "", "", 1, true)));
    }

    #[tokio::test]
    async fn scoped_lookup_respects_active_flag() {
        let store = InMemoryProductStore::new();
        let p = store.insert(&product("A", "", "", 1, false)).await.unwrap();
        assert!(store.find_by_id(p.id, ActivityScope::Active).await.unwrap().is_none());
        assert!(store.find_by_id(p.id, ActivityScope::Inactive).await.unwrap().is_some());
        assert!(store.find_by_id(p.id, ActivityScope::Any).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn field_updates_skip_inactive_rows() {
        let store = InMemoryProductStore::new();
        let p = store.insert(&product("A", "", "", 1, false)).await.unwrap();
        let edited = Product { name: "B".into(), ..p.clone() };
        assert!(store.update_fields(&edited).await.unwrap().is_none());
        assert_eq!(store.get(p.id), Some(p));
    }

    #[tokio::test]
    async fn flag_flip_and_delete_require_the_opposite_state() {
        let store = InMemoryProductStore::new();
        let p = store.insert(&product("A", "", "", 1, true)).await.unwrap();

        assert!(store.set_active(p.id, true, None).await.unwrap().is_none());
        assert!(!store.delete_inactive(p.id).await.unwrap());
        assert!(store.get(p.id).is_some());

        let off = store.set_active(p.id, false, None).await.unwrap().expect("flipped");
        assert!(!off.is_active);
        assert_eq!(off.updated_at, p.updated_at);
        assert!(store.delete_inactive(p.id).await.unwrap());
        assert!(store.get(p.id).is_none());
    }
}
