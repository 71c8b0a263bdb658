use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{ActivityScope, PageRequest, Product, ProductFilter};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock_quantity, category, \
     is_active, created_at, updated_at";

const DELETE_INACTIVE_SQL: &str = "DELETE FROM products WHERE id = $1 AND is_active = FALSE";

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> anyhow::Result<Product>;
    async fn find_by_id(&self, id: Uuid, scope: ActivityScope) -> anyhow::Result<Option<Product>>;
    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> anyhow::Result<Vec<Product>>;
    /// Writes the editable columns and `updated_at` of an active row.
    /// `None` if the row is gone or no longer active.
    async fn update_fields(&self, product: &Product) -> anyhow::Result<Option<Product>>;
    /// Flips `is_active` only if the row currently holds the opposite value.
    /// `touched_at`, when set, replaces `updated_at`. `None` if nothing changed.
    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        touched_at: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<Product>>;
    /// Removes the row only while it is inactive.
    async fn delete_inactive(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, product: &Product) -> anyhow::Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products
                (id, name, description, price, stock_quantity, category, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.stock_quantity)
            .bind(&product.category)
            .bind(product.is_active)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.db)
            .await
            .context("insert product")?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid, scope: ActivityScope) -> anyhow::Result<Option<Product>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = "
        ));
        qb.push_bind(id);
        match scope {
            ActivityScope::Active => {
                qb.push(" AND is_active = TRUE");
            }
            ActivityScope::Inactive => {
                qb.push(" AND is_active = FALSE");
            }
            ActivityScope::Any => {}
        }
        let row = qb
            .build_query_as::<Product>()
            .fetch_optional(&self.db)
            .await
            .context("find product by id")?;
        Ok(row)
    }

    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> anyhow::Result<Vec<Product>> {
        let mut qb = list_query(filter, page);
        let rows = qb
            .build_query_as::<Product>()
            .fetch_all(&self.db)
            .await
            .context("list products")?;
        Ok(rows)
    }

    async fn update_fields(&self, product: &Product) -> anyhow::Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products
               SET name = $2,
                   description = $3,
                   price = $4,
                   stock_quantity = $5,
                   category = $6,
                   updated_at = $7
             WHERE id = $1 AND is_active = TRUE
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.stock_quantity)
            .bind(&product.category)
            .bind(product.updated_at)
            .fetch_optional(&self.db)
            .await
            .context("update product")?;
        Ok(row)
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        touched_at: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products
               SET is_active = $2,
                   updated_at = COALESCE($3, updated_at)
             WHERE id = $1 AND is_active = NOT $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(active)
            .bind(touched_at)
            .fetch_optional(&self.db)
            .await
            .context("set product active flag")?;
        Ok(row)
    }

    async fn delete_inactive(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(DELETE_INACTIVE_SQL)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete product")?;
        Ok(result.rows_affected() > 0)
    }
}

/// Builds the filtered, paginated SELECT. Only bound parameters carry user input.
pub(crate) fn list_query(filter: &ProductFilter, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = "
    ));
    qb.push_bind(filter.active);

    if let Some(category) = &filter.category {
        qb.push(" AND category ILIKE ");
        qb.push_bind(like_pattern(category));
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(threshold) = filter.stock_below {
        qb.push(" AND stock_quantity < ");
        qb.push_bind(threshold);
    }

    // id breaks price ties so consecutive pages never overlap
    qb.push(" ORDER BY price ASC, id ASC LIMIT ");
    qb.push_bind(page.limit());
    qb.push(" OFFSET ");
    qb.push_bind(page.offset());
    qb
}

/// `%term%` with LIKE metacharacters escaped (backslash is the default ESCAPE in Postgres).
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
