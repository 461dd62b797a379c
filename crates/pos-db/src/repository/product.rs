//! # Product Repository
//!
//! Catalog CRUD. Deletion is blocked while any sale item references the
//! product, so sale history always resolves.

use std::sync::Arc;

use pos_core::Product;

use crate::error::{DbError, DbResult};
use crate::gateway::{query_one, Gateway, Row, Statement};

/// Fields accepted when creating or updating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    pub stock: i64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub min_stock: i64,
}

const SELECT_PRODUCT: &str = "SELECT id, name, sku, barcode, price_cents, cost_cents, stock, \
     category, description, brand, min_stock, created_at, updated_at FROM products";

pub struct ProductRepository {
    gateway: Arc<dyn Gateway>,
}

impl ProductRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        ProductRepository { gateway }
    }

    /// Lists the catalog, optionally filtered by a search term matched
    /// against name, barcode and SKU, and/or by category.
    pub async fn list(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> DbResult<Vec<Product>> {
        let mut sql = format!("{SELECT_PRODUCT} WHERE 1=1");
        let mut stmt_params: Vec<crate::gateway::SqlValue> = Vec::new();

        if let Some(term) = search {
            sql.push_str(" AND (name LIKE ? OR barcode LIKE ? OR sku LIKE ?)");
            let pattern = format!("%{term}%");
            stmt_params.push(pattern.clone().into());
            stmt_params.push(pattern.clone().into());
            stmt_params.push(pattern.into());
        }
        if let Some(cat) = category {
            sql.push_str(" AND category = ?");
            stmt_params.push(cat.into());
        }
        sql.push_str(" ORDER BY name ASC");

        let stmt = Statement { sql, params: stmt_params };
        let rows = self.gateway.query(stmt).await?;
        rows.iter().map(map_product).collect()
    }

    pub async fn get(&self, id: i64) -> DbResult<Product> {
        let row = query_one(
            self.gateway.as_ref(),
            Statement::new(format!("{SELECT_PRODUCT} WHERE id = ?")).bind(id),
        )
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;
        map_product(&row)
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Product> {
        let row = query_one(
            self.gateway.as_ref(),
            Statement::new(format!("{SELECT_PRODUCT} WHERE barcode = ?")).bind(barcode),
        )
        .await?
        .ok_or_else(|| DbError::not_found("Product", barcode))?;
        map_product(&row)
    }

    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        let now = crate::now_timestamp();
        let result = self
            .gateway
            .execute(
                Statement::new(
                    "INSERT INTO products (name, sku, barcode, price_cents, cost_cents, stock, \
                     category, description, brand, min_stock, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(new.name)
                .bind(new.sku)
                .bind(new.barcode)
                .bind(new.price_cents)
                .bind(new.cost_cents)
                .bind(new.stock)
                .bind(new.category)
                .bind(new.description)
                .bind(new.brand)
                .bind(new.min_stock)
                .bind(now.clone())
                .bind(now),
            )
            .await?;
        self.get(result.last_insert_id).await
    }

    pub async fn update(&self, id: i64, new: NewProduct) -> DbResult<Product> {
        let result = self
            .gateway
            .execute(
                Statement::new(
                    "UPDATE products SET name = ?, sku = ?, barcode = ?, price_cents = ?, \
                     cost_cents = ?, stock = ?, category = ?, description = ?, brand = ?, \
                     min_stock = ?, updated_at = ? WHERE id = ?",
                )
                .bind(new.name)
                .bind(new.sku)
                .bind(new.barcode)
                .bind(new.price_cents)
                .bind(new.cost_cents)
                .bind(new.stock)
                .bind(new.category)
                .bind(new.description)
                .bind(new.brand)
                .bind(new.min_stock)
                .bind(crate::now_timestamp())
                .bind(id),
            )
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("Product", id));
        }
        self.get(id).await
    }

    /// Deletes a product unless sale history references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let referenced = query_one(
            self.gateway.as_ref(),
            Statement::new("SELECT COUNT(*) AS n FROM sale_items WHERE product_id = ?").bind(id),
        )
        .await?
        .map(|r| r.integer("n"))
        .transpose()?
        .unwrap_or(0);

        if referenced > 0 {
            return Err(DbError::Referenced { entity: "Product", id });
        }

        let result = self
            .gateway
            .execute(Statement::new("DELETE FROM products WHERE id = ?").bind(id))
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }
}

pub(crate) fn map_product(row: &Row) -> DbResult<Product> {
    Ok(Product {
        id: row.integer("id")?,
        name: row.text("name")?,
        sku: row.opt_text("sku")?,
        barcode: row.opt_text("barcode")?,
        price_cents: row.integer("price_cents")?,
        cost_cents: row.opt_integer("cost_cents")?,
        stock: row.integer("stock")?,
        category: row.opt_text("category")?,
        description: row.opt_text("description")?,
        brand: row.opt_text("brand")?,
        min_stock: row.integer("min_stock")?,
        created_at: row.text("created_at")?,
        updated_at: row.text("updated_at")?,
    })
}
