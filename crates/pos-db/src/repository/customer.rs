//! Customer registry. Deletion is blocked while sales reference the
//! customer.

use std::sync::Arc;

use pos_core::Customer;

use crate::error::{DbError, DbResult};
use crate::gateway::{query_one, Gateway, Row, Statement};

/// Fields accepted when creating or updating a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

const SELECT_CUSTOMER: &str =
    "SELECT id, name, phone, email, address, created_at, updated_at FROM customers";

pub struct CustomerRepository {
    gateway: Arc<dyn Gateway>,
}

impl CustomerRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        CustomerRepository { gateway }
    }

    /// Lists customers, optionally filtered by name or phone.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Customer>> {
        let stmt = match search {
            Some(term) => {
                let pattern = format!("%{term}%");
                Statement::new(format!(
                    "{SELECT_CUSTOMER} WHERE name LIKE ? OR phone LIKE ? ORDER BY name"
                ))
                .bind(pattern.clone())
                .bind(pattern)
            }
            None => Statement::new(format!("{SELECT_CUSTOMER} ORDER BY name")),
        };
        let rows = self.gateway.query(stmt).await?;
        rows.iter().map(map_customer).collect()
    }

    pub async fn get(&self, id: i64) -> DbResult<Customer> {
        let row = query_one(
            self.gateway.as_ref(),
            Statement::new(format!("{SELECT_CUSTOMER} WHERE id = ?")).bind(id),
        )
        .await?
        .ok_or_else(|| DbError::not_found("Customer", id))?;
        map_customer(&row)
    }

    pub async fn create(&self, new: NewCustomer) -> DbResult<Customer> {
        let now = crate::now_timestamp();
        let result = self
            .gateway
            .execute(
                Statement::new(
                    "INSERT INTO customers (name, phone, email, address, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(new.name)
                .bind(new.phone)
                .bind(new.email)
                .bind(new.address)
                .bind(now.clone())
                .bind(now),
            )
            .await?;
        self.get(result.last_insert_id).await
    }

    pub async fn update(&self, id: i64, new: NewCustomer) -> DbResult<Customer> {
        let result = self
            .gateway
            .execute(
                Statement::new(
                    "UPDATE customers SET name = ?, phone = ?, email = ?, address = ?, \
                     updated_at = ? WHERE id = ?",
                )
                .bind(new.name)
                .bind(new.phone)
                .bind(new.email)
                .bind(new.address)
                .bind(crate::now_timestamp())
                .bind(id),
            )
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("Customer", id));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let referenced = query_one(
            self.gateway.as_ref(),
            Statement::new("SELECT COUNT(*) AS n FROM sales WHERE customer_id = ?").bind(id),
        )
        .await?
        .map(|r| r.integer("n"))
        .transpose()?
        .unwrap_or(0);

        if referenced > 0 {
            return Err(DbError::Referenced { entity: "Customer", id });
        }

        let result = self
            .gateway
            .execute(Statement::new("DELETE FROM customers WHERE id = ?").bind(id))
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("Customer", id));
        }
        Ok(())
    }
}

fn map_customer(row: &Row) -> DbResult<Customer> {
    Ok(Customer {
        id: row.integer("id")?,
        name: row.text("name")?,
        phone: row.opt_text("phone")?,
        email: row.opt_text("email")?,
        address: row.opt_text("address")?,
        created_at: row.text("created_at")?,
        updated_at: row.text("updated_at")?,
    })
}
