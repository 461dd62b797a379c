//! # Schema Creation and Seeding
//!
//! The schema is applied through the gateway with idempotent
//! `CREATE TABLE IF NOT EXISTS` statements so both backends are
//! initialized identically. Monetary columns are integer cents.
//!
//! ## Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  users        cashiers and admins (argon2 password hashes)          │
//! │  products     catalog with price_cents and live stock               │
//! │  sales        one row per checkout, totals in cents                 │
//! │  sale_items   price-snapshot line items (CASCADE with sale)         │
//! │  payments     append-only payment ledger per sale                   │
//! │  customers    optional walk-in customer registry                    │
//! │  settings     key/value store (vat_rate, currency, receipt text)    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::error::DbResult;
use crate::gateway::{Gateway, Statement};

const CREATE_USERS: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'cashier' CHECK (role IN ('admin', 'cashier')),
        full_name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )";

const CREATE_PRODUCTS: &str = "
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        sku TEXT,
        barcode TEXT UNIQUE,
        price_cents INTEGER NOT NULL,
        cost_cents INTEGER,
        stock INTEGER NOT NULL DEFAULT 0,
        category TEXT,
        description TEXT,
        brand TEXT,
        min_stock INTEGER NOT NULL DEFAULT 5,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )";

const CREATE_SALES: &str = "
    CREATE TABLE IF NOT EXISTS sales (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        cashier_id INTEGER NOT NULL REFERENCES users(id),
        customer_id INTEGER REFERENCES customers(id),
        total_cents INTEGER NOT NULL,
        vat_cents INTEGER NOT NULL DEFAULT 0,
        discount_cents INTEGER NOT NULL DEFAULT 0,
        payment_method TEXT NOT NULL,
        payment_received_cents INTEGER,
        change_cents INTEGER NOT NULL DEFAULT 0,
        amount_paid_cents INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'completed'
            CHECK (status IN ('completed', 'pending', 'cancelled')),
        created_at TEXT NOT NULL
    )";

const CREATE_SALE_ITEMS: &str = "
    CREATE TABLE IF NOT EXISTS sale_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sale_id INTEGER NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
        product_id INTEGER NOT NULL REFERENCES products(id),
        quantity INTEGER NOT NULL,
        unit_price_cents INTEGER NOT NULL,
        total_price_cents INTEGER NOT NULL
    )";

const CREATE_PAYMENTS: &str = "
    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sale_id INTEGER NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
        amount_cents INTEGER NOT NULL,
        payment_method TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL
    )";

const CREATE_CUSTOMERS: &str = "
    CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        phone TEXT,
        email TEXT,
        address TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )";

const CREATE_SETTINGS: &str = "
    CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT UNIQUE NOT NULL,
        value TEXT NOT NULL,
        description TEXT,
        updated_at TEXT NOT NULL
    )";

const CREATE_SALES_CREATED_IDX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sales_created_at ON sales(created_at)";
const CREATE_SALE_ITEMS_SALE_IDX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sale_items_sale_id ON sale_items(sale_id)";
const CREATE_PRODUCTS_BARCODE_IDX: &str =
    "CREATE INDEX IF NOT EXISTS idx_products_barcode ON products(barcode)";

/// Default settings written on first run. `INSERT OR IGNORE` keeps
/// operator edits intact across restarts.
const DEFAULT_SETTINGS: &[(&str, &str, &str)] = &[
    ("vat_rate", "12.0", "VAT percentage applied at checkout"),
    ("currency", "PHP", "Currency code shown on receipts"),
    ("company_name", "Ridge POS", "Business name printed on receipts"),
    ("company_address", "", "Business address printed on receipts"),
    ("company_phone", "", "Business phone printed on receipts"),
    ("receipt_footer", "Thank you for your purchase!", "Closing line on receipts"),
    ("low_stock_threshold", "5", "Default low-stock warning level"),
];

/// Creates all tables, indexes, and seed rows. Idempotent.
pub async fn initialize(gateway: &dyn Gateway) -> DbResult<()> {
    info!("Applying database schema");

    // customers before sales (sales references customers)
    let tables = [
        CREATE_USERS,
        CREATE_PRODUCTS,
        CREATE_CUSTOMERS,
        CREATE_SALES,
        CREATE_SALE_ITEMS,
        CREATE_PAYMENTS,
        CREATE_SETTINGS,
        CREATE_SALES_CREATED_IDX,
        CREATE_SALE_ITEMS_SALE_IDX,
        CREATE_PRODUCTS_BARCODE_IDX,
    ];
    for sql in tables {
        gateway.execute(Statement::new(sql)).await?;
    }

    let now = crate::now_timestamp();
    for (key, value, description) in DEFAULT_SETTINGS {
        gateway
            .execute(
                Statement::new(
                    "INSERT OR IGNORE INTO settings (key, value, description, updated_at) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(*key)
                .bind(*value)
                .bind(*description)
                .bind(now.clone()),
            )
            .await?;
    }

    info!("Schema ready");
    Ok(())
}
