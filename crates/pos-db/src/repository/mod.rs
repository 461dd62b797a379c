//! # Repositories
//!
//! Typed access to each table, written against the gateway trait so the
//! same code runs on both backends. Row mapping happens here; SQL stays
//! parameterized.

pub mod customer;
pub mod product;
pub mod reports;
pub mod sale;
pub mod settings;
pub mod user;

pub use customer::{CustomerRepository, NewCustomer};
pub use product::{NewProduct, ProductRepository};
pub use reports::{
    DailyPoint, PaymentBreakdown, PeriodRow, ProductHistoryRow, ReportPeriod, ReportsRepository,
    SalesSummary, SummaryTotals, TopProduct,
};
pub use sale::{SaleFilter, SaleListEntry, SaleListPage, SaleRepository};
pub use settings::SettingsRepository;
pub use user::{UserCredentials, UserRepository};
