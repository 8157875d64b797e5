//! Service layer for spendlog
//!
//! Services hold a borrowed `StorageAdapter` and provide the business logic on
//! top of it: validation, ordering, and read-only reporting.

pub mod aggregation;
pub mod expense;
pub mod settings;
pub mod template;

pub use aggregation::{
    AggregationService, CategorySummary, DailyAmount, DailySatisfaction, Insights,
    SatisfactionStats, SubcategoryShare, SubcategorySummary, WeeklyComparison,
};
pub use expense::ExpenseService;
pub use settings::SettingsService;
pub use template::TemplateService;
