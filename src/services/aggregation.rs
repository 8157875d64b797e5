//! Aggregation service
//!
//! Read-only reports over the expenses dated within an `AggregationPeriod`:
//! category totals, subcategory breakdowns, satisfaction statistics and
//! behavioural insights. Nothing here writes to storage.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::SpendResult;
use crate::models::{AggregationPeriod, Category, Expense};
use crate::storage::{StorageAdapter, StorageKey};

/// Number of days reported in `Insights::top_social_days`
pub const TOP_SOCIAL_DAYS: usize = 3;

/// Totals per top-level category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub transport: i64,
    pub social: i64,
    pub total: i64,
}

/// One subcategory's share of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategorySummary {
    pub subcategory: String,
    pub amount: i64,
    /// Share of the breakdown total, 0-100 with two decimals
    pub percentage: f64,
}

/// Average satisfaction for a single day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySatisfaction {
    pub date: NaiveDate,
    pub average: f64,
}

/// Satisfaction statistics over rated expenses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatisfactionStats {
    /// Mean rating with two decimals, `None` when nothing was rated
    pub average: Option<f64>,
    /// Count per rating level, always holding keys 1 through 5
    pub distribution: BTreeMap<u8, usize>,
    /// Per-day averages in ascending date order
    pub trend: Vec<DailySatisfaction>,
}

/// Social spending on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAmount {
    pub date: NaiveDate,
    pub amount: i64,
}

/// Average spend per expense this week against last week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyComparison {
    pub this_week: i64,
    pub last_week: i64,
    pub change: i64,
}

/// A subcategory's share of everything spent in the period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryShare {
    pub subcategory: String,
    pub percentage: f64,
}

/// Derived behavioural metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    /// Taxi share of transport spending; `None` without transport spending
    pub taxi_ratio: Option<f64>,
    pub top_social_days: Vec<DailyAmount>,
    pub weekly_comparison: WeeklyComparison,
    pub category_bias: Vec<SubcategoryShare>,
}

/// Round half-up to the nearest integer
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half-up to two decimal places
fn round2(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// `part` as a two-decimal percentage of `total`; zero for an empty total
fn percentage(part: i64, total: i64) -> f64 {
    if total > 0 {
        round2(part as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

/// Sum of amounts, saturating so restored data with huge values cannot overflow
fn total_of(amounts: impl Iterator<Item = i64>) -> i64 {
    amounts.fold(0i64, i64::saturating_add)
}

/// Sum amounts per key, keeping keys in first-seen order
fn sum_by<K, F>(expenses: &[&Expense], key: F) -> Vec<(K, i64)>
where
    K: Eq + std::hash::Hash + Clone,
    F: Fn(&Expense) -> K,
{
    let mut sums: Vec<(K, i64)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for expense in expenses {
        let k = key(*expense);
        match index.get(&k) {
            Some(&i) => sums[i].1 = sums[i].1.saturating_add(expense.amount),
            None => {
                index.insert(k.clone(), sums.len());
                sums.push((k, expense.amount));
            }
        }
    }
    sums
}

fn average_amount(expenses: &[&Expense], week: AggregationPeriod) -> f64 {
    let (total, count) = expenses
        .iter()
        .filter(|e| week.contains(e.date))
        .fold((0i64, 0usize), |(total, count), e| {
            (total.saturating_add(e.amount), count + 1)
        });
    if count > 0 {
        total as f64 / count as f64
    } else {
        0.0
    }
}

/// Service for period reports
pub struct AggregationService<'a> {
    storage: &'a StorageAdapter,
}

impl<'a> AggregationService<'a> {
    /// Create a new aggregation service
    pub fn new(storage: &'a StorageAdapter) -> Self {
        Self { storage }
    }

    fn expenses_in(&self, period: AggregationPeriod) -> SpendResult<Vec<Expense>> {
        let expenses = self
            .storage
            .get::<Vec<Expense>>(StorageKey::Expenses)?
            .unwrap_or_default();
        Ok(expenses
            .into_iter()
            .filter(|e| period.contains(e.date))
            .collect())
    }

    /// Total spending per category
    pub fn get_category_summary(&self, period: AggregationPeriod) -> SpendResult<CategorySummary> {
        let mut summary = CategorySummary::default();
        for expense in self.expenses_in(period)? {
            let slot = match expense.category {
                Category::Transport => &mut summary.transport,
                Category::Social => &mut summary.social,
            };
            *slot = slot.saturating_add(expense.amount);
        }
        summary.total = summary.transport.saturating_add(summary.social);
        Ok(summary)
    }

    /// Spending per subcategory, largest first
    ///
    /// With `category` set, only that category's expenses are grouped and the
    /// percentages are shares of that category's total.
    pub fn get_subcategory_breakdown(
        &self,
        period: AggregationPeriod,
        category: Option<Category>,
    ) -> SpendResult<Vec<SubcategorySummary>> {
        let expenses = self.expenses_in(period)?;
        let matching: Vec<&Expense> = expenses
            .iter()
            .filter(|e| category.map_or(true, |c| e.category == c))
            .collect();

        let sums = sum_by(&matching, |e| e.subcategory.clone());
        let total = total_of(sums.iter().map(|(_, amount)| *amount));

        let mut breakdown: Vec<SubcategorySummary> = sums
            .into_iter()
            .map(|(subcategory, amount)| SubcategorySummary {
                subcategory,
                amount,
                percentage: percentage(amount, total),
            })
            .collect();
        breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(breakdown)
    }

    /// Average, distribution and daily trend of satisfaction ratings
    pub fn get_satisfaction_stats(
        &self,
        period: AggregationPeriod,
    ) -> SpendResult<SatisfactionStats> {
        let expenses = self.expenses_in(period)?;
        let rated: Vec<(NaiveDate, u8)> = expenses
            .iter()
            .filter_map(|e| e.satisfaction.map(|s| (e.date, s)))
            .collect();

        let mut distribution: BTreeMap<u8, usize> = (1..=5).map(|level| (level, 0)).collect();
        for (_, level) in &rated {
            *distribution.entry(*level).or_insert(0) += 1;
        }

        let average = if rated.is_empty() {
            None
        } else {
            let sum: u32 = rated.iter().map(|(_, s)| *s as u32).sum();
            Some(round2(sum as f64 / rated.len() as f64))
        };

        let mut per_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
        for (date, level) in &rated {
            let entry = per_day.entry(*date).or_insert((0, 0));
            entry.0 += *level as u32;
            entry.1 += 1;
        }
        let trend = per_day
            .into_iter()
            .map(|(date, (sum, count))| DailySatisfaction {
                date,
                average: sum as f64 / count as f64,
            })
            .collect();

        Ok(SatisfactionStats {
            average,
            distribution,
            trend,
        })
    }

    /// Insights for `period`, with the weekly comparison anchored on today
    pub fn get_insights(&self, period: AggregationPeriod) -> SpendResult<Insights> {
        self.get_insights_at(period, chrono::Local::now().date_naive())
    }

    /// Insights for `period`, with the weekly comparison anchored on `today`
    ///
    /// Every metric, the weekly comparison included, only sees expenses dated
    /// within `period`.
    pub fn get_insights_at(
        &self,
        period: AggregationPeriod,
        today: NaiveDate,
    ) -> SpendResult<Insights> {
        let expenses = self.expenses_in(period)?;
        let all: Vec<&Expense> = expenses.iter().collect();

        // Taxi ratio
        let (transport_total, taxi_total) = all
            .iter()
            .filter(|e| e.category == Category::Transport)
            .fold((0i64, 0i64), |(transport, taxi), e| {
                let taxi = if e.subcategory == "taxi" {
                    taxi.saturating_add(e.amount)
                } else {
                    taxi
                };
                (transport.saturating_add(e.amount), taxi)
            });
        let taxi_ratio = (transport_total > 0).then(|| percentage(taxi_total, transport_total));

        // Busiest social days
        let social: Vec<&Expense> = all
            .iter()
            .copied()
            .filter(|e| e.category == Category::Social)
            .collect();
        let mut top_social_days: Vec<DailyAmount> = sum_by(&social, |e| e.date)
            .into_iter()
            .map(|(date, amount)| DailyAmount { date, amount })
            .collect();
        top_social_days.sort_by(|a, b| b.amount.cmp(&a.amount));
        top_social_days.truncate(TOP_SOCIAL_DAYS);

        // Week over week
        let this_week = AggregationPeriod::week_of(today);
        let this_avg = average_amount(&all, this_week);
        let last_avg = average_amount(&all, this_week.previous_week());
        let weekly_comparison = WeeklyComparison {
            this_week: round_half_up(this_avg) as i64,
            last_week: round_half_up(last_avg) as i64,
            change: round_half_up(this_avg - last_avg) as i64,
        };

        // Subcategory bias across both categories
        let total = total_of(all.iter().map(|e| e.amount));
        let mut category_bias: Vec<SubcategoryShare> = if total > 0 {
            sum_by(&all, |e| e.subcategory.clone())
                .into_iter()
                .map(|(subcategory, amount)| SubcategoryShare {
                    subcategory,
                    percentage: percentage(amount, total),
                })
                .collect()
        } else {
            Vec::new()
        };
        category_bias.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(Ordering::Equal)
        });

        Ok(Insights {
            taxi_ratio,
            top_social_days,
            weekly_comparison,
            category_bias,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SpendError, StorageError};
    use crate::models::{ExpenseInput, MAX_AMOUNT};
    use crate::services::ExpenseService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> AggregationPeriod {
        AggregationPeriod::month(2025, 1).unwrap()
    }

    fn add(
        storage: &StorageAdapter,
        day: &str,
        amount: i64,
        category: Category,
        subcategory: &str,
        satisfaction: Option<u8>,
    ) {
        ExpenseService::new(storage)
            .create(ExpenseInput {
                date: day.into(),
                amount,
                category,
                subcategory: subcategory.into(),
                memo: None,
                satisfaction,
            })
            .unwrap();
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
    }

    #[test]
    fn test_category_summary() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-05", 300, Category::Transport, "train", None);
        add(&storage, "2025-01-06", 1200, Category::Social, "meal", None);
        add(&storage, "2025-01-31", 200, Category::Transport, "bus", None);
        add(&storage, "2025-02-01", 9999, Category::Social, "gift", None);

        let summary = AggregationService::new(&storage)
            .get_category_summary(january())
            .unwrap();
        assert_eq!(
            summary,
            CategorySummary {
                transport: 500,
                social: 1200,
                total: 1700,
            }
        );
    }

    #[test]
    fn test_category_summary_at_amount_limit() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-05", MAX_AMOUNT, Category::Transport, "train", None);
        add(&storage, "2025-01-06", MAX_AMOUNT, Category::Transport, "taxi", None);

        let summary = AggregationService::new(&storage)
            .get_category_summary(january())
            .unwrap();
        assert_eq!(summary.transport, 2 * MAX_AMOUNT);
        assert_eq!(summary.total, 2 * MAX_AMOUNT);

        let result = ExpenseService::new(&storage).create(ExpenseInput {
            date: "2025-01-07".into(),
            amount: i64::MAX / 2 + 1,
            category: Category::Transport,
            subcategory: "bus".into(),
            memo: None,
            satisfaction: None,
        });
        assert_eq!(result.unwrap_err().field(), Some("amount"));
    }

    #[test]
    fn test_restored_huge_amounts_saturate() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-05", 1, Category::Transport, "taxi", None);
        add(&storage, "2025-01-06", 1, Category::Social, "meal", None);

        let mut stored: Vec<Expense> = storage.get(StorageKey::Expenses).unwrap().unwrap();
        for expense in &mut stored {
            expense.amount = i64::MAX / 2 + 1;
        }
        let second_taxi = Expense {
            category: Category::Transport,
            subcategory: "taxi".into(),
            ..stored[0].clone()
        };
        stored.push(second_taxi);
        storage.set(StorageKey::Expenses, &stored).unwrap();

        let service = AggregationService::new(&storage);
        let summary = service.get_category_summary(january()).unwrap();
        assert_eq!(summary.transport, i64::MAX);
        assert_eq!(summary.total, i64::MAX);

        let breakdown = service.get_subcategory_breakdown(january(), None).unwrap();
        assert_eq!(breakdown[0].subcategory, "taxi");
        assert_eq!(breakdown[0].amount, i64::MAX);

        let insights = service.get_insights_at(january(), date(2025, 1, 6)).unwrap();
        assert!(insights.taxi_ratio.is_some());
    }

    #[test]
    fn test_subcategory_breakdown_percentages() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-05", 300, Category::Transport, "train", None);
        add(&storage, "2025-01-06", 700, Category::Transport, "bus", None);

        let breakdown = AggregationService::new(&storage)
            .get_subcategory_breakdown(january(), None)
            .unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].subcategory, "bus");
        assert_eq!(breakdown[0].percentage, 70.0);
        assert_eq!(breakdown[1].subcategory, "train");
        assert_eq!(breakdown[1].percentage, 30.0);
        let sum: f64 = breakdown.iter().map(|b| b.percentage).sum();
        assert_eq!(sum, 100.0);
    }

    #[test]
    fn test_subcategory_breakdown_by_category() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-05", 300, Category::Transport, "train", None);
        add(&storage, "2025-01-05", 100, Category::Transport, "train", None);
        add(&storage, "2025-01-06", 500, Category::Social, "cafe", None);

        let breakdown = AggregationService::new(&storage)
            .get_subcategory_breakdown(january(), Some(Category::Transport))
            .unwrap();
        assert_eq!(
            breakdown,
            vec![SubcategorySummary {
                subcategory: "train".into(),
                amount: 400,
                percentage: 100.0,
            }]
        );
    }

    #[test]
    fn test_subcategory_breakdown_empty() {
        let storage = StorageAdapter::in_memory();
        let breakdown = AggregationService::new(&storage)
            .get_subcategory_breakdown(january(), None)
            .unwrap();
        assert!(breakdown.is_empty());
    }

    #[test]
    fn test_satisfaction_stats() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-10", 100, Category::Social, "cafe", Some(5));
        add(&storage, "2025-01-10", 100, Category::Social, "cafe", Some(4));
        add(&storage, "2025-01-03", 100, Category::Social, "meal", Some(2));
        add(&storage, "2025-01-04", 100, Category::Social, "meal", None);

        let stats = AggregationService::new(&storage)
            .get_satisfaction_stats(january())
            .unwrap();

        assert_eq!(stats.average, Some(3.67));
        let counts: Vec<_> = stats.distribution.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(counts, vec![(1, 0), (2, 1), (3, 0), (4, 1), (5, 1)]);
        assert_eq!(
            stats.trend,
            vec![
                DailySatisfaction {
                    date: date(2025, 1, 3),
                    average: 2.0,
                },
                DailySatisfaction {
                    date: date(2025, 1, 10),
                    average: 4.5,
                },
            ]
        );
    }

    #[test]
    fn test_satisfaction_stats_without_ratings() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-04", 100, Category::Social, "meal", None);

        let stats = AggregationService::new(&storage)
            .get_satisfaction_stats(january())
            .unwrap();
        assert_eq!(stats.average, None);
        assert_eq!(stats.distribution.len(), 5);
        assert!(stats.distribution.values().all(|&c| c == 0));
        assert!(stats.trend.is_empty());
    }

    #[test]
    fn test_insights_taxi_ratio() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-05", 1000, Category::Transport, "taxi", None);
        add(&storage, "2025-01-06", 2000, Category::Transport, "train", None);
        add(&storage, "2025-01-06", 5000, Category::Social, "meal", None);

        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 1, 20))
            .unwrap();
        assert_eq!(insights.taxi_ratio, Some(33.33));
    }

    #[test]
    fn test_insights_taxi_ratio_without_transport() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-06", 5000, Category::Social, "meal", None);

        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 1, 20))
            .unwrap();
        assert_eq!(insights.taxi_ratio, None);
    }

    #[test]
    fn test_insights_top_social_days() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-01", 100, Category::Social, "cafe", None);
        add(&storage, "2025-01-02", 900, Category::Social, "meal", None);
        add(&storage, "2025-01-03", 300, Category::Social, "gift", None);
        add(&storage, "2025-01-03", 300, Category::Social, "cafe", None);
        add(&storage, "2025-01-04", 500, Category::Social, "meal", None);
        add(&storage, "2025-01-04", 5000, Category::Transport, "taxi", None);

        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 1, 20))
            .unwrap();
        assert_eq!(
            insights.top_social_days,
            vec![
                DailyAmount {
                    date: date(2025, 1, 2),
                    amount: 900,
                },
                DailyAmount {
                    date: date(2025, 1, 3),
                    amount: 600,
                },
                DailyAmount {
                    date: date(2025, 1, 4),
                    amount: 500,
                },
            ]
        );
    }

    #[test]
    fn test_insights_weekly_comparison() {
        let storage = StorageAdapter::in_memory();
        // 2025-01-15 is a Wednesday; its week runs 13th to 19th
        add(&storage, "2025-01-13", 100, Category::Transport, "bus", None);
        add(&storage, "2025-01-19", 201, Category::Transport, "bus", None);
        add(&storage, "2025-01-06", 300, Category::Transport, "bus", None);
        add(&storage, "2025-01-12", 400, Category::Transport, "bus", None);
        add(&storage, "2025-01-05", 9999, Category::Transport, "bus", None);

        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 1, 15))
            .unwrap();
        assert_eq!(
            insights.weekly_comparison,
            WeeklyComparison {
                this_week: 151,
                last_week: 350,
                change: -199,
            }
        );
    }

    #[test]
    fn test_insights_weekly_comparison_is_period_scoped() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-02-03", 800, Category::Transport, "bus", None);
        add(&storage, "2025-01-28", 400, Category::Transport, "bus", None);

        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 2, 4))
            .unwrap();
        assert_eq!(
            insights.weekly_comparison,
            WeeklyComparison {
                this_week: 0,
                last_week: 400,
                change: -400,
            }
        );
    }

    #[test]
    fn test_insights_weekly_comparison_empty_weeks() {
        let storage = StorageAdapter::in_memory();
        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 1, 15))
            .unwrap();
        assert_eq!(insights.weekly_comparison, WeeklyComparison::default());
    }

    #[test]
    fn test_insights_category_bias() {
        let storage = StorageAdapter::in_memory();
        add(&storage, "2025-01-05", 250, Category::Transport, "train", None);
        add(&storage, "2025-01-06", 500, Category::Social, "meal", None);
        add(&storage, "2025-01-07", 250, Category::Social, "cafe", None);

        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 1, 20))
            .unwrap();
        let bias: Vec<_> = insights
            .category_bias
            .iter()
            .map(|b| (b.subcategory.as_str(), b.percentage))
            .collect();
        assert_eq!(bias, vec![("meal", 50.0), ("train", 25.0), ("cafe", 25.0)]);
    }

    #[test]
    fn test_insights_category_bias_empty_period() {
        let storage = StorageAdapter::in_memory();
        let insights = AggregationService::new(&storage)
            .get_insights_at(january(), date(2025, 1, 20))
            .unwrap();
        assert!(insights.category_bias.is_empty());
        assert!(insights.top_social_days.is_empty());
    }

    #[test]
    fn test_storage_parse_error_surfaces() {
        let storage = StorageAdapter::in_memory();
        storage.set(StorageKey::Expenses, "not a list").unwrap();

        let err = AggregationService::new(&storage)
            .get_category_summary(january())
            .unwrap_err();
        assert!(matches!(err, SpendError::Storage(StorageError::Parse(_))));
    }
}
