//! Schedule quality metrics (KPIs).
//!
//! Computes the score of a finished schedule and per-step diagnostics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Score | Sum of scores over the *set* of items shipped |
//! | Time used | Total activation cost of the schedule |
//! | Finish time | Cumulative activation cost up to a step |
//! | Score per activation unit | Step score / activation cost |
//! | Idle time | `remaining − catalog_len / rate`, negative when capacity runs short |
//! | Efficiency | `rate / activation_cost` |

use serde::{Deserialize, Serialize};

use crate::models::{Instance, Schedule};

/// Sum of item scores over the distinct items appearing in `schedule`.
///
/// An item listed by two entries counts once.
pub fn score(instance: &Instance, schedule: &Schedule) -> u64 {
    schedule
        .distinct_items()
        .into_iter()
        .filter(|&i| i < instance.num_items())
        .map(|i| instance.score(i))
        .sum()
}

/// Diagnostics for one schedule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    /// Time at which this provider's activation completes.
    pub day: u64,
    /// Summed score of the entry's items.
    pub sum: u64,
    /// `sum / activation_cost`.
    pub per_day: f64,
    /// Mean item score, 0 for an empty entry.
    pub avg: f64,
    pub min: u64,
    pub max: u64,
    pub activation_cost: u64,
    pub rate: u64,
    pub num_items: usize,
    /// Remaining time minus the time needed to ship the whole catalog.
    pub idle_time: f64,
    /// `rate / activation_cost`.
    pub efficiency: f64,
}

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Distinct-item score.
    pub total_score: u64,
    /// Activated providers.
    pub providers: usize,
    /// Item slots used across all entries.
    pub items: usize,
    /// Total activation cost.
    pub time_used: u64,
    /// Budget left after all activations (0 if exceeded).
    pub unused_budget: u64,
    /// One row per entry, in activation order.
    pub steps: Vec<StepStats>,
}

impl ScheduleKpi {
    /// Computes KPIs for `schedule`.
    ///
    /// Entries naming unknown providers or items are skipped; run
    /// validation first when that matters.
    pub fn calculate(instance: &Instance, schedule: &Schedule) -> Self {
        let mut day = 0u64;
        let mut steps = Vec::with_capacity(schedule.len());

        for entry in &schedule.entries {
            let Some(provider) = instance.get_provider(entry.provider) else {
                continue;
            };
            day += provider.activation_cost;
            let scores: Vec<u64> = entry
                .items
                .iter()
                .filter(|&&i| i < instance.num_items())
                .map(|&i| instance.score(i))
                .collect();

            let sum: u64 = scores.iter().sum();
            let avg = if scores.is_empty() {
                0.0
            } else {
                sum as f64 / scores.len() as f64
            };
            let cost = provider.activation_cost as f64;
            let rate = provider.throughput_rate as f64;
            let remaining = instance.time_budget() as f64 - day as f64;

            steps.push(StepStats {
                day,
                sum,
                per_day: sum as f64 / cost,
                avg,
                min: scores.iter().copied().min().unwrap_or(0),
                max: scores.iter().copied().max().unwrap_or(0),
                activation_cost: provider.activation_cost,
                rate: provider.throughput_rate,
                num_items: entry.items.len(),
                idle_time: remaining - provider.catalog_len() as f64 / rate,
                efficiency: rate / cost,
            });
        }

        Self {
            total_score: score(instance, schedule),
            providers: schedule.len(),
            items: schedule.assigned_count(),
            time_used: day,
            unused_budget: instance.time_budget().saturating_sub(day),
            steps,
        }
    }

    /// Fraction of the instance's total score achieved.
    pub fn coverage(&self, instance: &Instance) -> f64 {
        let total = instance.total_score();
        if total == 0 {
            1.0
        } else {
            self.total_score as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Provider, ScheduleEntry};

    fn sample() -> (Instance, Schedule) {
        let inst = Instance::new(
            10,
            vec![6, 4, 2, 1],
            vec![
                Provider::new(0, 2, 1).with_catalog(vec![0, 1, 2]),
                Provider::new(1, 4, 2).with_catalog(vec![0, 3]),
            ],
        )
        .unwrap();
        let schedule = Schedule::from_entries(vec![
            ScheduleEntry::new(0, vec![0, 2]),
            ScheduleEntry::new(1, vec![3]),
        ]);
        (inst, schedule)
    }

    #[test]
    fn test_score_counts_distinct_items() {
        let (inst, _) = sample();
        let dup = Schedule::from_entries(vec![
            ScheduleEntry::new(0, vec![0, 1]),
            ScheduleEntry::new(1, vec![0]),
        ]);
        assert_eq!(score(&inst, &dup), 10);
        assert_eq!(score(&inst, &Schedule::new()), 0);
    }

    #[test]
    fn test_kpi_totals() {
        let (inst, schedule) = sample();
        let kpi = ScheduleKpi::calculate(&inst, &schedule);
        assert_eq!(kpi.total_score, 9);
        assert_eq!(kpi.providers, 2);
        assert_eq!(kpi.items, 3);
        assert_eq!(kpi.time_used, 6);
        assert_eq!(kpi.unused_budget, 4);
        assert!((kpi.coverage(&inst) - 9.0 / 13.0).abs() < 1e-10);
    }

    #[test]
    fn test_step_stats() {
        let (inst, schedule) = sample();
        let kpi = ScheduleKpi::calculate(&inst, &schedule);
        let first = &kpi.steps[0];
        assert_eq!(first.day, 2);
        assert_eq!(first.sum, 8);
        assert!((first.per_day - 4.0).abs() < 1e-10);
        assert!((first.avg - 4.0).abs() < 1e-10);
        assert_eq!((first.min, first.max), (2, 6));
        // 8 days left, 3 catalog items at rate 1
        assert!((first.idle_time - 5.0).abs() < 1e-10);
        assert!((first.efficiency - 0.5).abs() < 1e-10);

        let second = &kpi.steps[1];
        assert_eq!(second.day, 6);
        assert!((second.idle_time - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_entry_stats() {
        let (inst, _) = sample();
        let s = Schedule::from_entries(vec![ScheduleEntry::empty(1)]);
        let kpi = ScheduleKpi::calculate(&inst, &s);
        assert_eq!(kpi.steps[0].sum, 0);
        assert_eq!(kpi.steps[0].avg, 0.0);
        assert_eq!(kpi.steps[0].min, 0);
    }
}
