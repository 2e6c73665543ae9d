//! Running monthly averages, maintained incrementally as costs come in.

use bson::doc;
use chrono::{Datelike, NaiveDate};
use mongodb::Database;

use crate::schemas::{COST_AVERAGES, CostAverage};

/// 0-based month and year of a cost, the key an aggregate document lives
/// under together with the user id.
pub fn month_key(date: NaiveDate) -> (u32, i32) {
    (date.month0(), date.year())
}

impl CostAverage {
    /// First cost of a (user, month, year): the average is the cost itself.
    pub fn open(user_id: String, date: NaiveDate, amount: f64) -> Self {
        let (month, year) = month_key(date);
        CostAverage {
            id: None,
            user_id,
            month,
            year,
            sum: amount,
            count: 1,
            average: amount,
        }
    }

    /// Fold one more cost into the aggregate.
    pub fn absorb(&mut self, amount: f64) {
        self.count += 1;
        self.sum += amount;
        self.average = self.sum / self.count as f64;
    }
}

/// Bring the (userId, month, year) aggregate up to date with a newly added
/// cost: update the existing document in place, or create it on the first
/// cost of that month.
///
/// The lookup and the write are two separate database calls, so concurrent
/// insertions for the same user and month can interleave them and lose an
/// update.
pub async fn record_cost(
    db: &Database,
    date: NaiveDate,
    amount: f64,
    user_id: &str,
) -> Result<(), mongodb::error::Error> {
    let averages = db.collection::<CostAverage>(COST_AVERAGES);
    let (month, year) = month_key(date);
    let key = doc! { "userId": user_id, "month": month as i32, "year": year };

    match averages.find_one(key.clone(), None).await? {
        Some(mut row) => {
            row.absorb(amount);
            let changes = doc! {
                "$set": { "sum": row.sum, "count": row.count, "average": row.average },
            };
            averages.update_one(key, changes, None).await?;
        }
        None => {
            averages
                .insert_one(CostAverage::open(user_id.to_string(), date, amount), None)
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_key_is_zero_based() {
        assert_eq!(month_key(date(2023, 1, 15)), (0, 2023));
        assert_eq!(month_key(date(2023, 12, 31)), (11, 2023));
    }

    #[test]
    fn first_cost_opens_the_aggregate_at_itself() {
        let row = CostAverage::open("123".into(), date(2024, 5, 2), 42.0);
        assert_eq!(row.count, 1);
        assert_eq!(row.sum, 42.0);
        assert_eq!(row.average, 42.0);
        assert_eq!((row.month, row.year), (4, 2024));
    }

    #[test]
    fn absorbing_n_costs_keeps_count_and_mean_consistent() {
        let mut row = CostAverage::open("123".into(), date(2024, 5, 2), 10.0);
        row.absorb(20.0);
        row.absorb(30.0);
        row.absorb(40.0);

        assert_eq!(row.count, 4);
        assert_eq!(row.sum, 100.0);
        assert_eq!(row.average, row.sum / row.count as f64);
        assert_eq!(row.average, 25.0);
    }

    #[test]
    fn absorbing_preserves_the_month_key() {
        let mut row = CostAverage::open("7".into(), date(2022, 11, 30), 5.0);
        row.absorb(15.0);
        assert_eq!((row.month, row.year), (10, 2022));
        assert_eq!(row.user_id, "7");
    }
}
