//! Display-time ranking of aggregation records.
//!
//! Aggregation output order carries no meaning; these helpers sort for
//! "top N / bottom N" reporting. Count ties are broken by grid row then
//! column so the same input always prints the same ranking.

use scooter_grid_models::AggregationRecord;

/// The `n` records with the highest counts, highest first.
#[must_use]
pub fn top_n(records: &[AggregationRecord], n: usize) -> Vec<&AggregationRecord> {
    let mut ranked: Vec<&AggregationRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.grid_cell.cmp(&b.grid_cell))
    });
    ranked.truncate(n);
    ranked
}

/// The `n` records with the lowest counts, lowest first.
#[must_use]
pub fn bottom_n(records: &[AggregationRecord], n: usize) -> Vec<&AggregationRecord> {
    let mut ranked: Vec<&AggregationRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        a.count
            .cmp(&b.count)
            .then_with(|| a.grid_cell.cmp(&b.grid_cell))
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use scooter_grid_models::GridCell;

    fn record(row: i32, col: i32, count: u64) -> AggregationRecord {
        AggregationRecord {
            grid_cell: GridCell { row, col },
            time_bucket: None,
            category: None,
            municipality: None,
            count,
        }
    }

    #[test]
    fn top_ranks_by_count_then_cell() {
        let records = vec![
            record(2, 0, 10),
            record(1, 0, 10),
            record(0, 0, 50),
            record(3, 3, 1),
        ];

        let top = top_n(&records, 3);
        assert_eq!(top[0].grid_cell, GridCell { row: 0, col: 0 });
        // Equal counts fall back to (row, col) order.
        assert_eq!(top[1].grid_cell, GridCell { row: 1, col: 0 });
        assert_eq!(top[2].grid_cell, GridCell { row: 2, col: 0 });
    }

    #[test]
    fn bottom_ranks_lowest_first() {
        let records = vec![record(0, 0, 50), record(1, 0, 3), record(2, 0, 7)];

        let bottom = bottom_n(&records, 2);
        assert_eq!(bottom[0].count, 3);
        assert_eq!(bottom[1].count, 7);
    }

    #[test]
    fn n_larger_than_input_returns_everything() {
        let records = vec![record(0, 0, 1)];
        assert_eq!(top_n(&records, 10).len(), 1);
    }
}
