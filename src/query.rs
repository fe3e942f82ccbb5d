use crate::data::Dataset;
use crate::metric::Metric;

/// How many rows the urban-population leaderboard shows.
pub const LEADERBOARD_SIZE: usize = 15;

/// Threshold bounds for a metric, always over the FULL dataset so the
/// control's range never shrinks as filters are applied.
pub fn bounds(dataset: &Dataset, metric: Metric) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for record in dataset.records() {
        let v = metric.value(record);
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

/// Indices of rows whose metric value is at or above `threshold`, in the
/// dataset's original order (stable filter).
pub fn threshold_filter(dataset: &Dataset, metric: Metric, threshold: f64) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| metric.value(r) >= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Indices of the top `limit` rows by urban population, descending, ties kept
/// in original row order. Always computed over the unfiltered dataset.
pub fn top_urban(dataset: &Dataset, limit: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    // sort_by is stable, so equal urban populations keep their input order
    indices.sort_by(|&a, &b| {
        let ua = dataset.records()[a].urban_population;
        let ub = dataset.records()[b].urban_population;
        ub.total_cmp(&ua)
    });
    indices.truncate(limit);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;

    fn dataset(rows: &[(&str, f64, f64)]) -> Dataset {
        // (country, population, urban population); other columns fixed
        let mut csv =
            String::from("Country,Population,Forested Area (%),Co2-Emissions,Urban_population\n");
        for (name, pop, urban) in rows {
            csv.push_str(&format!("{name},{pop},50%,100,{urban}\n"));
        }
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_bounds_cover_full_dataset() {
        let ds = dataset(&[("A", 5.0, 1.0), ("B", 1.0, 2.0), ("C", 9.0, 3.0)]);
        assert_eq!(bounds(&ds, Metric::Population), (1.0, 9.0));
    }

    #[test]
    fn test_filter_keeps_rows_at_or_above_threshold() {
        let ds = dataset(&[
            ("A", 2_000_000.0, 500_000.0),
            ("B", 1_000_000.0, 900_000.0),
        ]);
        let kept = threshold_filter(&ds, Metric::Population, 1_500_000.0);
        assert_eq!(kept, vec![0]);
        assert_eq!(ds.records()[kept[0]].country, "A");
    }

    #[test]
    fn test_filter_is_stable_and_subset() {
        let ds = dataset(&[("A", 3.0, 0.0), ("B", 1.0, 0.0), ("C", 3.0, 0.0), ("D", 2.0, 0.0)]);
        let kept = threshold_filter(&ds, Metric::Population, 2.0);
        assert_eq!(kept, vec![0, 2, 3]);
        for &i in &kept {
            assert!(ds.records()[i].population >= 2.0);
        }
    }

    #[test]
    fn test_filter_is_monotone_in_threshold() {
        let ds = dataset(&[("A", 1.0, 0.0), ("B", 5.0, 0.0), ("C", 3.0, 0.0), ("D", 8.0, 0.0)]);
        let mut prev_len = usize::MAX;
        for t in [0.0, 1.0, 3.0, 5.0, 8.0, 9.0] {
            let len = threshold_filter(&ds, Metric::Population, t).len();
            assert!(len <= prev_len);
            prev_len = len;
        }
    }

    #[test]
    fn test_filter_at_min_is_identity() {
        let ds = dataset(&[("A", 4.0, 0.0), ("B", 4.0, 0.0)]);
        let (min, max) = bounds(&ds, Metric::Population);
        assert_eq!(min, max);
        assert_eq!(threshold_filter(&ds, Metric::Population, min).len(), ds.len());
    }

    #[test]
    fn test_leaderboard_sorts_descending() {
        let ds = dataset(&[
            ("A", 2_000_000.0, 500_000.0),
            ("B", 1_000_000.0, 900_000.0),
        ]);
        let top = top_urban(&ds, LEADERBOARD_SIZE);
        assert_eq!(top.len(), 2);
        assert_eq!(ds.records()[top[0]].country, "B");
        assert_eq!(ds.records()[top[1]].country, "A");
    }

    #[test]
    fn test_leaderboard_truncates_and_breaks_ties_by_row_order() {
        let rows: Vec<(String, f64, f64)> = (0..20)
            .map(|i| (format!("C{i}"), 1.0, if i % 2 == 0 { 100.0 } else { 50.0 }))
            .collect();
        let borrowed: Vec<(&str, f64, f64)> =
            rows.iter().map(|(n, p, u)| (n.as_str(), *p, *u)).collect();
        let ds = dataset(&borrowed);

        let top = top_urban(&ds, LEADERBOARD_SIZE);
        assert_eq!(top.len(), LEADERBOARD_SIZE);
        for pair in top.windows(2) {
            let (a, b) = (&ds.records()[pair[0]], &ds.records()[pair[1]]);
            assert!(a.urban_population >= b.urban_population);
            if a.urban_population == b.urban_population {
                assert!(pair[0] < pair[1]);
            }
        }
        // All the 100s (even rows) come first, in row order
        assert_eq!(top[0], 0);
        assert_eq!(top[1], 2);
    }
}
