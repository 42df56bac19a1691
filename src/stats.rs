//! Rank correlation between human judgements and model similarities
use std::cmp::Ordering;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Ranks starting at 1, ties sharing the mean of the ranks they span
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (mx, my) = (mean(x)?, mean(y)?);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        var_x += (a - mx) * (a - mx);
        var_y += (b - my) * (b - my);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

/// Spearman's rho, or `None` when it is undefined (fewer than two pairs, or a constant input)
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }
    pearson(&ranks(x), &ranks(y))
}

/// Two-sided p-value of a correlation `r` over `n` pairs, against no correlation
///
/// Uses the t statistic `r * sqrt((n - 2) / (1 - r^2))` with `n - 2` degrees of freedom.
pub fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() || r.abs() > 1.0 {
        return None;
    }
    if r.abs() == 1.0 {
        return Some(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let student = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - student.cdf(t.abs()))).min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tied_values_share_their_rank() {
        assert_eq!(ranks(&[10.0, 30.0, 20.0]), vec![1.0, 3.0, 2.0]);
        assert_eq!(ranks(&[5.0, 1.0, 5.0, 5.0]), vec![3.0, 1.0, 3.0, 3.0]);
        assert!(ranks(&[]).is_empty());
    }

    #[test]
    fn monotone_relations_are_perfectly_correlated() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let squares: Vec<f64> = x.iter().map(|v| v * v).collect();
        assert!((spearman(&x, &squares).unwrap() - 1.0).abs() < 1e-12);
        let reversed: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!((spearman(&x, &reversed).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn a_known_value_with_ties() {
        // ranks [1, 2.5, 2.5, 4] against [1, 3, 2, 4]
        let rho = spearman(&[1.0, 2.0, 2.0, 3.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        assert!((rho - 0.9486832980505138).abs() < 1e-12);
    }

    #[test]
    fn p_values_match_scipy() {
        // scipy.stats.spearmanr([1, 2, 3, 4, 5], [5, 6, 7, 8, 7])
        let rho = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 6.0, 7.0, 8.0, 7.0]).unwrap();
        assert!((rho - 0.8207826816681233).abs() < 1e-12);
        let p = correlation_p_value(rho, 5).unwrap();
        assert!((p - 0.0885870053135438).abs() < 1e-9);
        assert!((correlation_p_value(-rho, 5).unwrap() - p).abs() < 1e-12);
    }

    #[test]
    fn p_values_at_the_edges() {
        assert_eq!(correlation_p_value(1.0, 10), Some(0.0));
        assert!((correlation_p_value(0.0, 10).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(correlation_p_value(0.5, 2), None);
        assert_eq!(correlation_p_value(f64::NAN, 10), None);
    }

    #[test]
    fn undefined_correlations() {
        assert_eq!(spearman(&[1.0], &[2.0]), None);
        assert_eq!(spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(spearman(&[1.0, 2.0], &[1.0]), None);
        assert_eq!(mean(&[]), None);
    }
}
