//! Weighted random draws via cumulative-distribution inversion.

use rand::Rng;

use crate::model::WheelOption;

/// Pick the option whose cumulative weight range covers `r`.
///
/// Walks the options in stored order accumulating weights and returns the
/// first option whose cumulative sum strictly exceeds `r`, so `r = 0` selects
/// the first positively weighted option and zero-weight options are never
/// selected. If rounding leaves no match (`r` at the very top of the range),
/// the last positively weighted option wins; a fully zero-weighted list falls
/// back to the last option. Returns `None` only for an empty list.
///
/// Pure function of `(r, weights)`: tests can inject `r` directly.
#[must_use]
pub fn draw(options: &[WheelOption], r: f64) -> Option<&str> {
    let mut cum = 0.0;
    let mut last_positive = None;
    for opt in options {
        if opt.weight > 0.0 {
            cum += opt.weight;
            last_positive = Some(opt.name.as_str());
            if cum > r {
                return last_positive;
            }
        }
    }
    last_positive.or_else(|| options.last().map(|opt| opt.name.as_str()))
}

/// Draw with `r` sampled uniformly from `[0, 1)`.
pub fn draw_with<'a, R: Rng>(options: &'a [WheelOption], rng: &mut R) -> Option<&'a str> {
    draw(options, rng.r#gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn options(weights: &[(&str, f64)]) -> Vec<WheelOption> {
        weights
            .iter()
            .map(|(name, weight)| WheelOption {
                name: (*name).to_string(),
                weight: *weight,
            })
            .collect()
    }

    #[test]
    fn zero_r_selects_first_positive_option() {
        let opts = options(&[("Empty", 0.0), ("A", 0.5), ("B", 0.5)]);
        assert_eq!(draw(&opts, 0.0), Some("A"));
    }

    #[test]
    fn top_of_range_selects_last_positive_option() {
        let opts = options(&[("A", 0.5), ("B", 0.5), ("Empty", 0.0)]);
        assert_eq!(draw(&opts, 1.0 - 1e-12), Some("B"));
        // Rounding fallback: r at or beyond the total mass.
        assert_eq!(draw(&opts, 1.0), Some("B"));
    }

    #[test]
    fn boundary_falls_into_the_next_sector() {
        let opts = options(&[("A", 0.5), ("B", 0.5)]);
        assert_eq!(draw(&opts, 0.499_999), Some("A"));
        assert_eq!(draw(&opts, 0.5), Some("B"));
    }

    #[test]
    fn zero_weight_options_are_never_selected() {
        let opts = options(&[("A", 0.5), ("Empty", 0.0), ("B", 0.5)]);
        for i in 0..100 {
            let r = f64::from(i) / 100.0;
            assert_ne!(draw(&opts, r), Some("Empty"));
        }
    }

    #[test]
    fn deterministic_in_r() {
        let opts = options(&[("A", 0.3), ("B", 0.3), ("C", 0.4)]);
        assert_eq!(draw(&opts, 0.42), draw(&opts, 0.42));
    }

    #[test]
    fn degenerate_lists() {
        assert_eq!(draw(&[], 0.3), None);
        let opts = options(&[("A", 0.0), ("B", 0.0)]);
        assert_eq!(draw(&opts, 0.3), Some("B"));
    }

    #[test]
    fn rng_draw_is_reproducible_from_seed() {
        let opts = options(&[("A", 0.2), ("B", 0.8)]);
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        assert_eq!(draw_with(&opts, &mut a), draw_with(&opts, &mut b));
    }
}
