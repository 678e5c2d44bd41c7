//! Visible axis ranges for the main panel.

use crate::hist::Hist1D;
use crate::stack::Stack;

/// Fraction of the filled width added on the right of the x-range, leaving
/// room for the legend.
pub const DEFAULT_RIGHT_PADDING: f64 = 0.4;

/// Headroom multipliers above the tallest bin.
const LINEAR_HEADROOM: f64 = 1.1;
const LOG_HEADROOM: f64 = 5.0;
/// Floor for the lower edge of a log-scale y-axis.
const LOG_FLOOR: f64 = 1e-3;

/// X-range covering the filled bins of both histograms, extended on the right
/// by `right_padding` of its width.
///
/// Runs from the low edge of the first filled bin of either histogram to the
/// high edge of the last filled bin of either. Falls back to the full axis when
/// neither has a filled bin.
pub fn autorange_x(data: &Hist1D, background: &Hist1D, right_padding: f64) -> (f64, f64) {
    let both = [data, background];
    let lo =
        both.iter().filter_map(|h| h.first_filled_bin().map(|i| h.low_edge(i))).reduce(f64::min);
    let hi =
        both.iter().filter_map(|h| h.last_filled_bin().map(|i| h.high_edge(i))).reduce(f64::max);
    let (lo, hi) = match (lo, hi) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => {
            let full = (data.edges[0], data.edges[data.n_bins()]);
            tracing::debug!(name = %data.name, "no filled bins, using full x-range");
            return full;
        }
    };
    (lo, hi + right_padding * (hi - lo))
}

/// Y-range for the main panel given the visible x-range.
///
/// The top clears the larger of `total + stat⊕syst error` and `data + error`
/// at their respective maxima, times 1.1 (linear) or 5 (log). The log-scale
/// bottom is half the smallest positive visible value of the data or the
/// lowest stack component, floored at 1e-3; the linear bottom is 0.
pub fn y_range(stack: &Stack, data: &Hist1D, x_range: (f64, f64), log: bool) -> (f64, f64) {
    let total = stack.total();
    let bins = total.bins_within(x_range.0, x_range.1);

    let peak = |h: &Hist1D, err: &Hist1D| {
        h.maximum_bin_in(bins.clone()).map_or(0.0, |i| h.values[i] + err.errors[i])
    };
    let max_stack = peak(total, stack.total_with_syst());
    let max_data = peak(data, data);
    let top = max_stack.max(max_data);

    if !log {
        let top = if top > 0.0 { top * LINEAR_HEADROOM } else { 1.0 };
        return (0.0, top);
    }

    let lowest = stack.stat_bands().first().unwrap_or(total);
    let min_positive = [data, lowest]
        .iter()
        .flat_map(|h| h.values[bins.clone()].iter().copied())
        .filter(|v| *v > 0.0)
        .reduce(f64::min);
    let bottom = min_positive.map_or(LOG_FLOOR, |v| (0.5 * v).max(LOG_FLOOR));
    let top = if top > bottom { top * LOG_HEADROOM } else { bottom * 10.0 };
    (bottom, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Component;
    use approx::assert_relative_eq;

    fn h(name: &str, values: &[f64]) -> Hist1D {
        let edges = (0..=values.len()).map(|i| i as f64 * 10.0).collect();
        let errors = values.iter().map(|v| v.sqrt()).collect();
        Hist1D::new(name, edges, values.to_vec(), errors).unwrap()
    }

    fn stack(values: &[f64], syst: f64) -> Stack {
        let c = Component {
            region: "OneMuon".into(),
            title: "Single μ BG".into(),
            color: "#9933ff".into(),
            hist: h("bkg", values),
        };
        Stack::build(vec![c], syst).unwrap()
    }

    #[test]
    fn autorange_spans_both_and_pads_right() {
        let data = h("data", &[0.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        let bkg = h("bkg", &[0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let (lo, hi) = autorange_x(&data, &bkg, DEFAULT_RIGHT_PADDING);
        assert_relative_eq!(lo, 10.0, epsilon = 1e-12);
        // filled width 10..40, plus 40%
        assert_relative_eq!(hi, 40.0 + 0.4 * 30.0, epsilon = 1e-12);
    }

    #[test]
    fn autorange_ignores_gaps_inside_filled_region() {
        let data = h("data", &[1.0, 0.0, 0.0, 5.0, 0.0]);
        let bkg = h("bkg", &[0.0; 5]);
        assert_eq!(autorange_x(&data, &bkg, 0.0), (0.0, 40.0));
    }

    #[test]
    fn autorange_falls_back_to_full_axis() {
        let empty = h("data", &[0.0, 0.0, 0.0]);
        assert_eq!(autorange_x(&empty, &empty, 0.4), (0.0, 30.0));
    }

    #[test]
    fn linear_y_range_clears_largest_error_bar() {
        let data = h("data", &[4.0, 9.0]);
        let s = stack(&[10.0, 4.0], 0.0);
        let (lo, hi) = y_range(&s, &data, (0.0, 20.0), false);
        assert_eq!(lo, 0.0);
        // stack: 10 + sqrt(10); data: 9 + 3
        assert_relative_eq!(hi, (10.0 + 10f64.sqrt()).max(12.0) * 1.1, epsilon = 1e-12);
    }

    #[test]
    fn log_y_range_uses_smallest_visible_value() {
        let data = h("data", &[0.0, 4.0, 100.0, 0.2]);
        let s = stack(&[0.0, 2.0, 90.0, 0.0], 10.0);
        let (lo, hi) = y_range(&s, &data, (10.0, 30.0), true);
        assert_relative_eq!(lo, 1.0, epsilon = 1e-12);
        assert_relative_eq!(hi, (100.0 + 10.0) * 5.0, epsilon = 1e-9);

        let tiny = h("data", &[0.0001]);
        let s = stack(&[0.0], 0.0);
        let (lo, _) = y_range(&s, &tiny, (0.0, 10.0), true);
        assert_eq!(lo, 1e-3);
    }
}
