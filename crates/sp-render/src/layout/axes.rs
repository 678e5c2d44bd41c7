/// Axis with fixed limits, generated ticks and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub log: bool,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

/// Smallest value a log axis maps.
const LOG_FLOOR: f64 = 1e-20;

impl Axis {
    /// Linear axis over exactly `[min, max]` with "nice number" ticks inside it.
    pub fn linear(min: f64, max: f64, target_ticks: usize) -> Self {
        let (min, max) =
            if (max - min).abs() < 1e-15 { (min - 1.0, max + 1.0) } else { (min, max) };
        let step = nice_step((max - min) / (target_ticks.max(2) - 1) as f64);
        if !step.is_finite() || step <= 0.0 {
            return Self::without_ticks(min, max, false);
        }
        let eps = step * 1e-6;

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let first = (min / step - 1e-9).ceil() as i64;
        let mut k = first;
        loop {
            let v = k as f64 * step;
            if v > max + eps {
                break;
            }
            ticks.push(v);
            labels.push(format_tick(v, step));
            k += 1;
        }

        // Minor ticks: 5 subdivisions per major
        let minor_step = step / 5.0;
        let mut minor = Vec::new();
        let mut k = (min / minor_step - 1e-9).ceil() as i64;
        loop {
            let v = k as f64 * minor_step;
            if v > max + eps {
                break;
            }
            if k.rem_euclid(5) != 0 {
                minor.push(v);
            }
            k += 1;
        }

        Self {
            min,
            max,
            log: false,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
        }
    }

    /// Logarithmic axis over exactly `[min, max]`: decade ticks, minors at 2..9.
    pub fn log(min: f64, max: f64) -> Self {
        let min = min.max(LOG_FLOOR);
        let max = max.max(min * 10.0);
        if !max.is_finite() {
            return Self::without_ticks(min, max, true);
        }
        let lo = min.log10().floor() as i32;
        let hi = max.log10().ceil() as i32;
        let inside = |v: f64| v >= min * (1.0 - 1e-9) && v <= max * (1.0 + 1e-9);

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut minor = Vec::new();
        for exp in lo..=hi {
            let v = 10.0_f64.powi(exp);
            if inside(v) {
                ticks.push(v);
                labels.push(format!("10{}", superscript(exp)));
            }
            for m in 2..=9 {
                let mv = m as f64 * v;
                if inside(mv) {
                    minor.push(mv);
                }
            }
        }

        Self {
            min,
            max,
            log: true,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
        }
    }

    /// No span a tick step can cover (infinite or NaN): frame only.
    fn without_ticks(min: f64, max: f64, log: bool) -> Self {
        tracing::warn!(min, max, "axis range is not finite, drawing no ticks");
        Self {
            min,
            max,
            log,
            label: String::new(),
            tick_positions: Vec::new(),
            tick_labels: Vec::new(),
            minor_ticks: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Same ticks, but no tick labels and no title (an x axis shared with a panel below).
    pub fn without_labels(mut self) -> Self {
        self.label.clear();
        self.tick_labels.iter_mut().for_each(String::clear);
        self
    }

    /// Clamp `value` into the axis range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = if self.log {
            let log_val = value.max(LOG_FLOOR).ln();
            let log_min = self.min.ln();
            let log_max = self.max.ln();
            (log_val - log_min) / (log_max - log_min)
        } else {
            (value - self.min) / (self.max - self.min)
        };
        px_min + frac * (px_max - px_min)
    }
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    // Avoid "-0"
    let value = if value.abs() < step * 0.01 { 0.0 } else { value };
    if decimals == 0 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.prec$}", value, prec = decimals)
    }
}

fn superscript(n: i32) -> String {
    n.to_string()
        .chars()
        .map(|c| match c {
            '-' => '\u{207B}',
            '0' => '\u{2070}',
            '1' => '\u{00B9}',
            '2' => '\u{00B2}',
            '3' => '\u{00B3}',
            '4' => '\u{2074}',
            '5' => '\u{2075}',
            '6' => '\u{2076}',
            '7' => '\u{2077}',
            '8' => '\u{2078}',
            '9' => '\u{2079}',
            _ => c,
        })
        .collect()
}
