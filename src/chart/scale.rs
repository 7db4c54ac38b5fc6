//! Chart autoscaling
//!
//! A CO2 history slot holding 0 means "no reading yet" and never takes part in the
//! range. The resulting [`Co2Scale`] always has `max > min`, so the linear map never
//! divides by zero.

/// Rules for picking a CO2 axis range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleRules {
    /// Ranges narrower than this are widened around their midpoint
    pub min_span: u32,
    /// The top of the axis never goes below this, keeps the alarm line in view
    pub floor_max: u32,
    /// Range used when there are no readings at all
    pub fallback: (u32, u32),
    /// Span forced on a range that still collapsed after clamping
    pub forced_span: u32,
}

impl ScaleRules {
    /// Long history bar chart
    pub const LONG: ScaleRules = ScaleRules {
        min_span: 500,
        floor_max: 1000,
        fallback: (400, 1000),
        forced_span: 100,
    };

    /// CO2 mini chart in the value panel
    pub const MINI: ScaleRules = ScaleRules {
        min_span: 200,
        floor_max: 1000,
        fallback: (400, 1000),
        forced_span: 100,
    };
}

/// Axis range in ppm, both ends multiples of 100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Co2Scale {
    pub min: u32,
    pub max: u32,
}

impl Co2Scale {
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn mid(&self) -> u32 {
        (self.min + self.max) / 2
    }

    /// Map `value` linearly from `[min, max]` to `[out_lo, out_hi]`, clamped to that
    /// range. `out_lo` may be larger than `out_hi` for top-down pixel rows.
    pub fn map(&self, value: u32, out_lo: i32, out_hi: i32) -> i32 {
        let span = i64::from(self.max) - i64::from(self.min);
        if span <= 0 {
            return out_lo;
        }
        let offset = i64::from(value) - i64::from(self.min);
        let mapped = offset * (i64::from(out_hi) - i64::from(out_lo)) / span + i64::from(out_lo);
        let (lo, hi) = if out_lo <= out_hi {
            (out_lo, out_hi)
        } else {
            (out_hi, out_lo)
        };
        mapped.clamp(i64::from(lo), i64::from(hi)) as i32
    }
}

/// Pick the axis range for a CO2 history
pub fn autoscale(values: &[u16], rules: ScaleRules) -> Co2Scale {
    let (mut min, mut max) = values
        .iter()
        .copied()
        .filter(|v| *v > 0)
        .map(u32::from)
        .fold(None, |acc: Option<(u32, u32)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or(rules.fallback);

    if max - min < rules.min_span {
        let mid = (max + min) / 2;
        let half = rules.min_span / 2;
        min = mid.saturating_sub(half);
        max = mid + half;
    }

    max = max.max(rules.floor_max);
    if max <= min {
        max = min + rules.forced_span.max(1);
    }

    min = (min / 100) * 100;
    max = max.div_ceil(100) * 100;

    Co2Scale { min, max }
}

/// Range for a temperature/humidity mini chart: observed min/max padded by `margin`
///
/// Non-finite samples are skipped. A span under 0.1 is opened to +-1 around the
/// midpoint; no samples at all gives `(0.0, 1.0)`.
pub fn linear_range(values: &[f32], margin: f32) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo > hi {
        return (0.0, 1.0);
    }

    let (min, max) = (lo - margin, hi + margin);
    if max - min < 0.1 {
        let mid = (lo + hi) / 2.0;
        return (mid - 1.0, mid + 1.0);
    }
    (min, max)
}
