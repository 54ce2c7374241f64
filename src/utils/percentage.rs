use std::{fmt::Display, ops::Deref};

use serde::{Deserialize, Serialize};

/// Unrounded percentage. Rounding only happens in [Display], so aggregates built from many
/// percentages don't accumulate rounding error.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || !value.is_finite() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// `part / whole * 100`, or zero when there is nothing to measure against.
    pub fn from_ratio(part: f64, whole: f64) -> Percentage {
        if whole <= 0. {
            return Percentage(0.);
        }
        Percentage::new_opt(part / whole * 100.).unwrap_or_default()
    }

    pub fn of_counts(part: usize, whole: usize) -> Percentage {
        Percentage::from_ratio(part as f64, whole as f64)
    }

    /// Arithmetic mean. `None` for an empty input.
    pub fn mean(values: impl IntoIterator<Item = Percentage>) -> Option<Percentage> {
        let (sum, count) = values
            .into_iter()
            .fold((0., 0usize), |(sum, count), v| (sum + v.0, count + 1));
        (count > 0).then(|| Percentage(sum / count as f64))
    }

    pub fn is_full(&self) -> bool {
        self.0 >= 100.
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
