//! Weekly summary statistics over a cleaned dataset.
//!
//! Every metric is a pure function of the cleaned dataset, the user's
//! glucose bounds and basal dose, plus the current date for the
//! partial-day exclusion. Degenerate inputs (no readings, nothing in a
//! band, no finished day) resolve to [`Stat::Unavailable`] or a zero
//! value, never to an error.

use crate::constants::{
    DAY_LABEL_FORMAT, DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND, HIGHEST_DAY_FLOOR,
    LOWEST_DAY_CEILING, RESERVOIR_DAYS, UNAVAILABLE, WINDOW_DAYS, a1c,
};
use crate::error::Result;
use crate::models::{CarbSummary, CleanedDataset, GeneralSection, GlucoseSection};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the in-range stint scan reports its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StintPolicy {
    /// Duration of the last interval closed by an out-of-range reading
    #[value(name = "last")]
    LastInterval,
    /// Maximum over all intervals, including the one still open at the end
    #[default]
    #[value(name = "longest")]
    Longest,
}

/// User-chosen inputs for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsParams {
    pub lower_bound: f32,
    pub upper_bound: f32,
    pub basal_rate_per_day: f32,
    pub window_days: u32,
    pub reservoir_days: u32,
    pub stint_policy: StintPolicy,
}

impl Default for StatsParams {
    fn default() -> Self {
        Self {
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            basal_rate_per_day: 0.0,
            window_days: WINDOW_DAYS,
            reservoir_days: RESERVOIR_DAYS,
            stint_policy: StintPolicy::default(),
        }
    }
}

/// A metric value, or the marker for "could not be computed"
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat<T> {
    Value(T),
    Unavailable,
}

impl<T> Stat<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Stat::Value(v) => Some(v),
            Stat::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Stat::Value(_))
    }
}

impl<T> From<Option<T>> for Stat<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Stat::Unavailable, Stat::Value)
    }
}

impl<T: fmt::Display> fmt::Display for Stat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Value(v) => fmt::Display::fmt(v, f),
            Stat::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Whole percentage of readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percent(pub u32);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Glucose value truncated to whole mg/dL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glucose(pub i32);

impl fmt::Display for Glucose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mg/dL", self.0)
    }
}

/// A finished day and its truncated mean glucose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayAverage {
    pub date: NaiveDate,
    pub value: i32,
}

impl fmt::Display for DayAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} mg/dL",
            self.date.format(DAY_LABEL_FORMAT),
            self.value
        )
    }
}

/// An in-range interval between two readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stint {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Stint {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

impl fmt::Display for Stint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.duration().num_minutes();
        write!(f, "{}h {}m", minutes / 60, minutes % 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grams(pub f32);

impl fmt::Display for Grams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}g", self.0)
    }
}

/// Approximate insulin over the window, bolus plus basal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsulinUnits(pub f32);

impl fmt::Display for InsulinUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{} Units", self.0)
    }
}

/// Insulin used per reservoir fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReservoirEstimate(pub f32);

impl fmt::Display for ReservoirEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}U per res.", self.0)
    }
}

/// A1C projected from a single week of sensor data; not a clinical value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedA1c(pub f64);

impl fmt::Display for ProjectedA1c {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%*", self.0)
    }
}

/// Every derived metric for one (dataset, bounds, basal) combination
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub time_in_range: Stat<Percent>,
    pub time_high: Stat<Percent>,
    pub time_low: Stat<Percent>,
    pub average_glucose: Stat<Glucose>,
    pub highest_day: Stat<DayAverage>,
    pub lowest_day: Stat<DayAverage>,
    pub longest_stint: Stat<Stint>,
    pub carbs_consumed: Stat<Grams>,
    pub insulin_total: Stat<InsulinUnits>,
    pub reservoir_estimate: Stat<ReservoirEstimate>,
    pub projected_a1c: Stat<ProjectedA1c>,
}

/// One labelled value as the dashboard shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub id: &'static str,
    pub title: &'static str,
    pub value: String,
    pub explanation: &'static str,
}

impl StatsSnapshot {
    /// Snapshot for a pipeline that never produced a dataset
    pub fn unavailable() -> Self {
        Self {
            time_in_range: Stat::Unavailable,
            time_high: Stat::Unavailable,
            time_low: Stat::Unavailable,
            average_glucose: Stat::Unavailable,
            highest_day: Stat::Unavailable,
            lowest_day: Stat::Unavailable,
            longest_stint: Stat::Unavailable,
            carbs_consumed: Stat::Unavailable,
            insulin_total: Stat::Unavailable,
            reservoir_estimate: Stat::Unavailable,
            projected_a1c: Stat::Unavailable,
        }
    }

    /// Cards as a pretty-printed JSON array
    pub fn cards_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.cards())?)
    }

    /// Rendered values in display order
    pub fn cards(&self) -> Vec<StatCard> {
        vec![
            StatCard {
                id: "card-value-tir",
                title: "Time in Range",
                value: self.time_in_range.to_string(),
                explanation: "The percent of time spent within the defined glucose range.",
            },
            StatCard {
                id: "card-value-tHigh",
                title: "Time high",
                value: self.time_high.to_string(),
                explanation: "The percent of time spent above the defined upper bound.",
            },
            StatCard {
                id: "card-value-tLow",
                title: "Time low",
                value: self.time_low.to_string(),
                explanation: "The percent of time spent below the defined lower bound.",
            },
            StatCard {
                id: "card-value-avgBG",
                title: "Average mg/dL",
                value: self.average_glucose.to_string(),
                explanation: "Average blood glucose value among all data.",
            },
            StatCard {
                id: "card-value-a1c",
                title: "Projected A1C",
                value: self.projected_a1c.to_string(),
                explanation: "A1C projected from 7 days of data. Not an accurate \
                              estimation of true A1C.",
            },
            StatCard {
                id: "card-value-resEstimate",
                title: "Reservoir Estimate",
                value: self.reservoir_estimate.to_string(),
                explanation: "Estimated insulin used per reservoir assuming infusion \
                              sites are changed every 3 days.",
            },
            StatCard {
                id: "card-value-carbsCons",
                title: "Carbs Consumed",
                value: self.carbs_consumed.to_string(),
                explanation: "The grams of carbohydrates dosed for.",
            },
            StatCard {
                id: "card-value-insTotal",
                title: "Insulin Dosed",
                value: self.insulin_total.to_string(),
                explanation: "Total insulin used throughout the week, basal and bolus.",
            },
            StatCard {
                id: "card-value-highDay",
                title: "Highest Avg. Day",
                value: self.highest_day.to_string(),
                explanation: "Day with the highest average blood glucose.",
            },
            StatCard {
                id: "card-value-lowDay",
                title: "Lowest Avg. Day",
                value: self.lowest_day.to_string(),
                explanation: "Day with the lowest average blood glucose.",
            },
            StatCard {
                id: "card-value-stint",
                title: "Longest Stint",
                value: self.longest_stint.to_string(),
                explanation: "Longest stretch of sensor readings inside the defined range.",
            },
        ]
    }
}

/// Compute a snapshot, excluding the local calendar day from per-day metrics
pub fn compute(dataset: Option<&CleanedDataset>, params: &StatsParams) -> StatsSnapshot {
    compute_on(dataset, params, Local::now().date_naive())
}

/// Compute a snapshot with an explicit "today"
pub fn compute_on(
    dataset: Option<&CleanedDataset>,
    params: &StatsParams,
    today: NaiveDate,
) -> StatsSnapshot {
    let Some(dataset) = dataset else {
        return StatsSnapshot::unavailable();
    };

    let glucose = &dataset.glucose;
    let (lower, upper) = (params.lower_bound, params.upper_bound);

    StatsSnapshot {
        time_in_range: time_in_range(glucose, lower, upper),
        time_high: time_high(glucose, upper),
        time_low: time_low(glucose, lower),
        average_glucose: average_glucose(glucose),
        highest_day: highest_day(glucose, today),
        lowest_day: lowest_day(glucose, today),
        longest_stint: longest_stint(glucose, lower, upper, params.stint_policy),
        carbs_consumed: carbs_consumed(&dataset.carbs),
        insulin_total: insulin_total(
            &dataset.general,
            params.basal_rate_per_day,
            params.window_days,
        ),
        reservoir_estimate: reservoir_estimate(
            &dataset.general,
            params.basal_rate_per_day,
            params.window_days,
            params.reservoir_days,
        ),
        projected_a1c: projected_a1c(glucose),
    }
}

/// Share of readings in `[lower, upper]`, missing readings imputed with the median
pub fn time_in_range(glucose: &GlucoseSection, lower: f32, upper: f32) -> Stat<Percent> {
    share_of(glucose, |v| v >= lower && v <= upper)
}

/// Share of readings strictly above `upper`
pub fn time_high(glucose: &GlucoseSection, upper: f32) -> Stat<Percent> {
    share_of(glucose, |v| v > upper)
}

/// Share of readings strictly below `lower`; `0%` when none qualify
pub fn time_low(glucose: &GlucoseSection, lower: f32) -> Stat<Percent> {
    share_of(glucose, |v| v < lower)
}

/// Mean of the present readings, truncated
pub fn average_glucose(glucose: &GlucoseSection) -> Stat<Glucose> {
    mean(&glucose.present_values())
        .map(|m| Glucose(m as i32))
        .into()
}

/// Finished day with the highest mean glucose; the first such day wins ties
pub fn highest_day(glucose: &GlucoseSection, today: NaiveDate) -> Stat<DayAverage> {
    let mut best: Option<DayAverage> = None;
    let mut threshold = HIGHEST_DAY_FLOOR;

    for day in day_averages(glucose, today) {
        if day.value > threshold {
            threshold = day.value;
            best = Some(day);
        }
    }
    best.into()
}

/// Finished day with the lowest mean glucose; the first such day wins ties
pub fn lowest_day(glucose: &GlucoseSection, today: NaiveDate) -> Stat<DayAverage> {
    let mut best: Option<DayAverage> = None;
    let mut threshold = LOWEST_DAY_CEILING;

    for day in day_averages(glucose, today) {
        if day.value < threshold {
            threshold = day.value;
            best = Some(day);
        }
    }
    best.into()
}

/// In-range stint from a chronological scan of the present readings.
///
/// Each out-of-range reading closes the interval opened at the previous
/// close (or at the first reading).
pub fn longest_stint(
    glucose: &GlucoseSection,
    lower: f32,
    upper: f32,
    policy: StintPolicy,
) -> Stat<Stint> {
    let mut readings: Vec<(NaiveDateTime, f32)> = glucose
        .readings
        .iter()
        .filter_map(|r| r.sensor_glucose.map(|v| (r.timestamp(), v)))
        .collect();
    readings.sort_by_key(|(timestamp, _)| *timestamp);

    let (Some(first), Some(last_reading)) = (readings.first(), readings.last()) else {
        return Stat::Unavailable;
    };

    let mut start = first.0;
    let mut last: Option<Stint> = None;
    let mut longest: Option<Stint> = None;

    for (timestamp, value) in &readings {
        if *value >= lower && *value <= upper {
            continue;
        }
        let stint = Stint {
            start,
            end: *timestamp,
        };
        last = Some(stint);
        longest = Some(longer_of(longest, stint));
        start = *timestamp;
    }

    match policy {
        StintPolicy::LastInterval => last.into(),
        StintPolicy::Longest => {
            let trailing = Stint {
                start,
                end: last_reading.0,
            };
            Stat::Value(longer_of(longest, trailing))
        }
    }
}

/// Total carbohydrate input in grams
pub fn carbs_consumed(carbs: &CarbSummary) -> Stat<Grams> {
    Stat::Value(Grams(carbs.total_grams))
}

/// Truncated bolus total plus the basal dose over the window
pub fn insulin_total(
    general: &GeneralSection,
    basal_rate_per_day: f32,
    window_days: u32,
) -> Stat<InsulinUnits> {
    let basal_total = basal_rate_per_day * window_days as f32;
    Stat::Value(InsulinUnits(general.bolus_total().trunc() + basal_total))
}

/// Insulin total spread over the infusion-site cadence
pub fn reservoir_estimate(
    general: &GeneralSection,
    basal_rate_per_day: f32,
    window_days: u32,
    reservoir_days: u32,
) -> Stat<ReservoirEstimate> {
    if reservoir_days == 0 {
        return Stat::Unavailable;
    }
    match insulin_total(general, basal_rate_per_day, window_days) {
        Stat::Value(InsulinUnits(total)) => {
            Stat::Value(ReservoirEstimate(total / reservoir_days as f32))
        }
        Stat::Unavailable => Stat::Unavailable,
    }
}

/// A1C from the truncated average glucose, rounded to 2 decimals
pub fn projected_a1c(glucose: &GlucoseSection) -> Stat<ProjectedA1c> {
    match average_glucose(glucose) {
        Stat::Value(Glucose(eag)) => {
            let a1c = (eag as f64 + a1c::INTERCEPT) / a1c::SLOPE;
            Stat::Value(ProjectedA1c((a1c * 100.0).round() / 100.0))
        }
        Stat::Unavailable => Stat::Unavailable,
    }
}

/// Median of the values; the mean of the middle pair for even counts
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Every reading, with missing ones replaced by the median of the rest
pub fn imputed_values(glucose: &GlucoseSection) -> Option<Vec<f32>> {
    let fill = median(&glucose.present_values())?;
    Some(
        glucose
            .readings
            .iter()
            .map(|r| r.sensor_glucose.unwrap_or(fill))
            .collect(),
    )
}

/// `count / total` as a whole percent, rounding half to even
pub fn whole_percent(count: usize, total: usize) -> Percent {
    if total == 0 {
        return Percent(0);
    }
    let scaled = count * 100;
    let (quotient, remainder) = (scaled / total, scaled % total);
    let rounded = match (2 * remainder).cmp(&total) {
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    };
    Percent(rounded as u32)
}

fn share_of(glucose: &GlucoseSection, predicate: impl Fn(f32) -> bool) -> Stat<Percent> {
    let Some(values) = imputed_values(glucose) else {
        return Stat::Unavailable;
    };
    let count = values.iter().filter(|v| predicate(**v)).count();
    Stat::Value(whole_percent(count, values.len()))
}

fn mean(values: &[f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|v| *v as f64).sum();
    Some(sum / values.len() as f64)
}

/// Truncated mean per day before `today`, in first-seen date order
fn day_averages(glucose: &GlucoseSection, today: NaiveDate) -> Vec<DayAverage> {
    glucose
        .dates()
        .into_iter()
        .filter(|date| *date < today)
        .filter_map(|date| {
            let values: Vec<f32> = glucose
                .readings
                .iter()
                .filter(|r| r.date == date)
                .filter_map(|r| r.sensor_glucose)
                .collect();
            mean(&values).map(|m| DayAverage {
                date,
                value: m as i32,
            })
        })
        .collect()
}

fn longer_of(current: Option<Stint>, candidate: Stint) -> Stint {
    match current {
        Some(existing) if existing.duration() >= candidate.duration() => existing,
        _ => candidate,
    }
}
