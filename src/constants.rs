//! Application constants for the CareLink export pipeline
//!
//! Column names, section boundary offsets, clinical constants and
//! presentation defaults used throughout the crate.

// =============================================================================
// Input File Layout
// =============================================================================

/// Default location of the weekly export, relative to the working directory
pub const DEFAULT_EXPORT_PATH: &str = "data/raw/raw_data.csv";

/// Glob pattern used when the input path is a directory
pub const EXPORT_FILE_PATTERN: &str = "*.csv";

/// Non-tabular lines (patient name, device, date range) before the header row
pub const PREAMBLE_LINES: usize = 4;

/// Value of the `Index` field on the repeated header rows between sub-tables
pub const SENTINEL_MARKER: &str = "Index";

/// Row offsets around the sentinel rows. The device writes a footer row
/// before the first sentinel, two before the second, and one at the end.
pub mod offsets {
    /// Rows dropped between the general section and the first sentinel
    pub const GAP_BEFORE_FIRST: usize = 1;

    /// Rows dropped between the carb/insulin section and the second sentinel
    pub const GAP_BEFORE_SECOND: usize = 2;

    /// Trailing footer rows after the glucose section
    pub const TRAILING_ROWS: usize = 1;
}

// =============================================================================
// Column Names
// =============================================================================

/// Exact column headers of the device export. These are the compatibility
/// contract with the upstream export tool and must match byte for byte.
pub mod columns {
    pub const INDEX: &str = "Index";
    pub const DATE: &str = "Date";
    pub const TIME: &str = "Time";
    pub const BOLUS_VOLUME_DELIVERED: &str = "Bolus Volume Delivered (U)";
    pub const BASAL_RATE: &str = "Basal Rate (U/h)";
    pub const BWZ_CARB_INPUT: &str = "BWZ Carb Input (grams)";
    pub const SENSOR_GLUCOSE: &str = "Sensor Glucose (mg/dL)";
}

/// Columns kept from the general (device event) section
pub const GENERAL_COLUMNS: &[&str] = &[
    columns::INDEX,
    columns::DATE,
    columns::TIME,
    columns::BOLUS_VOLUME_DELIVERED,
    columns::BASAL_RATE,
];

/// Columns kept from the carb/insulin section
pub const CARB_INSULIN_COLUMNS: &[&str] = &[columns::BWZ_CARB_INPUT];

/// Columns kept from the sensor glucose section
pub const GLUCOSE_COLUMNS: &[&str] = &[
    columns::INDEX,
    columns::DATE,
    columns::TIME,
    columns::SENSOR_GLUCOSE,
];

// =============================================================================
// Date/Time Parsing
// =============================================================================

/// Date formats for values that start with a 4-digit year
pub const DATE_FORMATS_YEAR_FIRST: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

/// Date formats for values that start with the month; 2-digit years first
pub const DATE_FORMATS_MONTH_FIRST: &[&str] = &["%m/%d/%y", "%m/%d/%Y"];

/// Time formats accepted in the `Time` column, tried in order
pub const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Combined date-time formats; only one half is kept when these match
pub const DATETIME_FORMATS_YEAR_FIRST: &[&str] =
    &["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub const DATETIME_FORMATS_MONTH_FIRST: &[&str] = &[
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Label format for a single day, e.g. "Monday 10/11"
pub const DAY_LABEL_FORMAT: &str = "%A %m/%d";

// =============================================================================
// Statistics
// =============================================================================

/// Default lower glucose bound (mg/dL), matching the dashboard slider
pub const DEFAULT_LOWER_BOUND: f32 = 80.0;

/// Default upper glucose bound (mg/dL), matching the dashboard slider
pub const DEFAULT_UPPER_BOUND: f32 = 150.0;

/// Days covered by one weekly export
pub const WINDOW_DAYS: u32 = 7;

/// Infusion-site change cadence used for the reservoir estimate
pub const RESERVOIR_DAYS: u32 = 3;

/// Starting value when searching for the highest average day
pub const HIGHEST_DAY_FLOOR: i32 = 0;

/// Starting value when searching for the lowest average day
pub const LOWEST_DAY_CEILING: i32 = 500;

/// eAG to A1C conversion: A1C = (eAG + 46.7) / 28.7 (Nathan et al., 2008)
pub mod a1c {
    pub const INTERCEPT: f64 = 46.7;
    pub const SLOPE: f64 = 28.7;
}

/// Rendering of a metric that could not be computed
pub const UNAVAILABLE: &str = "NaN";

// =============================================================================
// Presentation Defaults
// =============================================================================

/// Fixed chart reference lines, independent of the statistics bounds
pub const CHART_TARGET_LOW: f32 = 80.0;
pub const CHART_TARGET_HIGH: f32 = 180.0;
