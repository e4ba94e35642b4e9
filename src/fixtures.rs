//! CareLink-shaped export text for tests.

use std::io::Write;
use std::path::{Path, PathBuf};

pub(crate) const HEADER: &[&str] = &[
    "Index",
    "Date",
    "Time",
    "New Device Time",
    "BG Source",
    "BG Reading (mg/dL)",
    "Linked BG Meter ID",
    "Basal Rate (U/h)",
    "Temp Basal Amount",
    "Temp Basal Type",
    "Temp Basal Duration (h:mm:ss)",
    "Bolus Type",
    "Bolus Volume Selected (U)",
    "Bolus Volume Delivered (U)",
    "Bolus Duration (h:mm:ss)",
    "Prime Type",
    "Prime Volume Delivered (U)",
    "Alarm",
    "Suspend",
    "Rewind",
    "BWZ Estimate (U)",
    "BWZ Target High BG (mg/dL)",
    "BWZ Target Low BG (mg/dL)",
    "BWZ Carb Ratio (g/U)",
    "BWZ Insulin Sensitivity (mg/dL/U)",
    "BWZ Carb Input (grams)",
    "BWZ BG Input (mg/dL)",
    "BWZ Correction Estimate (U)",
    "BWZ Food Estimate (U)",
    "BWZ Active Insulin (U)",
    "BWZ Status",
    "Sensor Calibration BG (mg/dL)",
    "Sensor Glucose (mg/dL)",
    "ISIG Value",
    "Event Marker",
    "Bolus Number",
    "Bolus Cancellation Reason",
    "BWZ Unabsorbed Insulin Total (U)",
    "Final Bolus Estimate",
    "Scroll Step Size",
    "Insulin Action Curve Time",
    "Sensor Calibration Rejected Reason",
    "Preset Bolus",
    "Bolus Source",
    "BLE Network Device",
    "Network Device Associated Reason",
    "Network Device Disassociated Reason",
    "Network Device Disconnected Reason",
    "Sensor Exception",
    "Preset Temp Basal Name",
];

const PREAMBLE: &[&str] = &[
    "Last Name,First Name,Patient ID,Start Date,End Date,,,,",
    "Doe,Jane,,10/09/21 00:00:00,10/16/21 23:59:59,,,,",
    ",,,,,,,,",
    "Device,MiniMed 670G MMT-1780,Serial Number,NG1234567H,,,,,",
];

type Row = Vec<(&'static str, String)>;

/// Builds export text with the device's section layout: general rows, one
/// footer row, sentinel, carb rows, two footer rows, sentinel, glucose rows,
/// one trailing footer row.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExportBuilder {
    general: Vec<Row>,
    carbs: Vec<Row>,
    glucose: Vec<Row>,
    sentinels: bool,
    dropped_column: Option<&'static str>,
}

impl ExportBuilder {
    pub(crate) fn new() -> Self {
        Self {
            sentinels: true,
            ..Default::default()
        }
    }

    pub(crate) fn general(
        mut self,
        index: u32,
        date: &str,
        time: &str,
        bolus: Option<&str>,
        basal: Option<&str>,
    ) -> Self {
        self.general.push(vec![
            ("Index", index.to_string()),
            ("Date", date.to_string()),
            ("Time", time.to_string()),
            ("Bolus Volume Delivered (U)", bolus.unwrap_or("").to_string()),
            ("Basal Rate (U/h)", basal.unwrap_or("").to_string()),
        ]);
        self
    }

    pub(crate) fn carb(mut self, index: u32, date: &str, time: &str, grams: &str) -> Self {
        self.carbs.push(vec![
            ("Index", index.to_string()),
            ("Date", date.to_string()),
            ("Time", time.to_string()),
            ("BWZ Carb Input (grams)", grams.to_string()),
        ]);
        self
    }

    pub(crate) fn glucose(mut self, index: u32, date: &str, time: &str, value: &str) -> Self {
        self.glucose.push(vec![
            ("Index", index.to_string()),
            ("Date", date.to_string()),
            ("Time", time.to_string()),
            ("Sensor Glucose (mg/dL)", value.to_string()),
        ]);
        self
    }

    /// Replace the sentinel rows with footer rows
    pub(crate) fn without_sentinels(mut self) -> Self {
        self.sentinels = false;
        self
    }

    /// Emit the header without one column, as a drifted export would
    pub(crate) fn without_column(mut self, column: &'static str) -> Self {
        self.dropped_column = Some(column);
        self
    }

    pub(crate) fn render(&self) -> String {
        let header = self.header_line();
        let sentinel = if self.sentinels {
            header.clone()
        } else {
            self.footer()
        };

        let mut lines: Vec<String> = PREAMBLE.iter().map(|l| l.to_string()).collect();
        lines.push(header);
        lines.extend(self.general.iter().map(|r| self.row(r)));
        lines.push(self.footer());
        lines.push(sentinel.clone());
        lines.extend(self.carbs.iter().map(|r| self.row(r)));
        lines.push(self.footer());
        lines.push(self.footer());
        lines.push(sentinel);
        lines.extend(self.glucose.iter().map(|r| self.row(r)));
        lines.push(self.footer());

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Write the export into `dir` as `raw_data.csv`
    pub(crate) fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("raw_data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(self.render().as_bytes()).unwrap();
        path
    }

    fn columns(&self) -> Vec<&'static str> {
        HEADER
            .iter()
            .copied()
            .filter(|c| Some(*c) != self.dropped_column)
            .collect()
    }

    fn header_line(&self) -> String {
        self.columns().join(",")
    }

    fn row(&self, values: &[(&'static str, String)]) -> String {
        self.columns()
            .iter()
            .map(|column| {
                values
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn footer(&self) -> String {
        self.row(&[
            ("Index", "-------".to_string()),
            ("Date", "MiniMed 670G MMT-1780".to_string()),
            ("Time", "Pump".to_string()),
            ("New Device Time", "NG1234567H".to_string()),
            ("BG Source", "-------".to_string()),
        ])
    }
}
