//! Weekly calendar and time slots.
//!
//! The calendar is the single immutable table of weekdays and time bands.
//! It is constructed once (usually from configuration) and passed explicitly
//! to slot generation and the graph builder.
//!
//! # Band Model
//! Bands are indexed `0..bands.len()`. The first and last bands are
//! non-teaching; valid hour indices are `1..bands.len() - 1`. A configured
//! subset of band indices is marked "night".
//!
//! # Slot Identity
//! A slot id is `{weekday_number}_{hour}`, so the same calendar always yields
//! the same slot ids in the same order (weekday-major, hour-minor).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ConfigError;

/// A teaching weekday.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weekday {
    /// Stable numeric code (used in slot ids).
    pub number: u8,
    /// Display name.
    pub name: String,
}

impl Weekday {
    /// Creates a weekday.
    pub fn new(number: u8, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
        }
    }
}

/// Static weekly calendar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calendar {
    /// Teaching days, in display order.
    pub weekdays: Vec<Weekday>,
    /// Time-range labels, indexed by hour index.
    pub bands: Vec<String>,
    /// Hour indices considered evening sessions.
    pub night_bands: Vec<usize>,
    /// Program whose mandatory courses may only use night slots.
    pub night_program: String,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            weekdays: vec![
                Weekday::new(2, "Monday"),
                Weekday::new(3, "Tuesday"),
                Weekday::new(4, "Wednesday"),
                Weekday::new(5, "Thursday"),
                Weekday::new(6, "Friday"),
            ],
            bands: [
                "7h00 - 7h55",
                "7h55 - 9h45",
                "10h10 - 12h00",
                "13h30 - 15h20",
                "15h45 - 17h35",
                "19h00 - 20h40",
                "21h00 - 22h40",
                "22h40 - 23h30",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            night_bands: vec![5, 6, 7],
            night_program: "SIN".to_string(),
        }
    }
}

impl Calendar {
    /// Creates a calendar from explicit tables.
    pub fn new(weekdays: Vec<Weekday>, bands: Vec<String>) -> Self {
        Self {
            weekdays,
            bands,
            night_bands: Vec::new(),
            night_program: String::new(),
        }
    }

    /// Sets the night band indices.
    pub fn with_night_bands(mut self, night_bands: Vec<usize>) -> Self {
        self.night_bands = night_bands;
        self
    }

    /// Sets the night program code.
    pub fn with_night_program(mut self, program: impl Into<String>) -> Self {
        self.night_program = program.into();
        self
    }

    /// Valid teaching hour indices (first and last band excluded).
    pub fn valid_hours(&self) -> Vec<usize> {
        if self.bands.len() < 3 {
            return Vec::new();
        }
        (1..self.bands.len() - 1).collect()
    }

    /// Whether an hour index is a night band.
    #[inline]
    pub fn is_night(&self, hour: usize) -> bool {
        self.night_bands.contains(&hour)
    }

    /// Whether a program is the designated night program.
    pub fn is_night_program(&self, program: &str) -> bool {
        !self.night_program.is_empty()
            && program.trim().eq_ignore_ascii_case(self.night_program.trim())
    }

    /// Time-range label of a band.
    pub fn band_label(&self, hour: usize) -> Option<&str> {
        self.bands.get(hour).map(String::as_str)
    }

    /// Generates the full slot set: weekdays × valid hour indices.
    pub fn slots(&self) -> Vec<Slot> {
        let hours = self.valid_hours();
        let mut slots = Vec::with_capacity(self.weekdays.len() * hours.len());
        for day in &self.weekdays {
            for &hour in &hours {
                slots.push(Slot {
                    id: format!("{}_{}", day.number, hour),
                    weekday: day.clone(),
                    hour,
                    time_range: self.bands[hour].clone(),
                });
            }
        }
        slots
    }

    /// Number of slots [`slots`](Self::slots) will produce.
    pub fn slot_count(&self) -> usize {
        self.weekdays.len() * self.valid_hours().len()
    }

    /// Checks table consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bands.len() < 3 {
            return Err(ConfigError::Invalid(format!(
                "calendar needs at least 3 bands (first and last are reserved), got {}",
                self.bands.len()
            )));
        }
        if self.weekdays.is_empty() {
            return Err(ConfigError::Invalid("calendar has no weekdays".into()));
        }
        let mut seen = HashSet::new();
        for day in &self.weekdays {
            if !seen.insert(day.number) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate weekday number {}",
                    day.number
                )));
            }
        }
        if let Some(bad) = self.night_bands.iter().find(|&&h| h >= self.bands.len()) {
            return Err(ConfigError::Invalid(format!(
                "night band {bad} is outside the band table (0..{})",
                self.bands.len()
            )));
        }
        Ok(())
    }
}

/// A (weekday, hour) teaching slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// `{weekday_number}_{hour}`.
    pub id: String,
    pub weekday: Weekday,
    /// Position in the band table.
    pub hour: usize,
    /// Display time range.
    pub time_range: String,
}
