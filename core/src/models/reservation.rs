use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type UserId = String;

/// One row of the site's "my reservations" table.
///
/// Cells keep the raw `textContent` the site rendered, layout whitespace
/// included. Two reservations are equal when every column matches positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    columns: Vec<String>,
}

impl Reservation {
    /// Build from raw cell texts. Missing text becomes an empty column.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let columns = cells
            .into_iter()
            .map(|c| c.map(|s| s.as_ref().to_string()).unwrap_or_default())
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(String::as_str)
    }

    /// Columns with surrounding whitespace removed, for printing.
    pub fn display_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.trim()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationList {
    pub list: Vec<Reservation>,
}

/// Persisted reservation lists keyed by user id.
pub type PerUserReservationCache = HashMap<UserId, ReservationList>;
