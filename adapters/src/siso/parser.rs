use corelib::Reservation;

use super::SlotHandle;

/// Turn scraped `td` texts into reservations, one per table row.
pub fn parse_rows(rows: Vec<Vec<Option<String>>>) -> Vec<Reservation> {
    rows.into_iter().map(Reservation::from_cells).collect()
}

/// Exact match on trimmed link text; the first matching link wins.
pub fn match_time_slot(texts: &[String], target: &str) -> Option<SlotHandle> {
    let target = target.trim();
    texts
        .iter()
        .position(|t| t.trim() == target)
        .map(|index| SlotHandle {
            index,
            label: texts[index].trim().to_string(),
        })
}
