//! Grouping of timetable rows into trains
//!
//! The carrier export is sorted by (service date, train number, position), so
//! a train is a maximal run of consecutive rows sharing the same key. The
//! grouper holds only the run being collected and hands it out as soon as the
//! key changes, keeping memory flat regardless of the size of the export.

use crate::app::models::{StopCall, TimetableRow, Train, TrainKey};
use crate::Result;
use tracing::trace;

/// Lazy iterator over per-train row groups
///
/// Input order is trusted: rows of one train that are not adjacent end up in
/// separate groups. Errors from the underlying reader are passed through
/// unchanged and do not disturb the group being collected.
pub struct TrainGroups<I> {
    rows: I,
    current: Option<(TrainKey, Vec<TimetableRow>)>,
    exhausted: bool,
}

impl<I, E> TrainGroups<I>
where
    I: Iterator<Item = std::result::Result<TimetableRow, E>>,
{
    pub fn new(rows: I) -> Self {
        Self {
            rows,
            current: None,
            exhausted: false,
        }
    }

    /// Underlying row source
    pub fn get_ref(&self) -> &I {
        &self.rows
    }
}

impl<I, E> Iterator for TrainGroups<I>
where
    I: Iterator<Item = std::result::Result<TimetableRow, E>>,
{
    type Item = std::result::Result<(TrainKey, Vec<TimetableRow>), E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return self.current.take().map(Ok);
        }

        loop {
            match self.rows.next() {
                Some(Ok(row)) => {
                    let key = row.train_key();
                    if let Some((current_key, rows)) = &mut self.current {
                        if *current_key == key {
                            rows.push(row);
                            continue;
                        }
                    }

                    if let Some(group) = self.current.replace((key, vec![row])) {
                        trace!("Collected train {} ({} rows)", group.0, group.1.len());
                        return Some(Ok(group));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.exhausted = true;
                    return self.current.take().map(Ok);
                }
            }
        }
    }
}

/// Group an ordered row stream by train
pub fn group_trains<I, E>(rows: I) -> TrainGroups<I::IntoIter>
where
    I: IntoIterator<Item = std::result::Result<TimetableRow, E>>,
{
    TrainGroups::new(rows.into_iter())
}

/// Build a train from its rows
///
/// Only commercial stations are kept, ordered by position; the sort is stable
/// so rows sharing a position keep their input order. Returns `None` for
/// trains with fewer than two commercial stops.
pub fn assemble_train(key: TrainKey, rows: &[TimetableRow]) -> Result<Option<Train>> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut commercial: Vec<&TimetableRow> = rows.iter().filter(|row| row.commercial).collect();
    if commercial.len() < 2 {
        return Ok(None);
    }
    commercial.sort_by_key(|row| row.sequence);

    let calls = commercial
        .into_iter()
        .map(StopCall::from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(Train {
        key,
        category: first.category.clone(),
        commercial_number: first.commercial_number.clone(),
        name: first.train_name.clone(),
        calls,
    }))
}
