//! Splitting of trains at train/bus mode changes
//!
//! When part of a route is served by a replacement bus, the carrier marks the
//! affected rows with the `BUS` flag. Each maximal run of one mode becomes a
//! leg. The station where the mode changes belongs to both neighbouring legs:
//! the earlier leg ends there with an arrival-only call and the later leg
//! starts there with a departure-only call. Both copies carry the mode of the
//! station's own row, so the closing call of a leg is tagged with the mode it
//! hands over to.

use crate::app::models::{Leg, StopCall};

/// Partition a train's calls into single-mode legs
///
/// A flip on the final call never opens a new leg. Legs shorter than two
/// calls are not emitted. A train that stays in one mode comes back as a
/// single leg holding its calls unchanged.
pub fn split_legs(calls: &[StopCall]) -> Vec<Leg> {
    let Some(first) = calls.first() else {
        return Vec::new();
    };

    let mut legs = Vec::new();
    let mut mode = first.mode;
    let mut current = vec![first.clone()];
    let last_index = calls.len() - 1;

    for (index, call) in calls.iter().enumerate().skip(1) {
        if call.mode != mode && index != last_index {
            current.push(call.arrival_only(call.mode));
            if current.len() >= 2 {
                legs.push(Leg {
                    mode,
                    calls: std::mem::take(&mut current),
                });
            }
            mode = call.mode;
            current = vec![call.departure_only(mode)];
        } else {
            current.push(call.clone());
        }
    }

    if current.len() >= 2 {
        legs.push(Leg {
            mode,
            calls: current,
        });
    }

    // Every leg of a split train opens with a departure-only call
    if legs.len() > 1 {
        let opening_mode = legs[0].mode;
        if let Some(opening) = legs[0].calls.first_mut() {
            *opening = opening.departure_only(opening_mode);
        }
    }

    legs
}
