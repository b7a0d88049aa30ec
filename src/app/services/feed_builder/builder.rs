//! Per-train feed record construction

use super::context::FeedContext;
use super::trip_naming::{
    base_trip_id, call_platform, leg_route_id, leg_trip_id, route_id, short_name,
};
use crate::Result;
use crate::app::models::{
    Leg, StopTimeRecord, TimetableRow, Train, TrainKey, TransferRecord, TripRecord,
};
use crate::app::services::leg_splitter::split_legs;
use crate::app::services::stop_registry::{StopDirectory, StopReconciler};
use crate::app::services::time_normalizer::TimeNormalizer;
use crate::app::services::train_grouper::assemble_train;
use crate::config::DayRolloverPolicy;
use tracing::{debug, trace};

/// Records produced by one train
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainOutput {
    pub trips: Vec<TripRecord>,
    pub stop_times: Vec<StopTimeRecord>,
    pub transfers: Vec<TransferRecord>,
}

impl TrainOutput {
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

/// Turns trains into trips, stop times and transfers
pub struct FeedBuilder<'a, D: StopDirectory + ?Sized> {
    reconciler: StopReconciler<'a, D>,
    day_rollover: DayRolloverPolicy,
}

impl<'a, D: StopDirectory + ?Sized> FeedBuilder<'a, D> {
    pub fn new(directory: &'a D, day_rollover: DayRolloverPolicy) -> Self {
        Self {
            reconciler: StopReconciler::new(directory),
            day_rollover,
        }
    }

    /// Build the records of one train from its raw rows
    ///
    /// Degenerate trains and legs are counted in `ctx.stats` and produce no
    /// records. Malformed times abort the conversion.
    pub fn build_train(
        &mut self,
        key: TrainKey,
        rows: &[TimetableRow],
        ctx: &mut FeedContext,
    ) -> Result<TrainOutput> {
        ctx.stats.trains_seen += 1;

        let Some(train) = assemble_train(key, rows)? else {
            trace!("Skipping train with fewer than two commercial stops");
            ctx.stats.trains_skipped += 1;
            return Ok(TrainOutput::default());
        };

        let output = self.build_legs(&train, ctx);
        ctx.stats.name_mismatches = self.reconciler.name_mismatches();

        if output.is_empty() {
            debug!("Train {} produced no usable legs", train.key);
            ctx.stats.trains_skipped += 1;
        } else {
            ctx.stats.trains_emitted += 1;
            ctx.stats.trips += output.trips.len();
            ctx.stats.stop_times += output.stop_times.len();
            ctx.stats.transfers += output.transfers.len();
        }

        Ok(output)
    }

    fn build_legs(&mut self, train: &Train, ctx: &mut FeedContext) -> TrainOutput {
        let legs = split_legs(&train.calls);
        let mut output = TrainOutput::default();
        if legs.is_empty() {
            return output;
        }

        let base_trip_id = base_trip_id(train);
        let base_route_id = route_id(train);
        let short_name = short_name(train);
        let headsign = train.headsign().to_string();
        let multi_leg = legs.len() > 1;
        if multi_leg {
            ctx.stats.multi_leg_trains += 1;
        }

        let mut normalizer = TimeNormalizer::new();
        let mut emitted: Vec<Option<String>> = Vec::with_capacity(legs.len());
        for (index, leg) in legs.iter().enumerate() {
            if self.day_rollover == DayRolloverPolicy::ResetPerLeg {
                normalizer.reset();
            }
            let trip_id = if multi_leg {
                leg_trip_id(&base_trip_id, index)
            } else {
                base_trip_id.clone()
            };
            let route_id = leg_route_id(&base_route_id, leg.mode);

            let stop_times = self.leg_stop_times(&trip_id, leg, &mut normalizer, ctx);
            if stop_times.len() < 2 {
                debug!(
                    "Leg {} has {} known stops, not emitting it",
                    trip_id,
                    stop_times.len()
                );
                ctx.stats.legs_skipped += 1;
                emitted.push(None);
                continue;
            }

            for stop_time in &stop_times {
                ctx.add_used_stop(&stop_time.stop_id);
            }
            ctx.add_route(&route_id);
            ctx.add_service(&train.key.service_date);

            output.trips.push(TripRecord {
                route_id,
                service_id: train.key.service_date.clone(),
                trip_id: trip_id.clone(),
                trip_headsign: headsign.clone(),
                trip_short_name: short_name.clone(),
            });
            output.stop_times.extend(stop_times);
            emitted.push(Some(trip_id));
        }

        for (index, pair) in emitted.windows(2).enumerate() {
            let (Some(from_trip), Some(to_trip)) = (&pair[0], &pair[1]) else {
                continue;
            };
            let coupling = legs[index]
                .coupling_station()
                .and_then(|code| self.reconciler.resolve(code));
            if let Some(stop) = coupling {
                output
                    .transfers
                    .push(TransferRecord::guaranteed(&stop.stop_id, from_trip, to_trip));
            }
        }

        output
    }

    /// Stop times of the known stops of a leg
    ///
    /// Only known stops are normalised, so a dropped station never moves the
    /// day rollover of the stops after it.
    fn leg_stop_times(
        &mut self,
        trip_id: &str,
        leg: &Leg,
        normalizer: &mut TimeNormalizer,
        ctx: &mut FeedContext,
    ) -> Vec<StopTimeRecord> {
        let known: Vec<_> = leg
            .calls
            .iter()
            .filter_map(|call| self.reconciler.reconcile(call, &mut ctx.missing_stops))
            .collect();
        ctx.stats.stop_times_dropped += leg.calls.len() - known.len();
        let known = normalizer.normalize_calls(&known);

        let Some(first) = known.first() else {
            return Vec::new();
        };
        let offset = first.distance_m;

        known
            .iter()
            .enumerate()
            .map(|(sequence, call)| StopTimeRecord {
                trip_id: trip_id.to_string(),
                stop_sequence: sequence as u32,
                stop_id: call.station_code.clone(),
                arrival_time: call.arrival.time,
                departure_time: call.departure.time,
                platform: call_platform(&call.departure.platform, &call.arrival.platform),
                shape_dist_traveled: call.distance_m - offset,
            })
            .collect()
    }
}
