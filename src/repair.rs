//! Feasibility repair.
//!
//! Projects an arbitrary decision onto the feasible region:
//! - purchases are clamped to hub storage headroom;
//! - loads are clamped, flight by flight in departure order, to
//!   `min(current value, aircraft capacity, stock still available at the
//!   origin at departure)`.
//!
//! Availability is tracked on an [`InventoryTimeline`] seeded from the
//! snapshot, pending inflows, and the (clamped) purchases. Each repaired
//! load is booked immediately (departure at the origin, usable arrival
//! at the destination), so stock consumed by an earlier flight is
//! unavailable to later ones and delivered stock becomes available to
//! flights departing after it is processed.
//!
//! Repair is idempotent: a repaired decision is already within every
//! bound, and the same flights are processed in the same order, so a
//! second pass changes nothing.

use crate::models::{Decision, ServiceClass};
use crate::problem::PlanningProblem;
use crate::timeline::InventoryTimeline;

/// Repairs `decision` in place.
pub fn repair(problem: &PlanningProblem, decision: &mut Decision) {
    let headroom = problem.hub_headroom();
    for class in ServiceClass::ALL {
        decision.purchases[class] = decision.purchases[class].min(headroom[class]);
    }

    decision
        .loads
        .resize(problem.flights.len(), Default::default());

    let mut timeline = InventoryTimeline::seeded(problem);
    timeline.add_purchases(problem, decision.purchases);

    for (flight, loads) in problem.flights.iter().zip(decision.loads.iter_mut()) {
        let until = problem.horizon_end.max(flight.departure_hour);
        for class in ServiceClass::ALL {
            let available = timeline
                .min_level_from(flight.origin, class, flight.departure_hour, until)
                .clamp(0, i64::from(u32::MAX)) as u32;
            let load = loads[class].min(flight.capacity[class]).min(available);
            loads[class] = load;
            timeline.add_load(problem, flight, class, load);
        }
    }

    decision.invalidate();
}

/// Returns a repaired copy.
pub fn repaired(problem: &PlanningProblem, decision: &Decision) -> Decision {
    let mut copy = decision.clone();
    repair(problem, &mut copy);
    copy
}

/// Whether a decision already satisfies every repair bound.
pub fn is_feasible(problem: &PlanningProblem, decision: &Decision) -> bool {
    let mut copy = decision.clone();
    repair(problem, &mut copy);
    copy.loads == decision.loads && copy.purchases == decision.purchases
}
