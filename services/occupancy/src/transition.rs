//! The scan transition rule
//!
//! Stores gather the facts for one scan while holding their locks (is the
//! building known, which open session matches the tag) and ask [`plan`] what
//! to do. Keeping the decision here means every store applies exactly the same
//! rule:
//!
//! | direction | building known | open session | result                        |
//! |-----------|----------------|--------------|-------------------------------|
//! | IN        | yes            | -            | open, counter + 1             |
//! | IN        | no             | -            | open, counter untouched       |
//! | OUT       | yes            | found        | close, counter - 1 (floor 0)  |
//! | OUT       | no             | found        | close, counter untouched      |
//! | OUT       | any            | none         | drop with `NoOpenSession`     |

use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::models::{Anomaly, Direction, SessionId};

/// Change applied to a building's occupancy counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterChange {
    Increment,
    Decrement,
    Unchanged,
}

impl CounterChange {
    /// New counter value, clamped at zero
    pub fn apply(self, count: i32) -> i32 {
        match self {
            CounterChange::Increment => count.saturating_add(1),
            CounterChange::Decrement => count.saturating_sub(1).max(0),
            CounterChange::Unchanged => count,
        }
    }
}

/// What a store must do for one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Append a new open session
    Open { counter: CounterChange },
    /// Stamp the exit time on an existing open session
    Close {
        session_id: SessionId,
        counter: CounterChange,
    },
    /// Leave everything as it is
    Reject(Anomaly),
}

/// Decide the transition for a validated scan.
///
/// `open_session` is the most recent open session for the scan's tag at the
/// scan's building; it is ignored for `IN` scans.
pub fn plan(
    direction: Direction,
    building_known: bool,
    open_session: Option<SessionId>,
) -> Transition {
    match direction {
        Direction::In => Transition::Open {
            counter: if building_known {
                CounterChange::Increment
            } else {
                CounterChange::Unchanged
            },
        },
        Direction::Out => match open_session {
            Some(session_id) => Transition::Close {
                session_id,
                counter: if building_known {
                    CounterChange::Decrement
                } else {
                    CounterChange::Unchanged
                },
            },
            None => Transition::Reject(Anomaly::NoOpenSession),
        },
    }
}

/// Current instant at the precision PostgreSQL stores (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Exit time for a session, always strictly after its entry time.
pub fn exit_time(entry_time: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    if now > entry_time {
        now
    } else {
        entry_time + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_opens_and_increments_known_building() {
        assert_eq!(
            plan(Direction::In, true, None),
            Transition::Open {
                counter: CounterChange::Increment
            }
        );
    }

    #[test]
    fn test_in_at_unknown_building_leaves_counter() {
        assert_eq!(
            plan(Direction::In, false, None),
            Transition::Open {
                counter: CounterChange::Unchanged
            }
        );
    }

    #[test]
    fn test_in_ignores_open_session() {
        // A tag that is already inside still gets a fresh session.
        assert_eq!(
            plan(Direction::In, true, Some(3)),
            Transition::Open {
                counter: CounterChange::Increment
            }
        );
    }

    #[test]
    fn test_out_closes_matching_session() {
        assert_eq!(
            plan(Direction::Out, true, Some(42)),
            Transition::Close {
                session_id: 42,
                counter: CounterChange::Decrement
            }
        );
        assert_eq!(
            plan(Direction::Out, false, Some(42)),
            Transition::Close {
                session_id: 42,
                counter: CounterChange::Unchanged
            }
        );
    }

    #[test]
    fn test_out_without_open_session_is_rejected() {
        assert_eq!(
            plan(Direction::Out, true, None),
            Transition::Reject(Anomaly::NoOpenSession)
        );
        assert_eq!(
            plan(Direction::Out, false, None),
            Transition::Reject(Anomaly::NoOpenSession)
        );
    }

    #[test]
    fn test_counter_decrement_clamps_at_zero() {
        assert_eq!(CounterChange::Decrement.apply(0), 0);
        assert_eq!(CounterChange::Decrement.apply(1), 0);
        assert_eq!(CounterChange::Decrement.apply(5), 4);
        assert_eq!(CounterChange::Increment.apply(0), 1);
        assert_eq!(CounterChange::Increment.apply(i32::MAX), i32::MAX);
        assert_eq!(CounterChange::Unchanged.apply(9), 9);
    }

    #[test]
    fn test_exit_time_is_strictly_after_entry() {
        let entry = now();
        assert!(exit_time(entry, entry) > entry);
        assert!(exit_time(entry, entry - Duration::seconds(5)) > entry);

        let later = entry + Duration::seconds(30);
        assert_eq!(exit_time(entry, later), later);
    }

    #[test]
    fn test_now_has_microsecond_precision() {
        let instant = now();
        assert_eq!(instant.timestamp_subsec_nanos() % 1_000, 0);
    }
}
