//! Timestamp precision shared by every store backend.

use chrono::{DateTime, SubsecRound as _, Utc};

/// Fractional-second digits kept for stored timestamps.
pub const STORED_SUBSEC_DIGITS: u16 = 6;

/// Truncate `dt` to the precision records are persisted at, so a record
/// returned from a write equals the one read back later.
pub fn to_stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
  dt.trunc_subsecs(STORED_SUBSEC_DIGITS)
}
