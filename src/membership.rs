use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::MembershipType;

/// generate_membership_id
///
/// Builds a human-readable membership id of the form `JR-123456-042`:
/// the tier prefix, the last six digits of the current Unix time in milliseconds,
/// and a random three-digit suffix. Ids are not checked for collisions; the
/// `membership_id` unique constraint on the table is the only guard.
pub fn generate_membership_id(membership_type: MembershipType) -> String {
    membership_id_at(membership_type, Utc::now(), &mut rand::rng())
}

/// Deterministic core of [`generate_membership_id`], parameterised over the clock and the RNG.
pub fn membership_id_at<R: Rng + ?Sized>(
    membership_type: MembershipType,
    now: DateTime<Utc>,
    rng: &mut R,
) -> String {
    let timestamp = now.timestamp_millis().rem_euclid(1_000_000);
    let random: u16 = rng.random_range(0..1000);
    format!(
        "{}-{:06}-{:03}",
        membership_type.id_prefix(),
        timestamp,
        random
    )
}
