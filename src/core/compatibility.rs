//! Recipient to donor blood group compatibility.

use crate::models::BloodGroup::{self, *};

const FROM_A_POSITIVE: &[BloodGroup] = &[APositive, ANegative, OPositive, ONegative];
const FROM_A_NEGATIVE: &[BloodGroup] = &[ANegative, ONegative];
const FROM_B_POSITIVE: &[BloodGroup] = &[BPositive, BNegative, OPositive, ONegative];
const FROM_B_NEGATIVE: &[BloodGroup] = &[BNegative, ONegative];
const FROM_AB_POSITIVE: &[BloodGroup] = &BloodGroup::ALL;
const FROM_AB_NEGATIVE: &[BloodGroup] = &[ANegative, BNegative, AbNegative, ONegative];
const FROM_O_POSITIVE: &[BloodGroup] = &[OPositive, ONegative];
const FROM_O_NEGATIVE: &[BloodGroup] = &[ONegative];

/// Donor groups that may give blood to a recipient of `recipient`
pub fn compatible_donors(recipient: BloodGroup) -> &'static [BloodGroup] {
    match recipient {
        APositive => FROM_A_POSITIVE,
        ANegative => FROM_A_NEGATIVE,
        BPositive => FROM_B_POSITIVE,
        BNegative => FROM_B_NEGATIVE,
        AbPositive => FROM_AB_POSITIVE,
        AbNegative => FROM_AB_NEGATIVE,
        OPositive => FROM_O_POSITIVE,
        ONegative => FROM_O_NEGATIVE,
    }
}

/// Lookup by wire name. Unknown groups have no compatible donors.
pub fn compatible_donor_types(recipient: &str) -> &'static [BloodGroup] {
    recipient
        .parse::<BloodGroup>()
        .map(compatible_donors)
        .unwrap_or(&[])
}

/// Whether a donor with blood type `donor_type` can give to `recipient`
///
/// Both sides are wire names; an unknown recipient accepts nobody.
#[inline]
pub fn can_donate(donor_type: &str, recipient: &str) -> bool {
    compatible_donor_types(recipient)
        .iter()
        .any(|group| group.as_str() == donor_type)
}
