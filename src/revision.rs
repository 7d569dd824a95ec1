//! Strap percentage to board revision classification.
//!
//! The strap divider on PA7 produces a fixed fraction of +3V3 for each
//! hardware revision. Production units mirror the ratio around the midpoint,
//! so a reading above 51% is folded back down and marks the unit as
//! production.
//!
//! ```text
//! hardware version  |  percent of +3V3
//! ___________________________________________
//! 0.6               |  0-1
//! future versions   |  2-20
//! 1.4               |  21-22
//! 1.3               |  23-24
//! 1.2               |  25-26
//! 1.0               |  27-28
//! 1.1               |  29-31
//! reserved          |  32-48
//! 0.7               |  49-51
//! reserved          |  52-68
//! 1.1-production    |  69-71
//! future-production |  72-100
//! ```
use core::fmt;

use crate::{ADC_BITS, ADC_MAX_READING};

/// Added before the shift so the percentage rounds to nearest.
pub const ROUNDING_BIAS: u32 = 1 << (ADC_BITS - 1);
/// Highest unfolded percentage of a non-production board.
pub const FOLD_MIDPOINT: u8 = 51;
pub const FULL_SCALE_PERCENT: u8 = 100;

/// `(major << 8) | minor`, as carried in the device descriptor.
pub const fn bcd(major: u8, minor: u8) -> u16 {
    ((major as u16) << 8) | minor as u16
}

/// Hardware revision, reported to the host in bcdDevice form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RevisionCode {
    #[default]
    Unknown,
    Rev0_6,
    Rev0_7,
    Rev1_0,
    Rev1_1,
    Rev1_2,
    Rev1_3,
    Rev1_4,
}

impl RevisionCode {
    pub const ALL: [RevisionCode; 8] = [
        RevisionCode::Unknown,
        RevisionCode::Rev0_6,
        RevisionCode::Rev0_7,
        RevisionCode::Rev1_0,
        RevisionCode::Rev1_1,
        RevisionCode::Rev1_2,
        RevisionCode::Rev1_3,
        RevisionCode::Rev1_4,
    ];

    pub const fn major(self) -> u8 {
        match self {
            RevisionCode::Unknown | RevisionCode::Rev0_6 | RevisionCode::Rev0_7 => 0,
            _ => 1,
        }
    }

    pub const fn minor(self) -> u8 {
        match self {
            RevisionCode::Unknown => 0,
            RevisionCode::Rev0_6 => 6,
            RevisionCode::Rev0_7 => 7,
            RevisionCode::Rev1_0 => 0,
            RevisionCode::Rev1_1 => 1,
            RevisionCode::Rev1_2 => 2,
            RevisionCode::Rev1_3 => 3,
            RevisionCode::Rev1_4 => 4,
        }
    }

    pub const fn bcd(self) -> u16 {
        bcd(self.major(), self.minor())
    }

    pub fn from_bcd(bcd: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|rev| rev.bcd() == bcd)
    }

    pub const fn is_known(self) -> bool {
        !matches!(self, RevisionCode::Unknown)
    }
}

impl fmt::Display for RevisionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "r{}.{}", self.major(), self.minor())
        } else {
            f.write_str("unknown")
        }
    }
}

/// Inclusive upper bound of each band, ascending. Covers the folded domain
/// 0..=51 without gaps; unassigned bands resolve to `Unknown`.
pub const REVISION_THRESHOLDS: &[(RevisionCode, u8)] = &[
    (RevisionCode::Rev0_6, 1),
    (RevisionCode::Unknown, 20),
    (RevisionCode::Rev1_4, 22),
    (RevisionCode::Rev1_3, 24),
    (RevisionCode::Rev1_2, 26),
    (RevisionCode::Rev1_0, 28),
    (RevisionCode::Rev1_1, 31),
    (RevisionCode::Unknown, 48),
    (RevisionCode::Rev0_7, 51),
];

/// Converts a 12-bit reading to a percentage of the reference, rounded to
/// the nearest integer. Readings past `ADC_MAX_READING` count as full scale.
pub const fn percentage(reading: u16) -> u8 {
    let reading = if reading > ADC_MAX_READING {
        ADC_MAX_READING
    } else {
        reading
    };
    ((reading as u32 * FULL_SCALE_PERCENT as u32 + ROUNDING_BIAS) >> ADC_BITS) as u8
}

/// Folds a percentage above the midpoint back below it. Returns the folded
/// value and whether the fold happened, i.e. the production flag.
pub const fn fold(percentage: u8) -> (u8, bool) {
    if percentage > FOLD_MIDPOINT {
        (FULL_SCALE_PERCENT.saturating_sub(percentage), true)
    } else {
        (percentage, false)
    }
}

/// Index of the first band whose bound covers `percentage`.
pub fn band_index(percentage: u8) -> Option<usize> {
    REVISION_THRESHOLDS
        .iter()
        .position(|&(_, bound)| percentage <= bound)
}

/// Classifies a folded percentage. Values past the last band cannot come
/// out of `fold` and report `Unknown`.
pub fn classify(percentage: u8) -> RevisionCode {
    band_index(percentage)
        .map(|i| REVISION_THRESHOLDS[i].0)
        .unwrap_or(RevisionCode::Unknown)
}

/// Every intermediate value of one classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub reading: u16,
    pub percentage: u8,
    pub folded: u8,
    pub production: bool,
    pub revision: RevisionCode,
}

impl Detection {
    pub fn from_reading(reading: u16) -> Self {
        let percentage = percentage(reading);
        // The production flag only exists in the unfolded value.
        let (folded, production) = fold(percentage);
        Self {
            reading,
            percentage,
            folded,
            production,
            revision: classify(folded),
        }
    }
}
