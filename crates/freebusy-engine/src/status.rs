//! Ordinal busy-status codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How busy a block of time is. Higher values are busier.
///
/// The named constants follow the MAPI scale. Other codes are accepted and
/// ordered numerically, so aggregation only relies on the total order and on
/// [`BusyStatus::FREE`] being the lowest meaningful value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BusyStatus(pub i32);

impl BusyStatus {
    pub const FREE: BusyStatus = BusyStatus(0);
    pub const TENTATIVE: BusyStatus = BusyStatus(1);
    pub const BUSY: BusyStatus = BusyStatus(2);
    pub const OUT_OF_OFFICE: BusyStatus = BusyStatus(3);

    pub fn is_free(self) -> bool {
        self == Self::FREE
    }
}

impl From<i32> for BusyStatus {
    fn from(code: i32) -> Self {
        BusyStatus(code)
    }
}

impl fmt::Display for BusyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::FREE => f.write_str("free"),
            Self::TENTATIVE => f.write_str("tentative"),
            Self::BUSY => f.write_str("busy"),
            Self::OUT_OF_OFFICE => f.write_str("out-of-office"),
            BusyStatus(other) => write!(f, "status({})", other),
        }
    }
}
