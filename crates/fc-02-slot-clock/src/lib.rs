//! # fc-02-slot-clock
//!
//! Bidirectional mapping between wall-clock time and slot numbers under a
//! non-uniform clock: the block time may change at configured milestone
//! heights, so slot arithmetic walks the regime history instead of dividing
//! by a constant.
//!
//! ## Architecture
//!
//! The clock is pure computation over the milestone timeline plus one
//! outbound dependency, `TimestampSource`, which anchors each regime
//! boundary on the real timestamp of the block just before it. The walk is
//! re-run per query: both the target height and any call-scoped lookup
//! override vary per call, so there is nothing safe to memoize.
//!
//! Slot numbers are a function of *time*; heights are a function of actual
//! blocks. When validators miss their turns, slots run ahead of heights.

pub mod clock;
pub mod error;
pub mod lookup;
pub mod time_source;

pub use clock::{SlotClock, SlotInfo};
pub use error::{SlotError, SlotResult};
pub use lookup::{BlockTimeLookup, TimestampSource};
pub use time_source::{FixedTimeSource, SystemTimeSource, TimeSource};
