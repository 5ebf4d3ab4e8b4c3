//! Station lookup.
//!
//! The planner reaches stations only through the [`StationStore`] trait:
//! "give me the k nearest stations with a bike (or a free dock) near this
//! point, closest first". [`StationFinder`] is the planner-facing wrapper;
//! [`InMemoryStationStore`] is an R-tree backed store loaded from a JSON
//! snapshot.

mod error;
mod finder;
mod memory;
mod store;

pub use error::StationError;
pub use finder::StationFinder;
pub use memory::{InMemoryStationStore, LiveStatus, StationRecord};
pub use store::{Availability, StationQuery, StationStore};
