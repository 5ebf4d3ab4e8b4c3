//! In-memory station store backed by an R-tree.
//!
//! Stations are indexed as points on the unit sphere, so the R-tree's
//! Euclidean (chord) order is the great-circle order. Queries use two-stage
//! filtering: the first few stations in that order that satisfy the
//! availability predicate are re-ranked by their exact geodesic distance on
//! the ellipsoid. Sphere and ellipsoid orders differ slightly, so the tree
//! is asked for more than `k` matches before re-ranking.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{Location, StationCandidate, StationId};
use crate::geodesic;

use super::error::StationError;
use super::store::{Availability, StationQuery, StationStore};

/// Extra matches taken from the R-tree before geodesic re-ranking.
const OVERSCAN: usize = 8;

/// Live availability of a station at `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub num_bikes: u32,
    pub num_docks: u32,
    pub online: bool,
    pub updated_at: DateTime<Utc>,
}

/// A station as stored in a snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: StationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Latest live snapshot, if one was ever recorded.
    #[serde(default)]
    pub live: Option<LiveStatus>,
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    stations: Vec<StationRecord>,
}

#[derive(Debug)]
struct IndexedStation {
    id: StationId,
    name: String,
    location: Location,
    live: Option<LiveStatus>,
}

#[derive(Debug, Clone)]
struct StationNode {
    station: Arc<IndexedStation>,
    point: [f64; 3],
}

impl RTreeObject for StationNode {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationNode {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        self.point
            .iter()
            .zip(point)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

/// Position of `location` on the unit sphere, in earth-centred coordinates.
fn unit_vector(location: Location) -> [f64; 3] {
    let (lat, lon) = (
        location.latitude().to_radians(),
        location.longitude().to_radians(),
    );
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Station store holding the whole network in memory.
///
/// Cloning is cheap and clones share the same data, so one handle can serve
/// queries while another replaces the snapshot.
#[derive(Clone)]
pub struct InMemoryStationStore {
    tree: Arc<RwLock<RTree<StationNode>>>,
    /// Live snapshots older than this count as missing.
    max_snapshot_age: Option<chrono::Duration>,
}

impl InMemoryStationStore {
    /// Build a store from station records.
    pub fn new(records: Vec<StationRecord>) -> Result<Self, StationError> {
        let tree = build_tree(records)?;
        Ok(Self {
            tree: Arc::new(RwLock::new(tree)),
            max_snapshot_age: None,
        })
    }

    /// Load a store from a JSON snapshot file of the form
    /// `{"stations": [StationRecord, ...]}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StationError> {
        Self::new(read_snapshot(path.as_ref())?)
    }

    /// Treat live snapshots older than `age` as missing.
    pub fn with_max_snapshot_age(mut self, age: chrono::Duration) -> Self {
        self.max_snapshot_age = Some(age);
        self
    }

    /// Replace all stations. Returns the new station count.
    ///
    /// On failure the current stations are kept.
    pub async fn replace(&self, records: Vec<StationRecord>) -> Result<usize, StationError> {
        let tree = build_tree(records)?;
        let count = tree.size();

        let mut guard = self.tree.write().await;
        *guard = tree;

        Ok(count)
    }

    /// Re-read a snapshot file and replace all stations.
    pub async fn reload(&self, path: impl AsRef<Path>) -> Result<usize, StationError> {
        let path = path.as_ref();
        let records = read_snapshot(path)?;
        let count = self.replace(records).await?;
        info!(path = %path.display(), stations = count, "reloaded station snapshot");
        Ok(count)
    }

    /// Number of stations held.
    pub async fn len(&self) -> usize {
        self.tree.read().await.size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_fresh(&self, live: &LiveStatus, now: DateTime<Utc>) -> bool {
        match self.max_snapshot_age {
            Some(max_age) => now.signed_duration_since(live.updated_at) <= max_age,
            None => true,
        }
    }

    /// Turn a station into a candidate if it satisfies the query.
    fn admit(
        &self,
        station: &IndexedStation,
        query: &StationQuery,
        now: DateTime<Utc>,
    ) -> Option<StationCandidate> {
        let fresh = station.live.as_ref().filter(|live| self.is_fresh(live, now));

        let (num_bikes, num_docks, online) = match fresh {
            Some(live) => {
                let available = match query.availability {
                    Availability::Bikes => live.num_bikes > 0,
                    Availability::Docks => live.num_docks > 0,
                };
                if !live.online || !available {
                    return None;
                }
                (live.num_bikes, live.num_docks, live.online)
            }
            // No usable snapshot: report the last known counts, if any.
            None if query.include_stale => station
                .live
                .as_ref()
                .map_or((0, 0, true), |last| (last.num_bikes, last.num_docks, true)),
            None => return None,
        };

        Some(StationCandidate {
            id: station.id,
            name: station.name.clone(),
            location: station.location,
            num_bikes,
            num_docks,
            online,
            distance_m: geodesic::distance(query.location, station.location),
        })
    }
}

impl StationStore for InMemoryStationStore {
    async fn nearest_stations(
        &self,
        query: &StationQuery,
    ) -> Result<Vec<StationCandidate>, StationError> {
        if query.k == 0 {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let pool = query.k.saturating_mul(2).max(query.k.saturating_add(OVERSCAN));
        let tree = self.tree.read().await;

        let mut candidates: Vec<StationCandidate> = tree
            .nearest_neighbor_iter(&unit_vector(query.location))
            .filter_map(|node| self.admit(&node.station, query, now))
            .take(pool)
            .collect();

        candidates.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        candidates.truncate(query.k);

        Ok(candidates)
    }
}

fn read_snapshot(path: &Path) -> Result<Vec<StationRecord>, StationError> {
    let json = std::fs::read_to_string(path).map_err(|source| StationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let snapshot: SnapshotFile = serde_json::from_str(&json).map_err(|e| StationError::Json {
        message: e.to_string(),
    })?;

    Ok(snapshot.stations)
}

fn build_tree(records: Vec<StationRecord>) -> Result<RTree<StationNode>, StationError> {
    let nodes = records
        .into_iter()
        .map(|record| {
            let location = Location::new(record.latitude, record.longitude).map_err(|source| {
                StationError::InvalidStation {
                    id: record.id,
                    source,
                }
            })?;

            Ok(StationNode {
                point: unit_vector(location),
                station: Arc::new(IndexedStation {
                    id: record.id,
                    name: record.name,
                    location,
                    live: record.live,
                }),
            })
        })
        .collect::<Result<Vec<_>, StationError>>()?;

    Ok(RTree::bulk_load(nodes))
}
