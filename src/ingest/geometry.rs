use anyhow::Result;
use geo::{Centroid, Coord, LineString, Polygon};
use hashbrown::{HashMap, HashSet};
use osmpbfreader::{NodeId, OsmObj, OsmPbfReader, WayId};
use sled::Db;
use std::io::{Read, Seek};
use tempfile::{Builder, TempDir};
use tracing::info;

use proxcheck::Coordinate;

/// Disk-backed node coordinate store for the duration of an ingest run
pub struct NodeStore {
    db: Db,
    _dir: TempDir,
}

impl NodeStore {
    pub fn temporary() -> Result<Self> {
        let dir = Builder::new().prefix("proxcheck-nodes-").tempdir()?;
        let db = sled::open(dir.path())?;
        Ok(Self { db, _dir: dir })
    }

    pub fn insert(&self, id: NodeId, c: Coordinate) -> Result<()> {
        self.db.insert(id.0.to_be_bytes(), &encode(c))?;
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<Coordinate> {
        match self.db.get(id.0.to_be_bytes()) {
            Ok(Some(bytes)) => decode(&bytes),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn encode(c: Coordinate) -> [u8; 16] {
    let mut value = [0u8; 16];
    value[0..8].copy_from_slice(&c.longitude.to_be_bytes());
    value[8..16].copy_from_slice(&c.latitude.to_be_bytes());
    value
}

fn decode(bytes: &[u8]) -> Option<Coordinate> {
    if bytes.len() != 16 {
        return None;
    }
    let lon: [u8; 8] = bytes[0..8].try_into().ok()?;
    let lat: [u8; 8] = bytes[8..16].try_into().ok()?;
    Some(Coordinate::new(f64::from_be_bytes(lat), f64::from_be_bytes(lon)))
}

/// Resolves way outlines and centroids from stored node coordinates
pub struct WayGeometry {
    nodes: NodeStore,
    way_nodes: HashMap<WayId, Vec<NodeId>>,
}

impl WayGeometry {
    /// Build by scanning the file twice: ways matching `filter`, then the
    /// coordinates of the nodes they reference
    pub fn build<R: Read + Seek, F>(reader: &mut OsmPbfReader<R>, filter: F) -> Result<Self>
    where
        F: Fn(&osmpbfreader::Tags) -> bool,
    {
        info!("Building way geometry index...");

        let mut needed_nodes = HashSet::new();
        let mut way_nodes = HashMap::new();

        info!("Pass 1/2: Identifying relevant ways...");
        reader.rewind()?;
        for obj in reader.iter() {
            if let OsmObj::Way(way) = obj? {
                if filter(&way.tags) {
                    needed_nodes.extend(way.nodes.iter().copied());
                    way_nodes.insert(way.id, way.nodes);
                }
            }
        }

        info!(
            "Found {} relevant ways, referencing {} nodes",
            way_nodes.len(),
            needed_nodes.len()
        );

        info!("Pass 2/2: Storing node coordinates...");
        reader.rewind()?;
        let nodes = NodeStore::temporary()?;
        for obj in reader.iter() {
            if let OsmObj::Node(node) = obj? {
                if needed_nodes.contains(&node.id) {
                    nodes.insert(node.id, Coordinate::new(node.lat(), node.lon()))?;
                }
            }
        }
        nodes.flush()?;
        info!("Stored {} node coordinates", nodes.len());

        Ok(Self::from_parts(nodes, way_nodes))
    }

    pub fn from_parts(nodes: NodeStore, way_nodes: HashMap<WayId, Vec<NodeId>>) -> Self {
        Self { nodes, way_nodes }
    }

    /// Outline of a closed way; open ways (tracks, lines) have none.
    /// Nodes missing from the store are skipped.
    pub fn resolve_way(&self, way_id: WayId) -> Option<Polygon<f64>> {
        let node_ids = self.way_nodes.get(&way_id)?;
        if node_ids.first() != node_ids.last() {
            return None;
        }

        let mut ring: Vec<Coord<f64>> = node_ids
            .iter()
            .filter_map(|id| self.nodes.get(*id))
            .map(|c| Coord {
                x: c.longitude,
                y: c.latitude,
            })
            .collect();

        if ring.len() < 3 {
            return None;
        }
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }
        if ring.len() < 4 {
            return None;
        }

        Some(Polygon::new(LineString::new(ring), vec![]))
    }

    /// Representative point for a way: its polygon centroid
    pub fn resolve_centroid(&self, way_id: WayId) -> Option<Coordinate> {
        self.resolve_way(way_id)?.centroid().map(Coordinate::from)
    }
}
