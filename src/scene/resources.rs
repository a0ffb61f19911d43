//! Geometry/material resource pool.
//!
//! Stands in for GPU-side buffers: every allocation gets a fresh id, and the
//! pool tracks which ids are still live. Disposal is idempotent; releasing an
//! id twice (or one the pool never issued) is counted and otherwise ignored.

use std::collections::HashMap;

use serde::Serialize;

use crate::procgen::{GeometryDesc, MaterialDesc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u64);

/// Allocation counters over the lifetime of a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStats {
    pub geometry_allocated: u64,
    pub geometry_disposed: u64,
    pub material_allocated: u64,
    pub material_disposed: u64,
    /// Disposals of ids that were not live
    pub redundant_disposals: u64,
}

impl ResourceStats {
    pub fn live_geometry(&self) -> u64 {
        self.geometry_allocated - self.geometry_disposed
    }

    pub fn live_materials(&self) -> u64 {
        self.material_allocated - self.material_disposed
    }
}

/// Live geometry and materials, keyed by id.
#[derive(Debug, Default)]
pub struct ResourcePool {
    geometries: HashMap<GeometryId, GeometryDesc>,
    materials: HashMap<MaterialId, MaterialDesc>,
    next_id: u64,
    stats: ResourceStats,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn allocate_geometry(&mut self, desc: &GeometryDesc) -> GeometryId {
        let id = GeometryId(self.alloc_id());
        self.geometries.insert(id, desc.clone());
        self.stats.geometry_allocated += 1;
        id
    }

    pub fn allocate_material(&mut self, desc: &MaterialDesc) -> MaterialId {
        let id = MaterialId(self.alloc_id());
        self.materials.insert(id, desc.clone());
        self.stats.material_allocated += 1;
        id
    }

    /// Release a geometry. Returns false if it was not live.
    pub fn dispose_geometry(&mut self, id: GeometryId) -> bool {
        if self.geometries.remove(&id).is_some() {
            self.stats.geometry_disposed += 1;
            true
        } else {
            log::trace!("geometry {:?} already released", id);
            self.stats.redundant_disposals += 1;
            false
        }
    }

    /// Release a material. Returns false if it was not live.
    pub fn dispose_material(&mut self, id: MaterialId) -> bool {
        if self.materials.remove(&id).is_some() {
            self.stats.material_disposed += 1;
            true
        } else {
            log::trace!("material {:?} already released", id);
            self.stats.redundant_disposals += 1;
            false
        }
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&GeometryDesc> {
        self.geometries.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&MaterialDesc> {
        self.materials.get(&id)
    }

    pub fn is_geometry_live(&self, id: GeometryId) -> bool {
        self.geometries.contains_key(&id)
    }

    pub fn is_material_live(&self, id: MaterialId) -> bool {
        self.materials.contains_key(&id)
    }

    pub fn live_geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn live_geometry_ids(&self) -> impl Iterator<Item = GeometryId> + '_ {
        self.geometries.keys().copied()
    }

    pub fn live_material_ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.materials.keys().copied()
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }
}
