// Dense 3D block grid for one world.
//
// Blocks are stored as a flat `Vec<Material>` indexed by
// `x + z * size_x + y * size_x * size_z`, giving O(1) read/write access.
// Out-of-bounds reads return `Air`; out-of-bounds writes are no-ops. A
// parallel bit vector holds the waterlogged flag, which only matters for
// the mangrove propagule.
//
// The felling core never touches this type directly; it goes through
// `host::BlockAccess`. `VoxelWorld` is what the sandbox host stores per
// `WorldId`, so tests and benches exercise real grid reads and writes.
//
// See also: `sandbox.rs` which owns a `VoxelWorld` per world and implements
// the collaborator traits on top of it.

use crate::material::Material;

/// Dense 3D grid of materials, coordinates in `0..size` on each axis.
#[derive(Clone, Debug, Default)]
pub struct VoxelWorld {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    blocks: Vec<Material>,
    waterlogged: Vec<bool>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
}

impl VoxelWorld {
    /// Create a new world filled with `Air`.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            blocks: vec![Material::Air; total],
            waterlogged: vec![false; total],
            size_x,
            size_y,
            size_z,
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.size_x
            && (y as u32) < self.size_y
            && (z as u32) < self.size_z
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if self.in_bounds(x, y, z) {
            let sx = self.size_x as usize;
            let sz = self.size_z as usize;
            Some(x as usize + z as usize * sx + y as usize * sx * sz)
        } else {
            None
        }
    }

    /// Read a block. Returns `Air` for out-of-bounds coordinates.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Material {
        self.index(x, y, z)
            .map(|i| self.blocks[i])
            .unwrap_or(Material::Air)
    }

    /// Write a block. Clears the waterlogged flag. No-op out of bounds.
    pub fn set(&mut self, x: i32, y: i32, z: i32, material: Material) {
        if let Some(i) = self.index(x, y, z) {
            self.blocks[i] = material;
            self.waterlogged[i] = false;
        }
    }

    pub fn is_waterlogged(&self, x: i32, y: i32, z: i32) -> bool {
        self.index(x, y, z)
            .map(|i| self.waterlogged[i])
            .unwrap_or(false)
    }

    pub fn set_waterlogged(&mut self, x: i32, y: i32, z: i32, waterlogged: bool) {
        if let Some(i) = self.index(x, y, z) {
            self.waterlogged[i] = waterlogged;
        }
    }

    /// Fill an inclusive axis-aligned box.
    pub fn fill(&mut self, min: (i32, i32, i32), max: (i32, i32, i32), material: Material) {
        for y in min.1..=max.1 {
            for z in min.2..=max.2 {
                for x in min.0..=max.0 {
                    self.set(x, y, z, material);
                }
            }
        }
    }

    /// Number of blocks of the given material.
    pub fn count(&self, material: Material) -> usize {
        self.blocks.iter().filter(|&&m| m == material).count()
    }
}
