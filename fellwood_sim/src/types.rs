// Core types shared across the felling core.
//
// Defines block coordinates (`BlockPos`), the column key used for replant
// footprint grouping (`ColumnKey`), actor/world identities, the sequential
// IDs the sim hands out for sessions, decay jobs and replant plans, and the
// session token written into a tool's metadata (`SessionToken`).
//
// Neighbor enumeration lives here too, because the trunk collector and the
// leaf decay cascade must agree on the exact offset order: breadth-first
// ties are broken by this order, and the felling session removes blocks in
// the order the collector produced them.
//
// **Critical constraint: determinism.** Session tokens are generated from
// the sim's `TokenRng`. Do not use OS entropy.

use fellwood_prng::TokenRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// Identity of one spatial container (a dimension / level). Opaque to the
/// core; only compared and ordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub u32);

/// A block position inside one world.
///
/// - X: east  (positive) / west  (negative)
/// - Y: up    (positive) / down  (negative)
/// - Z: south (positive) / north (negative)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            world: self.world,
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The vertical column this block belongs to.
    pub const fn column(self) -> ColumnKey {
        ColumnKey {
            x: self.x,
            z: self.z,
            world: self.world,
        }
    }

    /// Squared Euclidean distance. Positions in different worlds are
    /// treated as infinitely far apart.
    pub fn distance_squared(self, other: Self) -> i64 {
        if self.world != other.world {
            return i64::MAX;
        }
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Chebyshev distance on the horizontal plane (max of |dx|, |dz|).
    pub fn horizontal_distance(self, other: Self) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.z - other.z).unsigned_abs())
    }

    pub fn vertical_distance(self, other: Self) -> u32 {
        (self.y - other.y).unsigned_abs()
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}({}, {}, {})", self.world.0, self.x, self.y, self.z)
    }
}

/// A vertical column of blocks. Field order is the ordering key: horizontal
/// axes lexicographically, then world identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey {
    pub x: i32,
    pub z: i32,
    pub world: WorldId,
}

impl ColumnKey {
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
            world: self.world,
        }
    }
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// Which neighbors count as adjacent during traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// The 6 face-adjacent blocks.
    Faces,
    /// All 26 blocks of the surrounding 3×3×3 cube.
    Cube,
}

impl Connectivity {
    pub fn from_include_diagonals(include_diagonals: bool) -> Self {
        if include_diagonals {
            Self::Cube
        } else {
            Self::Faces
        }
    }
}

const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Neighbors of `pos` in fixed enumeration order. Face order is
/// +x, -x, +y, -y, +z, -z; cube order is dx, then dy, then dz, each
/// ascending from -1 to 1, skipping the center.
pub fn neighbors(pos: BlockPos, connectivity: Connectivity) -> SmallVec<[BlockPos; 26]> {
    let mut out = SmallVec::new();
    match connectivity {
        Connectivity::Faces => {
            for &(dx, dy, dz) in &FACE_OFFSETS {
                out.push(pos.offset(dx, dy, dz));
            }
        }
        Connectivity::Cube => {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        if dx == 0 && dy == 0 && dz == 0 {
                            continue;
                        }
                        out.push(pos.offset(dx, dy, dz));
                    }
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Identity of an acting player. Assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

sequential_id!(/// An in-flight felling session.
SessionId);
sequential_id!(/// A running leaf decay cascade.
DecayJobId);
sequential_id!(/// A deferred sapling placement.
ReplantId);

// ---------------------------------------------------------------------------
// Session token (UUID v4 text stored in tool metadata)
// ---------------------------------------------------------------------------

/// Random token tying a tool instance to one felling session.
///
/// Layout follows RFC 4122 v4: version nibble (byte 6, upper) is `0100`,
/// variant bits (byte 8, upper two) are `10`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken([u8; 16]);

impl SessionToken {
    pub fn new_v4(rng: &mut TokenRng) -> Self {
        let mut bytes = rng.next_128_bits();
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        Self(bytes)
    }

    /// Parse the 8-4-4-4-12 hex form.
    pub fn parse(s: &str) -> Option<Self> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok()?;
        }
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl Serialize for SessionToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SessionToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SessionToken::parse(&s).ok_or_else(|| serde::de::Error::custom("invalid session token"))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: WorldId = WorldId(0);

    #[test]
    fn token_version_and_variant_bits() {
        let mut rng = TokenRng::new(42);
        for _ in 0..500 {
            let token = SessionToken::new_v4(&mut rng);
            let bytes = token.as_bytes();
            assert_eq!(bytes[6] >> 4, 4);
            assert_eq!(bytes[8] >> 6, 2);
        }
    }

    #[test]
    fn token_text_parses_back() {
        let mut rng = TokenRng::new(9);
        let token = SessionToken::new_v4(&mut rng);
        let text = token.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(&text[8..9], "-");
        assert_eq!(&text[23..24], "-");
        assert_eq!(SessionToken::parse(&text), Some(token));
    }

    #[test]
    fn token_parse_rejects_garbage() {
        assert_eq!(SessionToken::parse("not-a-token"), None);
        assert_eq!(SessionToken::parse("zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"), None);
    }

    #[test]
    fn face_neighbors_are_six_and_ordered() {
        let origin = BlockPos::new(W, 0, 0, 0);
        let n = neighbors(origin, Connectivity::Faces);
        assert_eq!(n.len(), 6);
        assert_eq!(n[0], BlockPos::new(W, 1, 0, 0));
        assert_eq!(n[2], BlockPos::new(W, 0, 1, 0));
        assert_eq!(n[5], BlockPos::new(W, 0, 0, -1));
    }

    #[test]
    fn cube_neighbors_exclude_center() {
        let origin = BlockPos::new(W, 5, 5, 5);
        let n = neighbors(origin, Connectivity::Cube);
        assert_eq!(n.len(), 26);
        assert!(!n.contains(&origin));
        assert_eq!(n[0], BlockPos::new(W, 4, 4, 4));
        assert_eq!(n[25], BlockPos::new(W, 6, 6, 6));
    }

    #[test]
    fn distances() {
        let a = BlockPos::new(W, 0, 0, 0);
        let b = BlockPos::new(W, 3, -4, 1);
        assert_eq!(a.distance_squared(b), 26);
        assert_eq!(a.horizontal_distance(b), 3);
        assert_eq!(a.vertical_distance(b), 4);
        let elsewhere = BlockPos::new(WorldId(1), 0, 0, 0);
        assert_eq!(a.distance_squared(elsewhere), i64::MAX);
    }

    #[test]
    fn column_ordering_is_x_then_z_then_world() {
        let a = BlockPos::new(WorldId(5), 0, 10, 3).column();
        let b = BlockPos::new(WorldId(0), 1, 0, 0).column();
        let c = BlockPos::new(WorldId(0), 0, 0, 4).column();
        assert!(a < b);
        assert!(a < c);
        let d = BlockPos::new(WorldId(1), 0, 0, 3).column();
        assert!(d < a);
    }
}
