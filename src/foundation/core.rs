use crate::foundation::error::{CubefieldError, CubefieldResult};

/// Largest supported grid edge length.
pub const MAX_GRID_N: u32 = 24;

/// Capacity of the instance buffer (`MAX_GRID_N`³). Allocated once, never grown.
pub const MAX_INSTANCES: usize = (MAX_GRID_N * MAX_GRID_N * MAX_GRID_N) as usize;

/// Floats per instance transform (column-major 4x4).
pub const FLOATS_PER_TRANSFORM: usize = 16;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> CubefieldResult<Self> {
        if den == 0 {
            return Err(CubefieldError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(CubefieldError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn whole(fps: u32) -> CubefieldResult<Self> {
        Self::new(fps, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Rounds up, ignoring float noise below 1e-9 of a frame.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64() - 1e-9).ceil().max(0.0) as u64
    }
}

/// Grid edge length `N`; the live instance count is `N³`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct GridSize(u32);

impl GridSize {
    pub fn new(n: u32) -> CubefieldResult<Self> {
        if !(1..=MAX_GRID_N).contains(&n) {
            return Err(CubefieldError::validation(format!(
                "grid size N must be in [1, {MAX_GRID_N}], got {n}"
            )));
        }
        Ok(Self(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn instance_count(self) -> usize {
        let n = self.0 as usize;
        n * n * n
    }
}

impl TryFrom<u32> for GridSize {
    type Error = CubefieldError;

    fn try_from(n: u32) -> CubefieldResult<Self> {
        Self::new(n)
    }
}

impl From<GridSize> for u32 {
    fn from(n: GridSize) -> Self {
        n.0
    }
}

/// Integer cell coordinate inside the `N`³ grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub ix: u32,
    pub iy: u32,
    pub iz: u32,
}

impl GridIndex {
    /// Decompose a linear instance index; `ix` varies fastest.
    pub fn from_linear(i: usize, n: u32) -> Self {
        let n = n.max(1) as usize;
        Self {
            ix: (i % n) as u32,
            iy: ((i / n) % n) as u32,
            iz: (i / (n * n)) as u32,
        }
    }
}
