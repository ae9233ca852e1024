use glam::Vec3;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Three stable pseudo-random values in `[-1, 1]` for a seed.
pub(crate) fn hash_unit3(seed: u64) -> [f32; 3] {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    let a = h.finish();
    h.write_u64(a);
    let b = h.finish();
    h.write_u64(b);
    let c = h.finish();
    // Top 24 bits give an exactly representable f32 fraction.
    let to_unit = |v: u64| ((v >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0;
    [to_unit(a), to_unit(b), to_unit(c)]
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Wrap into `[0, 1)`, including negative inputs.
pub(crate) fn wrap01(x: f64) -> f64 {
    let w = x - x.floor();
    if w >= 1.0 { 0.0 } else { w }
}

/// Spherical `(radius, theta, phi)` to cartesian, `theta` azimuth around +Y, `phi` polar from +Y.
pub fn spherical_to_cartesian(radius: f32, theta: f32, phi: f32) -> Vec3 {
    let sin_phi = phi.sin();
    Vec3::new(
        radius * sin_phi * theta.sin(),
        radius * phi.cos(),
        radius * sin_phi * theta.cos(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
