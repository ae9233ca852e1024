//! Grid index to unit-space position maps for every [`LayoutKind`].
//!
//! Output is always unit space (spacing = 1); the instance updater multiplies by the live
//! spacing. Every map is closed-form and deterministic: the same parameters always produce the
//! same floats.

use std::f32::consts::{PI, TAU};

use crate::foundation::core::{GridIndex, GridSize};
use crate::foundation::math::{hash_unit3, wrap01};
use crate::layout::kind::LayoutKind;

/// Sphere radius as a fraction of `N` (world radius is `N * spacing * 0.6`).
pub const SPHERE_RADIUS_FACTOR: f32 = 0.6;
/// Golden angle in radians, used by the Fibonacci sphere.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Narrowest item width the helix will pack, in unit space.
pub const CYLINDER_MIN_ITEM_WIDTH: f32 = 0.25;
/// Horizontal breathing room between neighbouring items on one helix turn.
pub const CYLINDER_ITEM_GAP: f32 = 1.15;

/// Radial parameter range for the elliptic cylinder. `MU_MIN > 0` keeps the inner ring from
/// collapsing onto the focal segment.
pub const ELLIPTIC_MU_MIN: f32 = 0.15;
pub const ELLIPTIC_MU_MAX: f32 = 1.25;

/// Parameter extent for both parabolic systems.
pub const PARABOLIC_EXTENT: f32 = 1.4;

/// Innermost shell of the ellipsoid as a fraction of the outer shell.
pub const ELLIPSOID_SHELL_MIN: f32 = 0.3;
/// Semi-axes of the outer ellipsoid shell relative to the grid half-extent.
pub const ELLIPSOID_AXES: [f32; 3] = [1.1, 0.8, 0.55];

/// Radial parameter range shared by the oblate and prolate spheroids. `MU_MIN` keeps the
/// prolate spheroid away from its degenerate focal line.
pub const SPHEROIDAL_MU_MIN: f32 = 0.2;
pub const SPHEROIDAL_MU_MAX: f32 = 1.2;

/// Fraction of the polar range kept away from each pole, for ellipsoid and spheroids.
pub const POLE_MARGIN: f32 = 0.05;

/// Smallest `|tau|` allowed in bispherical coordinates. At `tau = 0` with small `sigma` the
/// denominator `cosh(tau) - cos(sigma)` vanishes.
pub const BISPHERICAL_MIN_TAU: f32 = 0.12;
pub const BISPHERICAL_TAU_MAX: f32 = 1.6;
/// `sigma` is kept in `[MIN_SIGMA, PI - MIN_SIGMA]`.
pub const BISPHERICAL_MIN_SIGMA: f32 = 0.35;
/// Focal distance relative to the grid half-extent.
pub const BISPHERICAL_FOCAL: f32 = 0.35;

/// Nested cone radial range, relative to the grid half-extent.
pub const CONE_RADIUS_MIN: f32 = 0.15;
/// Half-opening angle range of the nested cones.
pub const CONE_ALPHA_MIN: f32 = 0.25;
pub const CONE_ALPHA_MAX: f32 = 1.2;

/// Scatter cloud half-extent relative to the grid half-extent.
pub const SCATTER_SPREAD: f32 = 1.2;

/// Inputs shared by every layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub n: GridSize,
    /// Live spacing. Only used to express the cube size in unit space.
    pub spacing: f32,
    pub cube_size: f32,
    /// Cyclic shift of the time axis, in `[0, 1)`.
    pub time_offset: f64,
}

impl LayoutParams {
    pub fn new(n: GridSize, spacing: f32, cube_size: f32, start_hour: f64) -> Self {
        Self {
            n,
            spacing,
            cube_size,
            time_offset: time_offset_for_hour(start_hour),
        }
    }

    /// `N * spacing * 0.5` in unit space, i.e. with spacing = 1.
    fn half_extent(&self) -> f32 {
        self.n.get() as f32 * 0.5
    }

    fn item_width(&self) -> f32 {
        let spacing = if self.spacing > 0.0 { self.spacing } else { 1.0 };
        (self.cube_size / spacing).max(CYLINDER_MIN_ITEM_WIDTH)
    }
}

/// `startHour / 24`, wrapped into `[0, 1)`.
pub fn time_offset_for_hour(start_hour: f64) -> f64 {
    if !start_hour.is_finite() {
        return 0.0;
    }
    wrap01(start_hour / 24.0)
}

/// Normalized coordinates of one grid cell.
///
/// `u0`, `v0`, `w0` are closed `[0, 1]`; `v_cyc` and `w_cyc` are half-open `[0, 1)` and feed
/// angular axes so that `0` and `2*PI` never land on the same cell. Only the `w` axis carries
/// the time shift.
#[derive(Clone, Copy, Debug)]
struct Cell {
    u0: f32,
    v0: f32,
    w0: f32,
    uc: f32,
    vc: f32,
    wc: f32,
    v_cyc: f32,
    w_cyc: f32,
}

impl Cell {
    fn new(idx: GridIndex, n: u32, time_offset: f64) -> Self {
        let nf = f64::from(n);
        let w_cyc = wrap01(f64::from(idx.iz) / nf + time_offset);
        let v_cyc = f64::from(idx.iy) / nf;

        let (u0, v0, w0) = if n > 1 {
            let d = nf - 1.0;
            (
                f64::from(idx.ix) / d,
                f64::from(idx.iy) / d,
                (w_cyc * nf / d).min(1.0),
            )
        } else {
            (0.5, 0.5, 0.5)
        };

        Self {
            u0: u0 as f32,
            v0: v0 as f32,
            w0: w0 as f32,
            uc: (u0 * 2.0 - 1.0) as f32,
            vc: (v0 * 2.0 - 1.0) as f32,
            wc: (w0 * 2.0 - 1.0) as f32,
            v_cyc: v_cyc as f32,
            w_cyc: w_cyc as f32,
        }
    }
}

/// Time-shifted linear placement for layouts that must fill a manifold without gaps.
#[derive(Clone, Copy, Debug)]
struct Linear {
    /// Fractional index in `[0, count)`.
    k: f32,
    count: f32,
}

impl Linear {
    fn new(i: usize, count: usize, time_offset: f64) -> Self {
        let c = count.max(1) as f64;
        Self {
            k: (wrap01(i as f64 / c + time_offset) * c) as f32,
            count: c as f32,
        }
    }
}

/// Generate `count * 3` unit-space floats for `kind`.
pub fn generate_layout(kind: LayoutKind, count: usize, params: &LayoutParams) -> Vec<f32> {
    let mut out = vec![0.0; count * 3];
    fill_layout(kind, params, &mut out);
    out
}

/// Write one `[x, y, z]` triple per instance into `out` (`out.len() / 3` instances).
pub fn fill_layout(kind: LayoutKind, params: &LayoutParams, out: &mut [f32]) {
    let count = out.len() / 3;
    let n = params.n.get();
    let s = params.half_extent();
    let helix = Helix::new(count, s, params.item_width());

    for (i, slot) in out.chunks_exact_mut(3).enumerate() {
        let p = if kind.is_linear_indexed() {
            let lin = Linear::new(i, count, params.time_offset);
            match kind {
                LayoutKind::Sphere => fibonacci_sphere(lin, params.n.get() as f32),
                LayoutKind::Cylinder => helix.place(lin),
                _ => scatter(lin, s),
            }
        } else {
            let cell = Cell::new(GridIndex::from_linear(i, n), n, params.time_offset);
            grid_position(kind, cell, n, s)
        };
        slot.copy_from_slice(&p);
    }
}

fn grid_position(kind: LayoutKind, c: Cell, n: u32, s: f32) -> [f32; 3] {
    match kind {
        LayoutKind::EllipticCylindrical => elliptic_cylindrical(c, s),
        LayoutKind::ParabolicCylindrical => parabolic_cylindrical(c, s),
        LayoutKind::Paraboloidal => paraboloidal(c, s),
        LayoutKind::Ellipsoidal => ellipsoidal(c, s),
        LayoutKind::OblateSpheroidal => oblate_spheroidal(c, s),
        LayoutKind::ProlateSpheroidal => prolate_spheroidal(c, s),
        LayoutKind::Bispherical => bispherical(c, s),
        LayoutKind::Conical => conical(c, s),
        // Cube, plus anything that reaches here without a grid map of its own.
        _ => lattice(c, n),
    }
}

fn lattice(c: Cell, n: u32) -> [f32; 3] {
    let half = (n.saturating_sub(1)) as f32 * 0.5;
    [c.uc * half, c.vc * half, c.wc * half]
}

fn fibonacci_sphere(lin: Linear, n: f32) -> [f32; 3] {
    let radius = n * SPHERE_RADIUS_FACTOR;
    let y = 1.0 - 2.0 * (lin.k + 0.5) / lin.count;
    let r = (1.0 - y * y).max(0.0).sqrt();
    let theta = GOLDEN_ANGLE * lin.k;
    // Renormalize so float error never pulls a point off the shell.
    let len = (r * r + y * y).sqrt().max(f32::EPSILON);
    [
        radius * r * theta.cos() / len,
        radius * y / len,
        radius * r * theta.sin() / len,
    ]
}

/// Helical wrap whose pitch adapts to how many items fit on one turn.
#[derive(Clone, Copy, Debug)]
struct Helix {
    radius: f32,
    per_turn: f32,
    rise_per_item: f32,
    bottom: f32,
}

impl Helix {
    fn new(count: usize, s: f32, item_width: f32) -> Self {
        let radius = s.max(0.5);
        let per_turn = ((TAU * radius) / (item_width * CYLINDER_ITEM_GAP))
            .floor()
            .max(1.0);
        let turns = (count.max(1) as f32 / per_turn).ceil().max(1.0);
        let height = 2.0 * s;
        Self {
            radius,
            per_turn,
            rise_per_item: height / (turns * per_turn),
            bottom: -s,
        }
    }

    fn place(&self, lin: Linear) -> [f32; 3] {
        let angle = TAU * lin.k / self.per_turn;
        [
            self.radius * angle.cos(),
            self.bottom + lin.k * self.rise_per_item,
            self.radius * angle.sin(),
        ]
    }
}

fn scatter(lin: Linear, s: f32) -> [f32; 3] {
    let h = hash_unit3(lin.k.floor() as u64);
    let spread = s * SCATTER_SPREAD;
    [h[0] * spread, h[1] * spread, h[2] * spread]
}

fn elliptic_cylindrical(c: Cell, s: f32) -> [f32; 3] {
    let mu = ELLIPTIC_MU_MIN + c.u0 * (ELLIPTIC_MU_MAX - ELLIPTIC_MU_MIN);
    let nu = TAU * c.v_cyc;
    let a = s / ELLIPTIC_MU_MAX.cosh();
    [a * mu.cosh() * nu.cos(), c.wc * s, a * mu.sinh() * nu.sin()]
}

fn parabolic_cylindrical(c: Cell, s: f32) -> [f32; 3] {
    let sigma = c.uc * PARABOLIC_EXTENT;
    let tau = c.v0 * PARABOLIC_EXTENT;
    let k = s / (0.5 * PARABOLIC_EXTENT * PARABOLIC_EXTENT);
    [
        0.5 * (sigma * sigma - tau * tau) * k,
        c.wc * s,
        sigma * tau * k * 0.5,
    ]
}

fn paraboloidal(c: Cell, s: f32) -> [f32; 3] {
    let sigma = c.u0 * PARABOLIC_EXTENT;
    let tau = c.v0 * PARABOLIC_EXTENT;
    let phi = TAU * c.w_cyc;
    let k = s / (0.5 * PARABOLIC_EXTENT * PARABOLIC_EXTENT);
    let rho = sigma * tau * k * 0.5;
    [
        rho * phi.cos(),
        0.5 * (tau * tau - sigma * sigma) * k,
        rho * phi.sin(),
    ]
}

fn polar_angle(v0: f32) -> f32 {
    PI * (POLE_MARGIN + v0 * (1.0 - 2.0 * POLE_MARGIN))
}

fn ellipsoidal(c: Cell, s: f32) -> [f32; 3] {
    let shell = ELLIPSOID_SHELL_MIN + c.u0 * (1.0 - ELLIPSOID_SHELL_MIN);
    let theta = polar_angle(c.v0);
    let phi = TAU * c.w_cyc;
    let [a, b, cc] = ELLIPSOID_AXES;
    [
        shell * s * a * theta.sin() * phi.cos(),
        shell * s * b * theta.cos(),
        shell * s * cc * theta.sin() * phi.sin(),
    ]
}

fn spheroidal_mu(u0: f32) -> f32 {
    SPHEROIDAL_MU_MIN + u0 * (SPHEROIDAL_MU_MAX - SPHEROIDAL_MU_MIN)
}

fn oblate_spheroidal(c: Cell, s: f32) -> [f32; 3] {
    let mu = spheroidal_mu(c.u0);
    // Latitude in (-PI/2, PI/2).
    let nu = c.vc * (PI * 0.5) * (1.0 - 2.0 * POLE_MARGIN);
    let phi = TAU * c.w_cyc;
    let a = s / SPHEROIDAL_MU_MAX.cosh();
    [
        a * mu.cosh() * nu.cos() * phi.cos(),
        a * mu.sinh() * nu.sin(),
        a * mu.cosh() * nu.cos() * phi.sin(),
    ]
}

fn prolate_spheroidal(c: Cell, s: f32) -> [f32; 3] {
    let mu = spheroidal_mu(c.u0);
    let nu = polar_angle(c.v0);
    let phi = TAU * c.w_cyc;
    let a = s / SPHEROIDAL_MU_MAX.cosh();
    [
        a * mu.sinh() * nu.sin() * phi.cos(),
        a * mu.cosh() * nu.cos(),
        a * mu.sinh() * nu.sin() * phi.sin(),
    ]
}

/// Clamp `tau` away from zero, keeping its sign (zero counts as positive).
fn clamp_bispherical_tau(tau: f32) -> f32 {
    if tau.abs() >= BISPHERICAL_MIN_TAU {
        tau
    } else if tau < 0.0 {
        -BISPHERICAL_MIN_TAU
    } else {
        BISPHERICAL_MIN_TAU
    }
}

fn bispherical(c: Cell, s: f32) -> [f32; 3] {
    let tau = clamp_bispherical_tau(c.uc * BISPHERICAL_TAU_MAX);
    let sigma = BISPHERICAL_MIN_SIGMA + c.v0 * (PI - 2.0 * BISPHERICAL_MIN_SIGMA);
    let phi = TAU * c.w_cyc;
    let a = s * BISPHERICAL_FOCAL;
    let denom = tau.cosh() - sigma.cos();
    [
        a * sigma.sin() * phi.cos() / denom,
        a * tau.sinh() / denom,
        a * sigma.sin() * phi.sin() / denom,
    ]
}

fn conical(c: Cell, s: f32) -> [f32; 3] {
    let r = s * (CONE_RADIUS_MIN + c.u0 * (1.0 - CONE_RADIUS_MIN));
    let alpha = CONE_ALPHA_MIN + c.v0 * (CONE_ALPHA_MAX - CONE_ALPHA_MIN);
    let phi = TAU * c.w_cyc;
    [
        r * alpha.sin() * phi.cos(),
        s * 0.5 - r * alpha.cos(),
        r * alpha.sin() * phi.sin(),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/layout/generator.rs"]
mod tests;
