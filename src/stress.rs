//! Procedural crust stress: a noise-driven buoyancy field over the grid and its
//! gradient along the surface.

use crate::config::StressConfig;
use crustgen::grid::Grid;
use crustgen::raster::Raster;
use glam::{Mat3, Vec3};
use noise::{NoiseFn, Perlin};

/// Perlin noise at every vertex normal stretched by `frequency`, scaled by `amplitude`
pub fn buoyancy<G: Grid>(grid: &G, config: &StressConfig) -> Raster<f32> {
    let perlin = Perlin::new(config.seed);
    (0..grid.vertex_count())
        .map(|v| {
            let point = grid.vertex_normal(v).as_dvec3() * config.frequency as f64;
            perlin.get(point.to_array()) as f32 * config.amplitude
        })
        .collect()
}

/// Least-squares gradient of `field` in each vertex's tangent plane, per unit of
/// grid radius.
pub fn surface_gradient<G: Grid>(grid: &G, field: &[f32], radius: f32) -> Raster<Vec3> {
    (0..grid.vertex_count())
        .map(|v| {
            let normal = grid.vertex_normal(v);
            let mut moments = Mat3::ZERO;
            let mut weighted = Vec3::ZERO;
            for &n in grid.neighbors(v) {
                let offset = grid.vertex_normal(n as usize) - normal;
                let tangent = offset - normal * offset.dot(normal);
                moments += outer(tangent, tangent);
                weighted += tangent * (field[n as usize] - field[v]);
            }
            // pin the normal component so the system stays solvable
            let trace = moments.x_axis.x + moments.y_axis.y + moments.z_axis.z;
            let system = moments + outer(normal, normal) * (trace / 2.0);
            if system.determinant().abs() <= f32::EPSILON * trace.powi(3) {
                return Vec3::ZERO;
            }
            system.inverse() * weighted / radius
        })
        .collect()
}

fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}
