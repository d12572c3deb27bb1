//! One pass of crust generation: stress, plates, material, and a plate motion step
//! resampled through the lithosphere reference frames.

use crate::config::{MotionConfig, TectonicaConfig};
use crate::stress::{buoyancy, surface_gradient};
use crustgen::prelude::*;
use crustgen::raster;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::FRAC_1_SQRT_2;

/// Density of crustal rock, kg/m³
const CRUST_DENSITY: f32 = 2900.0;
/// Crust thickness at the lowest and highest buoyancy, in meters
const MIN_CRUST_THICKNESS: f32 = 7.0e3;
const MAX_CRUST_THICKNESS: f32 = 3.7e4;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub vertex_count: usize,
    pub plate_sizes: Vec<usize>,
    /// Vertices no plate reached while growing
    pub unclaimed: usize,
    pub segment_sizes: Vec<usize>,
    /// Size of the stored material raster
    pub store_bytes: usize,
    pub mass_before: f32,
    /// Mass after plates were moved and merged on the global grid
    pub mass_after: f32,
    /// Mass each plate recovers from the merged raster over its own vertices
    pub relocalized_mass: f32,
}

pub fn run(config: &TectonicaConfig) -> Result<SimulationReport> {
    let grid = IcosahedralGrid::from_config(&config.crust.grid)?;
    let vertex_count = grid.vertex_count();
    log::info!("grid has {} vertices", vertex_count);

    let buoyancy = buoyancy(&grid, &config.stress);
    let stress = surface_gradient(&grid, &buoyancy, grid.radius());

    let fractures = CrustFracturing::from_config(&config.crust.fracture).fracture(&grid, &stress)?;
    log::info!(
        "fractured crust into {} plates, {} vertices left unclaimed",
        fractures.plate_count(),
        fractures.unclaimed.len()
    );

    let fill = PriorityFloodFilling::new(
        |_, a: &Vec3, _, b: &Vec3| a.normalize_or_zero().dot(b.normalize_or_zero()) > FRAC_1_SQRT_2,
        distance_priority::<Vec3>,
    );
    let segmentation = ImageSegmentation::from_config(fill, &config.crust.segmentation).segment(&grid, &stress)?;
    log::info!("segmented stress into {} regions", segmentation.segment_count());

    let records: Raster<MaterialRecord> = buoyancy
        .iter()
        .map(|b| sample_material(*b, config.stress.amplitude, grid.vertex_area()))
        .collect();
    let stores: Vec<MaterialRecordStore> = records.iter().map(MaterialRecord::encode).collect();
    let store_bytes = bytemuck::cast_slice::<MaterialRecordStore, u8>(&stores).len();
    let material: Raster<MaterialRecord> = stores.iter().map(MaterialRecordStore::decode).collect();
    let mass_before = total_mass(&material)?;

    let locals: Vec<Raster<MaterialRecord>> = (1..=fractures.plate_count() as PlateLabel)
        .map(|label| {
            fractures
                .plate_map
                .iter()
                .zip(&material)
                .map(|(l, m)| if *l == label { *m } else { MaterialRecord::default() })
                .collect()
        })
        .collect();

    let frames = random_frames(fractures.plate_count(), &config.motion);
    let lithosphere = LithosphereReferenceFrames::new(&grid, &grid);
    let globals = lithosphere.globalize(&frames, &locals)?;
    let merged = lithosphere.flatten(&globals)?;
    let mass_after = total_mass(&merged)?;

    let relocalized = lithosphere.localize(&frames, &merged)?;
    let relocalized_mass: f32 = relocalized
        .iter()
        .enumerate()
        .map(|(i, local)| {
            let label = (i + 1) as PlateLabel;
            local
                .iter()
                .zip(&fractures.plate_map)
                .filter(|(_, l)| **l == label)
                .map(|(m, _)| m.mass)
                .sum::<f32>()
        })
        .sum();
    log::info!(
        "mass before motion {:.4e}, after {:.4e}, recovered by plates {:.4e}",
        mass_before,
        mass_after,
        relocalized_mass
    );

    Ok(SimulationReport {
        vertex_count,
        plate_sizes: fractures.plate_sizes(),
        unclaimed: fractures.unclaimed.len(),
        segment_sizes: segmentation.sizes,
        store_bytes,
        mass_before,
        mass_after,
        relocalized_mass,
    })
}

/// Rock at one vertex. Buoyant crust is thicker and richer in intrusive and weathered rock.
fn sample_material(buoyancy: f32, amplitude: f32, vertex_area: f32) -> MaterialRecord {
    let elevation = if amplitude > 0.0 {
        (buoyancy / amplitude).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let uplift = (elevation + 1.0) / 2.0;

    let mut fractions = [0.0; crustgen::material::GRAIN_TYPE_COUNT];
    fractions[GrainType::UnweatheredExtrusive.index()] = 1.0 - uplift;
    fractions[GrainType::UnweatheredIntrusive.index()] = 0.6 * uplift;
    fractions[GrainType::WeatheredExtrusive.index()] = 0.3 * uplift;
    fractions[GrainType::MetamorphicUnweatheredIntrusive.index()] = 0.1 * uplift;

    let thickness = MIN_CRUST_THICKNESS + (MAX_CRUST_THICKNESS - MIN_CRUST_THICKNESS) * uplift;
    MaterialRecord::new(vertex_area * thickness * CRUST_DENSITY, fractions)
}

fn total_mass(records: &[MaterialRecord]) -> Result<f32> {
    let masses: Vec<f32> = records.iter().map(|r| r.mass).collect();
    raster::sum(&masses)
}

fn random_frames(count: usize, config: &MotionConfig) -> Vec<PlateReferenceFrame> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let max = config.max_rotation_angle;
    (0..count)
        .map(|_| {
            let axis = Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            )
            .normalize_or(Vec3::Z);
            let angle = if max > 0.0 { rng.random_range(-max..=max) } else { 0.0 };
            PlateReferenceFrame::from_axis_angle(axis, angle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StressConfig;
    use crustgen::config::{CrustGenConfig, FractureConfig, GridConfig, SegmentationConfig};
    use rstest::rstest;

    fn small_config(max_rotation_angle: f32) -> TectonicaConfig {
        TectonicaConfig {
            crust: CrustGenConfig {
                grid: GridConfig {
                    vertices_per_side: 8,
                    radius: 6.371e6,
                },
                fracture: FractureConfig {
                    plate_count: 5,
                    ..FractureConfig::default()
                },
                segmentation: SegmentationConfig {
                    segment_count: 5,
                    min_segment_vertex_count: 1,
                    max_steps_per_segment: None,
                },
            },
            stress: StressConfig::default(),
            motion: MotionConfig {
                seed: 4,
                max_rotation_angle,
            },
        }
    }

    #[test]
    fn report_covers_every_vertex() {
        let report = run(&small_config(0.05)).unwrap();
        assert_eq!(report.vertex_count, 492);
        assert_eq!(report.plate_sizes.len(), 5);
        assert_eq!(report.plate_sizes.iter().sum::<usize>(), report.vertex_count);
        assert!(report.segment_sizes.len() <= 5);
        assert_eq!(report.store_bytes, 12 * report.vertex_count);
        assert!(report.mass_before > 0.0);
        assert!(report.mass_after > 0.0);
    }

    #[test]
    fn still_plates_conserve_mass() {
        let report = run(&small_config(0.0)).unwrap();
        let tolerance = report.mass_before * 1e-4;
        assert!((report.mass_after - report.mass_before).abs() <= tolerance);
        assert!((report.relocalized_mass - report.mass_before).abs() <= tolerance);
    }

    #[test]
    fn runs_are_reproducible() {
        assert_eq!(run(&small_config(0.1)).unwrap(), run(&small_config(0.1)).unwrap());
    }

    #[rstest]
    #[case(-1.0, 0.0)]
    #[case(1.0, 1.0)]
    #[case(5.0, 1.0)]
    fn material_follows_buoyancy(#[case] buoyancy: f32, #[case] uplift: f32) {
        let record = sample_material(buoyancy, 1.0, 1.0);
        let total: f32 = record.grain_type_relative_volume.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!((record.relative_volume(GrainType::UnweatheredExtrusive) - (1.0 - uplift)).abs() < 1e-6);
        let expected_mass = (MIN_CRUST_THICKNESS + (MAX_CRUST_THICKNESS - MIN_CRUST_THICKNESS) * uplift) * CRUST_DENSITY;
        assert!((record.mass - expected_mass).abs() <= expected_mass * 1e-6);
    }

    #[test]
    fn zero_angle_frames_are_identity() {
        let frames = random_frames(3, &MotionConfig {
            seed: 2,
            max_rotation_angle: 0.0,
        });
        for frame in frames {
            assert_eq!(frame.rotation(), glam::Mat3::IDENTITY);
        }
    }
}
