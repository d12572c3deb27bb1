//! Rock material records and their compact stored form.
//!
//! A [`MaterialRecord`] holds a mass and the relative volume of each grain type.
//! [`MaterialRecordStore`] packs the same record into 12 bytes by keeping the mass
//! as-is and rescaling the fractions so the most voluminous grain type reads 255.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

pub const GRAIN_TYPE_COUNT: usize = 8;

/// Largest value a stored part count can take
pub const PART_COUNT_SCALE: f32 = 255.0;

/// Floor for the largest fraction when rescaling, so near-empty records don't blow up
pub const ENCODE_EPSILON: f32 = 1e-4;

/// Floor for the combined mass when averaging fractions
pub const COMBINE_EPSILON: f32 = 1e-6;

/// Worst-case per-channel error of `decode(encode(r))` against `r`.
///
/// The largest channel is exact before renormalization; each of the seven others
/// rounds by at most half a part, so the decoded total drifts by at most 3.5 parts
/// against a total of at least 255 - 3.5.
pub const DECODE_TOLERANCE: f32 = 4.0 / 251.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrainType {
    UnweatheredExtrusive,
    UnweatheredIntrusive,
    WeatheredExtrusive,
    WeatheredIntrusive,
    MetamorphicUnweatheredExtrusive,
    MetamorphicUnweatheredIntrusive,
    MetamorphicWeatheredExtrusive,
    MetamorphicWeatheredIntrusive,
}

impl GrainType {
    pub const ALL: [GrainType; GRAIN_TYPE_COUNT] = [
        GrainType::UnweatheredExtrusive,
        GrainType::UnweatheredIntrusive,
        GrainType::WeatheredExtrusive,
        GrainType::WeatheredIntrusive,
        GrainType::MetamorphicUnweatheredExtrusive,
        GrainType::MetamorphicUnweatheredIntrusive,
        GrainType::MetamorphicWeatheredExtrusive,
        GrainType::MetamorphicWeatheredIntrusive,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_metamorphic(self) -> bool {
        self.index() >= 4
    }

    pub fn is_weathered(self) -> bool {
        matches!(self.index() % 4, 2 | 3)
    }

    pub fn is_intrusive(self) -> bool {
        self.index() % 2 == 1
    }
}

/// Merge rule used when several values land on the same vertex
pub trait Combine {
    fn combine(&self, other: &Self) -> Self;
}

impl Combine for f32 {
    fn combine(&self, other: &Self) -> Self {
        self + other
    }
}

/// Decoded rock material at one vertex
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub mass: f32,
    pub grain_type_relative_volume: [f32; GRAIN_TYPE_COUNT],
}

impl MaterialRecord {
    pub fn new(mass: f32, grain_type_relative_volume: [f32; GRAIN_TYPE_COUNT]) -> Self {
        Self {
            mass,
            grain_type_relative_volume,
        }
    }

    /// A record made entirely of one grain type
    pub fn pure(mass: f32, grain_type: GrainType) -> Self {
        let mut fractions = [0.0; GRAIN_TYPE_COUNT];
        fractions[grain_type.index()] = 1.0;
        Self::new(mass, fractions)
    }

    pub fn is_empty(&self) -> bool {
        self.mass == 0.0 && self.grain_type_relative_volume.iter().all(|f| *f == 0.0)
    }

    pub fn relative_volume(&self, grain_type: GrainType) -> f32 {
        self.grain_type_relative_volume[grain_type.index()]
    }

    pub fn encode(&self) -> MaterialRecordStore {
        MaterialRecordStore::encode(self)
    }
}

impl Combine for MaterialRecord {
    fn combine(&self, other: &Self) -> Self {
        let mass = self.mass + other.mass;
        let total = mass.max(COMBINE_EPSILON);
        let mut fractions = [0.0; GRAIN_TYPE_COUNT];
        for (i, fraction) in fractions.iter_mut().enumerate() {
            *fraction = (self.grain_type_relative_volume[i] * self.mass
                + other.grain_type_relative_volume[i] * other.mass)
                / total;
        }
        Self::new(mass, fractions)
    }
}

/// Stored form of a [`MaterialRecord`]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialRecordStore {
    pub mass: f32,
    pub grain_type_part_counts: [u8; GRAIN_TYPE_COUNT],
}

const _: () = assert!(std::mem::size_of::<MaterialRecordStore>() == 12);

impl MaterialRecordStore {
    pub fn encode(record: &MaterialRecord) -> Self {
        let mut fractions = record.grain_type_relative_volume;
        for fraction in fractions.iter_mut() {
            if !fraction.is_finite() || *fraction < 0.0 {
                log::warn!("clamping grain fraction {} to zero", fraction);
                *fraction = 0.0;
            }
        }

        let max = fractions.iter().copied().fold(ENCODE_EPSILON, f32::max);
        let scale = PART_COUNT_SCALE / max;
        let mut grain_type_part_counts = [0u8; GRAIN_TYPE_COUNT];
        for (count, fraction) in grain_type_part_counts.iter_mut().zip(fractions) {
            // fractions are non-negative and at most `max`, so this stays within a byte
            *count = (fraction * scale).round().clamp(0.0, PART_COUNT_SCALE) as u8;
        }

        Self {
            mass: record.mass,
            grain_type_part_counts,
        }
    }

    pub fn decode(&self) -> MaterialRecord {
        let total: u32 = self.grain_type_part_counts.iter().map(|c| *c as u32).sum();
        let mut fractions = [0.0; GRAIN_TYPE_COUNT];
        if total > 0 {
            for (fraction, count) in fractions.iter_mut().zip(self.grain_type_part_counts) {
                *fraction = count as f32 / total as f32;
            }
        }
        MaterialRecord::new(self.mass, fractions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    fn assert_fractions_close(a: &MaterialRecord, b: &MaterialRecord, tolerance: f32) {
        for i in 0..GRAIN_TYPE_COUNT {
            let diff = (a.grain_type_relative_volume[i] - b.grain_type_relative_volume[i]).abs();
            assert!(diff <= tolerance, "channel {} differs by {}", i, diff);
        }
    }

    #[test]
    fn store_is_twelve_bytes() {
        assert_eq!(std::mem::size_of::<MaterialRecordStore>(), 12);
        let stores = vec![MaterialRecordStore::default(); 3];
        assert_eq!(bytemuck::cast_slice::<_, u8>(&stores).len(), 36);
    }

    #[rstest]
    #[case([0.5, 0.25, 0.125, 0.125, 0.0, 0.0, 0.0, 0.0], [255, 128, 64, 64, 0, 0, 0, 0])]
    #[case([0.0, 0.0, 0.0, 0.0, 0.5, 0.3, 0.2, 0.0], [0, 0, 0, 0, 255, 153, 102, 0])]
    fn encodes_largest_fraction_as_full_scale(
        #[case] fractions: [f32; GRAIN_TYPE_COUNT],
        #[case] expected: [u8; GRAIN_TYPE_COUNT],
    ) {
        let record = MaterialRecord::new(1234.5, fractions);
        let store = record.encode();
        assert_eq!(store.grain_type_part_counts, expected);
        assert_eq!(store.mass, 1234.5);

        let decoded = store.decode();
        assert_eq!(decoded.mass, 1234.5);
        assert_fractions_close(&decoded, &record, 1.0 / 255.0);
    }

    #[test]
    fn random_records_round_trip_within_tolerance() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let raw: [f32; GRAIN_TYPE_COUNT] = std::array::from_fn(|_| rng.random::<f32>());
            let total: f32 = raw.iter().sum();
            let record = MaterialRecord::new(rng.random_range(0.0..1e6), raw.map(|f| f / total));

            let store = record.encode();
            let fractions = record.grain_type_relative_volume;
            let max = fractions.iter().copied().fold(0.0, f32::max);
            for (count, fraction) in store.grain_type_part_counts.iter().zip(fractions) {
                // each count is the fraction relative to the largest one, rounded to the nearest 255th
                assert!((*count as f32 / 255.0 - fraction / max).abs() <= 0.5 / 255.0 + 1e-5);
            }

            let decoded = store.decode();
            assert_eq!(decoded.mass, record.mass);
            assert_fractions_close(&decoded, &record, DECODE_TOLERANCE);
        }
    }

    #[test]
    fn empty_record_round_trips_to_empty() {
        let decoded = MaterialRecord::default().encode().decode();
        assert!(decoded.is_empty());
    }

    #[test]
    fn invalid_fractions_are_clamped() {
        let record = MaterialRecord::new(1.0, [f32::NAN, -0.5, 1.0, 0.0, 0.0, 0.0, 0.0, f32::INFINITY]);
        let store = record.encode();
        assert_eq!(store.grain_type_part_counts, [0, 0, 255, 0, 0, 0, 0, 0]);
        assert_eq!(store.decode().relative_volume(GrainType::WeatheredExtrusive), 1.0);
    }

    #[test]
    fn combine_is_mass_weighted() {
        let a = MaterialRecord::pure(3.0, GrainType::UnweatheredExtrusive);
        let b = MaterialRecord::pure(1.0, GrainType::MetamorphicWeatheredIntrusive);
        let c = a.combine(&b);
        assert_eq!(c.mass, 4.0);
        assert!((c.relative_volume(GrainType::UnweatheredExtrusive) - 0.75).abs() < 1e-6);
        assert!((c.relative_volume(GrainType::MetamorphicWeatheredIntrusive) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn combine_has_empty_identity_and_commutes() {
        let a = MaterialRecord::new(2.0, [0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = MaterialRecord::new(6.0, [0.0, 0.25, 0.75, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(a.combine(&MaterialRecord::default()), a);
        assert_eq!(MaterialRecord::default().combine(&a), a);
        let ab = a.combine(&b);
        let ba = b.combine(&a);
        assert_eq!(ab.mass, ba.mass);
        assert_fractions_close(&ab, &ba, 1e-6);
    }

    #[test]
    fn combine_is_associative() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut record = || {
            let raw: [f32; GRAIN_TYPE_COUNT] = std::array::from_fn(|_| rng.random::<f32>());
            let total: f32 = raw.iter().sum();
            MaterialRecord::new(rng.random_range(1.0..100.0), raw.map(|f| f / total))
        };
        for _ in 0..100 {
            let (a, b, c) = (record(), record(), record());
            let left = a.combine(&b).combine(&c);
            let right = a.combine(&b.combine(&c));
            assert!((left.mass - right.mass).abs() <= 1e-4 * left.mass);
            assert_fractions_close(&left, &right, 1e-4);
        }
    }

    #[rstest]
    #[case(GrainType::UnweatheredExtrusive, false, false, false)]
    #[case(GrainType::WeatheredIntrusive, false, true, true)]
    #[case(GrainType::MetamorphicUnweatheredIntrusive, true, false, true)]
    #[case(GrainType::MetamorphicWeatheredExtrusive, true, true, false)]
    fn grain_type_classification(
        #[case] grain_type: GrainType,
        #[case] metamorphic: bool,
        #[case] weathered: bool,
        #[case] intrusive: bool,
    ) {
        assert_eq!(grain_type.is_metamorphic(), metamorphic);
        assert_eq!(grain_type.is_weathered(), weathered);
        assert_eq!(grain_type.is_intrusive(), intrusive);
    }
}
