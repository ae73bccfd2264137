//! Unseeded global mask building
//!
//! Turns a whole probability plane into a single cleaned-up subject mask
//! without any user input: threshold, isolate the dominant component,
//! smooth, fill, isolate again.

use crate::threshold::threshold_map;
use maskforge_core::{Connectivity, Mask, ProbMap};
use maskforge_morph::{close, fill_holes, largest_component, open};

/// Build a global selection from a probability plane.
///
/// The pipeline is: threshold at the (already computed) Otsu value, keep
/// the largest 4-connected component, close then open, fill enclosed
/// holes, keep the largest component once more. The second extraction is
/// required because hole filling can reconnect fragments that the first
/// pass separated.
pub fn build_global_mask(map: &ProbMap, otsu: f32) -> Mask {
    let mask = threshold_map(map, otsu);
    let mask = largest_component(&mask);
    let mask = close(&mask, Connectivity::EightWay);
    let mask = open(&mask, Connectivity::EightWay);
    let mask = fill_holes(&mask);
    largest_component(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::otsu_threshold;
    use maskforge_core::MASK_ON;

    #[test]
    fn test_uniform_high_probability_selects_everything() {
        let map = ProbMap::filled(4, 4, 0.9).unwrap();
        let otsu = otsu_threshold(&map);
        let mask = build_global_mask(&map, otsu);
        assert_eq!(mask.count_nonzero(), 16);
        assert!(mask.data().iter().all(|&v| v == MASK_ON));
    }

    #[test]
    fn test_uniform_low_probability_selects_nothing() {
        let map = ProbMap::filled(6, 6, 0.05).unwrap();
        let mask = build_global_mask(&map, 0.5);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_keeps_dominant_blob_only() {
        // A 6x6 bright block and a far-away 2x2 block
        let mut data = vec![0.05f32; 16 * 16];
        for y in 2..8 {
            for x in 2..8 {
                data[y * 16 + x] = 0.95;
            }
        }
        for y in 12..14 {
            for x in 12..14 {
                data[y * 16 + x] = 0.95;
            }
        }
        let map = ProbMap::from_vec(16, 16, data).unwrap();
        let mask = build_global_mask(&map, 0.5);
        assert!(mask.get(4, 4) == MASK_ON);
        assert_eq!(mask.get(12, 12), 0);
    }
}
