use cdmatch::lowlevel::{band_range, channel_order, pixel_gap, HueBand};
use cdmatch::{color_slice_gap, find_slice, Rgb, COLOR_DEPTH_LUT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn every_entry_round_trips_to_its_slice() {
    for (idx, &entry) in COLOR_DEPTH_LUT.iter().enumerate() {
        assert_eq!(find_slice(entry), idx + 1, "entry {idx}");
        assert_eq!(color_slice_gap(entry, entry), 0, "entry {idx}");
    }
}

#[test]
fn gap_between_entries_is_index_distance() {
    for (a, b) in [(0usize, 255usize), (10, 11), (42, 43), (128, 129), (200, 17)] {
        let expected = (a as i32 - b as i32).abs();
        assert_eq!(color_slice_gap(COLOR_DEPTH_LUT[a], COLOR_DEPTH_LUT[b]), expected);
    }
}

#[test]
fn ratio_is_monotonic_within_each_band() {
    for band in HueBand::ALL {
        let ratios: Vec<f64> = band_range(band)
            .map(|idx| channel_order(COLOR_DEPTH_LUT[idx]).unwrap().ratio())
            .collect();
        for pair in ratios.windows(2) {
            if band.ascending() {
                assert!(pair[0] < pair[1], "{band:?}");
            } else {
                assert!(pair[0] > pair[1], "{band:?}");
            }
        }
    }
}

#[test]
fn slice_gap_is_symmetric_for_resolved_colors() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut checked = 0;
    for _ in 0..2000 {
        let a = Rgb::new(rng.random(), rng.random(), rng.random());
        let b = Rgb::new(rng.random(), rng.random(), rng.random());
        if find_slice(a) == 0 || find_slice(b) == 0 {
            continue;
        }
        assert_eq!(color_slice_gap(a, b), color_slice_gap(b, a), "{a:?} {b:?}");
        checked += 1;
    }
    assert!(checked > 1000);
}

#[test]
fn unresolved_side_passes_target_slice_through() {
    let target = COLOR_DEPTH_LUT[57];
    assert_eq!(color_slice_gap(Rgb::BLACK, target), 58);
    assert_eq!(color_slice_gap(target, Rgb::BLACK), 0);
}

#[test]
fn neighboring_lut_entries_have_small_pixel_gap() {
    for pair in COLOR_DEPTH_LUT.windows(2) {
        let gap = pixel_gap(pair[0], pair[1]);
        assert!(gap > 0.0 && gap < 0.06, "{:?} {:?} gap {gap}", pair[0], pair[1]);
    }
}
