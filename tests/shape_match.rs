use cdmatch::kernel::MAX_RADIUS;
use cdmatch::transform::{gradient_image, z_gap_mask};
use cdmatch::{
    normalize_scores, CdMatchError, ColorDepthSearchAlgorithm, Image, MatchRecord,
    PixelMatchScore, Rgb, ShapeMatchConfig, ShapeMatchProvider, ShapeMatchScore, VariantKind,
    Variants, COLOR_DEPTH_LUT,
};

const BLUE: Rgb = Rgb::new(0, 0, 255);

fn image_with(width: usize, height: usize, pixels: &[(usize, usize, Rgb)]) -> Image {
    let mut data = vec![Rgb::BLACK; width * height];
    for &(x, y, px) in pixels {
        data[y * width + x] = px;
    }
    Image::from_rgb(data, width, height).unwrap()
}

fn block(x0: usize, y0: usize, w: usize, h: usize, px: Rgb) -> Vec<(usize, usize, Rgb)> {
    let mut out = Vec::new();
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            out.push((x, y, px));
        }
    }
    out
}

fn no_mirror() -> ShapeMatchConfig {
    ShapeMatchConfig {
        mirror: false,
        ..ShapeMatchConfig::default()
    }
}

fn with_gradient(target: &Image, threshold: i32) -> Variants<'static> {
    let gradient = gradient_image(target, threshold).unwrap();
    Variants::new().with_image(VariantKind::Gradient, gradient)
}

#[test]
fn missing_gradient_is_unscored() {
    let query = image_with(20, 10, &block(2, 2, 3, 3, BLUE));
    let target = query.clone();
    let alg = ShapeMatchProvider::new(ShapeMatchConfig::default())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();

    let result = alg.calculate_matching_score(&target, &Variants::new()).unwrap();
    assert_eq!(result, ShapeMatchScore::UNSCORED);
    assert_eq!(result.gradient_area_gap, -1);
    assert_eq!(result.high_expression_area, -1);
    assert!(!result.mirrored);

    let absent = Variants::new().with_supplier(VariantKind::Gradient, || None);
    let result = alg.calculate_matching_score(&target, &absent).unwrap();
    assert_eq!(result, ShapeMatchScore::UNSCORED);
}

#[test]
fn identical_images_have_no_penalty() {
    let query = image_with(40, 30, &block(10, 10, 4, 3, BLUE));
    let target = query.clone();
    let alg = ShapeMatchProvider::new(no_mirror())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();
    let result = alg
        .calculate_matching_score(&target, &with_gradient(&target, 20))
        .unwrap();
    assert_eq!(result.gradient_area_gap, 0);
    assert_eq!(result.high_expression_area, 0);
    assert_eq!(result.negative_score(), 0);
}

#[test]
fn distant_signal_accumulates_gradient_and_halo_penalties() {
    let query = image_with(60, 12, &block(4, 4, 2, 2, BLUE));
    let target = image_with(60, 12, &block(40, 4, 2, 2, BLUE));
    let alg = ShapeMatchProvider::new(no_mirror())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();
    let result = alg
        .calculate_matching_score(&target, &with_gradient(&target, 20))
        .unwrap();
    // query pixels sit 36, 35, 36, 35 pixels from the target block
    assert_eq!(result.gradient_area_gap, 142);
    // every target pixel lies in the 20..60 halo of the query
    assert_eq!(result.high_expression_area, 4);
    assert_eq!(result.max_negative_score, 144);
}

#[test]
fn slice_gap_beyond_flux_is_penalized() {
    let query = image_with(20, 20, &[(10, 10, COLOR_DEPTH_LUT[0])]);
    let target = image_with(20, 20, &[(10, 10, COLOR_DEPTH_LUT[100])]);
    let alg = ShapeMatchProvider::new(no_mirror())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();
    let result = alg
        .calculate_matching_score(&target, &with_gradient(&target, 20))
        .unwrap();
    // slices 1 and 101, flux 40
    assert_eq!(result.gradient_area_gap, 60);
    assert_eq!(result.high_expression_area, 0);
}

#[test]
fn precomputed_z_gap_matches_on_the_fly() {
    let query = image_with(30, 20, &block(3, 3, 3, 2, COLOR_DEPTH_LUT[10]));
    let target = image_with(30, 20, &block(8, 6, 4, 4, COLOR_DEPTH_LUT[200]));
    let cfg = no_mirror();
    let alg = ShapeMatchProvider::new(cfg.clone())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();

    let on_the_fly = alg
        .calculate_matching_score(&target, &with_gradient(&target, cfg.target_threshold))
        .unwrap();
    let z_gap = z_gap_mask(&target, cfg.target_threshold, cfg.negative_radius).unwrap();
    let precomputed = alg
        .calculate_matching_score(
            &target,
            &with_gradient(&target, cfg.target_threshold).with_image(VariantKind::ZGap, z_gap),
        )
        .unwrap();
    assert_eq!(on_the_fly, precomputed);
    assert!(on_the_fly.gradient_area_gap > 0);
}

#[test]
fn mirror_keeps_the_lower_penalty() {
    let query = image_with(40, 10, &block(2, 4, 4, 2, BLUE));
    let target = query.mirror_x();
    let variants = with_gradient(&target, 20);

    let plain = ShapeMatchProvider::new(no_mirror())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap()
        .calculate_matching_score(&target, &variants)
        .unwrap();
    assert!(plain.gradient_area_gap > 0);
    assert!(!plain.mirrored);

    let mirrored = ShapeMatchProvider::new(ShapeMatchConfig::default())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap()
        .calculate_matching_score(&target, &variants)
        .unwrap();
    assert!(mirrored.mirrored);
    assert_eq!(mirrored.gradient_area_gap, 0);
    assert_eq!(mirrored.high_expression_area, 0);
}

#[test]
fn roi_restricts_the_query() {
    let mut pixels = block(2, 2, 2, 2, BLUE);
    pixels.extend(block(30, 2, 2, 2, BLUE));
    let query = image_with(40, 10, &pixels);
    let target = image_with(40, 10, &block(2, 2, 2, 2, BLUE));
    let mut roi = vec![0u8; 400];
    for y in 0..10 {
        for x in 0..20 {
            roi[y * 40 + x] = 1;
        }
    }
    let roi = Image::from_gray8(roi, 40, 10).unwrap();
    let variants = with_gradient(&target, 20);
    let provider = ShapeMatchProvider::new(no_mirror()).unwrap();

    let full = provider
        .create_algorithm(&query, None)
        .unwrap()
        .calculate_matching_score(&target, &variants)
        .unwrap();
    let restricted = provider
        .create_algorithm(&query, Some(&roi))
        .unwrap()
        .calculate_matching_score(&target, &variants)
        .unwrap();
    assert!(full.gradient_area_gap > 0);
    assert_eq!(restricted.gradient_area_gap, 0);
}

#[test]
fn target_shape_mismatch_is_an_error() {
    let query = image_with(20, 10, &block(2, 2, 2, 2, BLUE));
    let target = image_with(20, 12, &block(2, 2, 2, 2, BLUE));
    let alg = ShapeMatchProvider::new(no_mirror())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();
    let err = alg
        .calculate_matching_score(&target, &with_gradient(&target, 20))
        .unwrap_err();
    assert!(matches!(err, CdMatchError::DimensionMismatch { .. }));
}

#[test]
fn invalid_radii_are_rejected() {
    let cfg = ShapeMatchConfig {
        over_expression_inner: 60.0,
        over_expression_outer: 20.0,
        ..ShapeMatchConfig::default()
    };
    assert!(ShapeMatchProvider::new(cfg).is_err());
}

#[test]
fn oversized_radius_is_rejected() {
    let cfg = ShapeMatchConfig {
        negative_radius: 1e12,
        ..ShapeMatchConfig::default()
    };
    assert!(matches!(
        ShapeMatchProvider::new(cfg),
        Err(CdMatchError::InvalidInput(_))
    ));
    let cfg = ShapeMatchConfig {
        over_expression_outer: MAX_RADIUS + 1.0,
        ..ShapeMatchConfig::default()
    };
    assert!(ShapeMatchProvider::new(cfg).is_err());
}

#[test]
fn gradient_penalty_at_noise_level_is_dropped() {
    let (w, h) = (40, 30);
    let query = image_with(w, h, &[(10, 10, BLUE)]);
    let target = image_with(w, h, &[]);
    let alg = ShapeMatchProvider::new(no_mirror())
        .unwrap()
        .create_algorithm(&query, None)
        .unwrap();
    let z_gap = image_with(w, h, &[]);

    let score_with_gradient = |value: u8| {
        let mut gradient = vec![0u8; w * h];
        gradient[10 * w + 10] = value;
        let variants = Variants::new()
            .with_image(VariantKind::Gradient, Image::from_gray8(gradient, w, h).unwrap())
            .with_image(VariantKind::ZGap, z_gap.clone());
        alg.calculate_matching_score(&target, &variants).unwrap()
    };

    // gap_noise is 3
    assert_eq!(score_with_gradient(3).gradient_area_gap, 0);
    assert_eq!(score_with_gradient(4).gradient_area_gap, 4);
    assert_eq!(score_with_gradient(4).high_expression_area, 0);
}

#[test]
fn mirrored_query_is_clipped_to_the_roi() {
    let (w, h) = (60, 12);
    let query = image_with(w, h, &block(4, 4, 2, 2, BLUE));
    // mirror lands at x = 54..55, the target sits 22..24 pixels from it
    let target = image_with(w, h, &block(31, 4, 2, 2, BLUE));
    let mut roi = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..30 {
            roi[y * w + x] = 1;
        }
    }
    let roi = Image::from_gray8(roi, w, h).unwrap();
    let variants = with_gradient(&target, 20);

    let plain = ShapeMatchProvider::new(no_mirror())
        .unwrap()
        .create_algorithm(&query, Some(&roi))
        .unwrap()
        .calculate_matching_score(&target, &variants)
        .unwrap();
    // query pixels are 26, 27, 26, 27 pixels from the target
    assert_eq!(plain.gradient_area_gap, 106);
    assert_eq!(plain.high_expression_area, 4);

    let result = ShapeMatchProvider::new(ShapeMatchConfig::default())
        .unwrap()
        .create_algorithm(&query, Some(&roi))
        .unwrap()
        .calculate_matching_score(&target, &variants)
        .unwrap();
    // neither the mirrored pixels nor their halo survive the roi
    assert!(result.mirrored);
    assert_eq!(result.gradient_area_gap, 0);
    assert_eq!(result.high_expression_area, 0);
    assert_eq!(result.negative_score(), 0);
}

fn pixel(count: i64) -> PixelMatchScore {
    PixelMatchScore {
        match_count: count,
        ratio: 0.0,
        mirrored: false,
    }
}

fn shape(negative: i64) -> ShapeMatchScore {
    ShapeMatchScore {
        gradient_area_gap: negative,
        high_expression_area: 0,
        max_negative_score: negative,
        mirrored: false,
    }
}

#[test]
fn normalization_uses_dataset_maxima() {
    let mut records = vec![
        MatchRecord::new(0, pixel(100), Some(shape(40))),
        MatchRecord::new(1, pixel(50), Some(shape(4))),
        MatchRecord::new(2, pixel(80), Some(ShapeMatchScore::UNSCORED)),
        MatchRecord::new(3, pixel(0), Some(shape(10))),
    ];
    normalize_scores(&mut records);
    // 100 / 100 / min(40 / 40 * 2.5, 1) * 100
    assert!((records[0].normalized_score - 100.0).abs() < 1e-9);
    // 50 / 100 / (4 / 40 * 2.5) * 100
    assert!((records[1].normalized_score - 200.0).abs() < 1e-9);
    assert_eq!(records[2].normalized_score, 80.0);
    assert_eq!(records[3].normalized_score, 0.0);
}
