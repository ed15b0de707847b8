//! Property tests for tree generation

use interactive_fractal_tree::{
    constants::{MAX_TREE_SEGMENTS, MIN_BRANCH_LENGTH},
    interaction::InteractionParams,
    palette::{Background, Palette},
    tree::{branch_count, check_tree, grow_tree, shrink_steps, stroke_width},
    Error,
};
use nalgebra::Point2;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn params(len: f64, len_fac: f64, theta: f64, x_tilt: f64) -> InteractionParams {
    InteractionParams {
        len,
        len_fac,
        theta,
        x_tilt,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tree_terminates_with_expected_count(
        len in 0.5f64..600.0,
        len_fac in 0.05f64..0.72,
        theta in 0.0f64..110.0,
        tilt in -50.0f64..50.0,
        seed in any::<u64>(),
    ) {
        let p = params(len, len_fac, theta, tilt);
        let palette = Palette::select(len, Background::Dark);
        let mut rng = StdRng::seed_from_u64(seed);

        let segments = grow_tree(Point2::new(512.0, 768.0), &p, &palette, MIN_BRANCH_LENGTH, &mut rng).unwrap();

        let levels = shrink_steps(len, len_fac, MIN_BRANCH_LENGTH) + 1;
        prop_assert_eq!(segments.len() as u64, (1u64 << levels) - 1);
        prop_assert_eq!(Some(segments.len() as u64), branch_count(len, len_fac, MIN_BRANCH_LENGTH));
    }

    #[test]
    fn prop_every_branch_is_shorter_than_its_parent_level(
        len in 10.0f64..400.0,
        len_fac in 0.3f64..0.7,
    ) {
        let p = params(len, len_fac, 35.0, 10.0);
        let palette = Palette::select(len, Background::Light);
        let mut rng = StdRng::seed_from_u64(0);

        let segments = grow_tree(Point2::origin(), &p, &palette, MIN_BRANCH_LENGTH, &mut rng).unwrap();
        for segment in &segments {
            let expected = len * len_fac.powi(segment.depth as i32);
            prop_assert!((segment.length() - expected).abs() < 1e-6 * len);
            prop_assert!(palette.contains(segment.color));
        }
    }

    #[test]
    fn prop_check_tree_agrees_with_budget(len in 1.0f64..10_000.0, len_fac in 0.01f64..0.999) {
        let p = params(len, len_fac, 30.0, 0.0);
        match check_tree(&p, MIN_BRANCH_LENGTH) {
            Ok(count) => prop_assert!(count <= MAX_TREE_SEGMENTS),
            Err(Error::InvalidInput(_)) => {
                let count = branch_count(len, len_fac, MIN_BRANCH_LENGTH);
                prop_assert!(count.map_or(true, |c| c > MAX_TREE_SEGMENTS));
            }
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }

    #[test]
    fn prop_stroke_width_grows_with_length(a in 2.0f64..120.0, b in 2.0f64..120.0) {
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(stroke_width(short) <= stroke_width(long));
        prop_assert!(stroke_width(short) >= 1.0 - 1e-12);
    }
}

#[test]
fn test_same_seed_same_colors() {
    let p = params(300.0, 0.65, 40.0, 0.0);
    let palette = p.palette(Background::Dark);

    let first = grow_tree(Point2::origin(), &p, &palette, 2.0, &mut StdRng::seed_from_u64(9)).unwrap();
    let second = grow_tree(Point2::origin(), &p, &palette, 2.0, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_siblings_do_not_leak_rotation() {
    let p = params(100.0, 0.5, 45.0, 0.0);
    let palette = p.palette(Background::Dark);
    let segments = grow_tree(Point2::origin(), &p, &palette, 2.0, &mut StdRng::seed_from_u64(1)).unwrap();

    // Without tilt the tree is mirror symmetric around the stem
    let mut left: Vec<f64> = segments.iter().filter(|s| s.end.x < -1e-9).map(|s| -s.end.x).collect();
    let mut right: Vec<f64> = segments.iter().filter(|s| s.end.x > 1e-9).map(|s| s.end.x).collect();
    left.sort_by(f64::total_cmp);
    right.sort_by(f64::total_cmp);
    assert_eq!(left.len(), right.len());
    for (l, r) in left.iter().zip(&right) {
        assert!((l - r).abs() < 1e-9);
    }
}

#[test]
fn test_default_parameters_draw() {
    let p = InteractionParams::default();
    let count = check_tree(&p, MIN_BRANCH_LENGTH).unwrap();
    assert!(count > 1);
}
