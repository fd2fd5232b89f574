//! Property tests for the panel geometry solver.
//!
//! For any weights, gap, collapsed width, and collapse subset, the solution
//! must tile the container: scales sum to 1 while anything is expanded,
//! collapsed panels stay at their fixed width, and spans never overlap.

use proptest::prelude::*;
use triptych_core::Dim;
use triptych_layout::{PanelId, PanelSpec, solve};

fn collapsed_from_mask(mask: u8) -> Vec<PanelId> {
    PanelId::ALL
        .into_iter()
        .filter(|id| mask & (1 << id.index()) != 0)
        .collect()
}

fn panels(weights: [f64; 3]) -> Vec<PanelSpec> {
    PanelId::ALL
        .into_iter()
        .zip(weights)
        .map(|(id, w)| PanelSpec::new(id, w))
        .collect()
}

proptest! {
    #[test]
    fn scales_sum_to_one_while_anything_is_expanded(
        weights in prop::array::uniform3(0.01f64..10.0),
        gap in 0.0f64..20.0,
        collapsed_width in 1.0f64..60.0,
        mask in 0u8..7,
    ) {
        let collapsed = collapsed_from_mask(mask);
        let solution = solve(&panels(weights), &collapsed, gap, collapsed_width);
        prop_assert!((solution.scale_sum() - 1.0).abs() < 1e-9);
        prop_assert!((solution.offset_sum() + 2.0 * gap).abs() < 1e-6);
    }

    #[test]
    fn spans_tile_the_container(
        weights in prop::array::uniform3(0.01f64..10.0),
        gap in 0.0f64..20.0,
        collapsed_width in 1.0f64..60.0,
        mask in 0u8..7,
        width in 200.0f64..4000.0,
    ) {
        let collapsed = collapsed_from_mask(mask);
        let solution = solve(&panels(weights), &collapsed, gap, collapsed_width);
        let spans = solution.resolve(width);
        prop_assert_eq!(spans[0].x, 0.0);
        for pair in spans.windows(2) {
            prop_assert!((pair[1].x - (pair[0].right() + gap)).abs() < 1e-6);
        }
        prop_assert!((spans[2].right() - width).abs() < 1e-6);
    }

    #[test]
    fn collapsed_panels_keep_fixed_width(
        weights in prop::array::uniform3(0.0f64..10.0),
        collapsed_width in 1.0f64..60.0,
        mask in 0u8..8,
    ) {
        let collapsed = collapsed_from_mask(mask);
        let solution = solve(&panels(weights), &collapsed, 6.0, collapsed_width);
        for id in &collapsed {
            let placement = solution.get(*id).unwrap();
            prop_assert_eq!(placement.size, Dim::from_offset(collapsed_width));
        }
        for placement in solution.placements() {
            prop_assert!(placement.size.scale.is_finite());
            prop_assert!(placement.size.offset.is_finite());
        }
    }

    #[test]
    fn expanded_shares_follow_relative_weight(
        weights in prop::array::uniform3(0.01f64..10.0),
        mask in 0u8..7,
    ) {
        let collapsed = collapsed_from_mask(mask);
        let solution = solve(&panels(weights), &collapsed, 6.0, 28.0);
        let expanded: Vec<_> = PanelId::ALL
            .into_iter()
            .filter(|id| !collapsed.contains(id))
            .collect();
        let total: f64 = expanded.iter().map(|id| weights[id.index()]).sum();
        for id in expanded {
            let scale = solution.get(id).unwrap().size.scale;
            prop_assert!((scale - weights[id.index()] / total).abs() < 1e-9);
        }
    }
}

#[test]
fn all_collapsed_panels_sit_side_by_side() {
    let solution = solve(&panels([0.25, 0.45, 0.30]), &PanelId::ALL, 6.0, 28.0);
    let spans = solution.resolve(1000.0);
    assert_eq!(solution.scale_sum(), 0.0);
    assert_eq!(spans[0].x, 0.0);
    assert_eq!(spans[1].x, 34.0);
    assert_eq!(spans[2].x, 68.0);
    assert!(spans.iter().all(|s| s.width == 28.0));
}
