use super::*;

#[test]
fn order_is_a_permutation_sorted_by_z() {
    let z = [Some(2), None, Some(-1), Some(2), None];
    let order = drawing_order(&z);
    assert_eq!(order, vec![2, 1, 4, 0, 3]);

    let mut seen = order.clone();
    seen.sort_unstable();
    assert_eq!(seen, (0..z.len()).collect::<Vec<_>>());
}

#[test]
fn helper_is_identity_without_z_index() {
    let mut helper = DrawingOrderHelper::new();
    helper.handle_add_view(None);
    helper.handle_add_view(None);
    assert!(!helper.should_enable_custom_drawing_order());
    assert_eq!(helper.child_drawing_order(&[None, None], 1), 1);
}

#[test]
fn helper_follows_add_and_remove() {
    let mut helper = DrawingOrderHelper::new();
    let mut z = vec![Some(5), None];
    helper.handle_add_view(Some(5));
    helper.handle_add_view(None);
    assert!(helper.should_enable_custom_drawing_order());
    assert_eq!(helper.child_drawing_order(&z, 0), 1);
    assert_eq!(helper.child_drawing_order(&z, 1), 0);

    // A third child invalidates the cached order.
    z.push(Some(1));
    helper.handle_add_view(Some(1));
    let drawn: Vec<usize> = (0..z.len())
        .map(|i| helper.child_drawing_order(&z, i))
        .collect();
    assert_eq!(drawn, vec![1, 2, 0]);

    z.remove(0);
    helper.handle_remove_view(Some(5));
    z.remove(1);
    helper.handle_remove_view(Some(1));
    assert!(!helper.should_enable_custom_drawing_order());
}

#[test]
fn structural_moves_do_not_change_what_is_drawn_last() {
    // Same children, different structural order: the highest z still draws last.
    let before = [Some(10), None, None];
    let after = [None, None, Some(10)];
    assert_eq!(*drawing_order(&before).last().unwrap(), 0);
    assert_eq!(*drawing_order(&after).last().unwrap(), 2);
}

#[test]
fn update_recounts_in_place_changes() {
    let mut helper = DrawingOrderHelper::new();
    helper.handle_add_view(None);
    helper.handle_add_view(None);
    helper.update(&[None, Some(-3)]);
    assert_eq!(helper.children_with_z_index(), 1);
    assert_eq!(helper.child_drawing_order(&[None, Some(-3)], 0), 1);
}
