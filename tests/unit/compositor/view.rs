use super::*;

#[test]
fn defaults_admit_everything() {
    let v = ViewState::default();
    for kind in LayerType::ALL {
        assert!(v.admits(Layer::new(kind, 0)));
        assert!(v.admits(Layer::new(kind, u16::MAX)));
    }
}

#[test]
fn sprite_range_only_filters_sprites() {
    let v = ViewState {
        sprite_range: (3, 10),
        ..ViewState::default()
    };
    assert!(!v.admits(Layer::sprite(2)));
    assert!(v.admits(Layer::sprite(3)));
    assert!(v.admits(Layer::sprite(10)));
    assert!(!v.admits(Layer::sprite(11)));
    assert!(v.admits(Layer::human(50)));
    assert!(v.admits(Layer::background(0)));
}

#[test]
fn inverted_sprite_range_hides_all_sprites() {
    let v = ViewState {
        sprite_range: (10, 3),
        ..ViewState::default()
    };
    assert!(!v.admits(Layer::sprite(5)));
    assert!(!v.admits(Layer::sprite(10)));
}

#[test]
fn type_mask_filters() {
    let v = ViewState {
        active: LayerTypes::BACKGROUND | LayerTypes::TEXT,
        ..ViewState::default()
    };
    assert!(v.admits(Layer::background(1)));
    assert!(v.admits(Layer::text(1)));
    assert!(!v.admits(Layer::sprite(1)));
    assert!(!v.admits(Layer::human(1)));
}

#[test]
fn type_priority_dominates_ordinal() {
    let v = ViewState::default();
    assert!(v.sort_key(Layer::background(900), 0) < v.sort_key(Layer::sprite(0), 0));
    assert!(v.sort_key(Layer::sprite(900), 0) < v.sort_key(Layer::human(0), 0));
    assert!(v.sort_key(Layer::human(900), 0) < v.sort_key(Layer::text(0), 0));
    assert!(v.sort_key(Layer::sprite(1), 9) < v.sort_key(Layer::sprite(2), 0));
    assert!(v.sort_key(Layer::sprite(1), 0) < v.sort_key(Layer::sprite(1), 1));
}

#[test]
fn human_order_ranks_listed_then_natural() {
    let v = ViewState {
        human_order: vec![3, 1],
        ..ViewState::default()
    };
    let mut humans = [2u16, 1, 3, 0];
    humans.sort_by_key(|&n| v.sort_key(Layer::human(n), 0));
    assert_eq!(humans, [3, 1, 0, 2]);

    // sprites ignore the list
    assert!(v.sort_key(Layer::sprite(1), 0) < v.sort_key(Layer::sprite(3), 0));
}

#[test]
fn duplicate_human_ordinals_use_first_position() {
    let v = ViewState {
        human_order: vec![2, 5, 2],
        ..ViewState::default()
    };
    let mut humans = [5u16, 2];
    humans.sort_by_key(|&n| v.sort_key(Layer::human(n), 0));
    assert_eq!(humans, [2, 5]);
}
