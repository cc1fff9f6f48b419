use super::*;

fn pool() -> SlotPool<&'static str> {
    SlotPool::default()
}

#[test]
fn allocation_reuses_lowest_free_slot() {
    let mut p = pool();
    let a = p.allocate("a", Layer::sprite(0), true);
    let b = p.allocate("b", Layer::sprite(1), true);
    let c = p.allocate("c", Layer::sprite(2), true);
    assert_eq!((a.index, b.index, c.index), (0, 1, 2));

    p.release(a).unwrap();
    p.release(b).unwrap();
    assert_eq!(p.len(), 3);

    let d = p.allocate("d", Layer::sprite(3), true);
    assert_eq!(d.index, 0);
    assert!(d.seq > c.seq);
    let e = p.allocate("e", Layer::sprite(4), true);
    assert_eq!(e.index, 1);
}

#[test]
fn stale_reference_never_reaches_new_occupant() {
    let mut p = pool();
    let a = p.allocate("a", Layer::human(1), true);
    p.release(a).unwrap();
    let b = p.allocate("b", Layer::human(2), true);
    assert_eq!(a.index, b.index);

    let err = p.get(a).unwrap_err();
    assert!(matches!(err, VnError::StaleReference { index: 0, seq } if seq == a.seq));
    assert!(p.get_mut(a).is_err());
    assert!(p.release(a).is_err());
    assert_eq!(p.get(b).unwrap().texture, Some("b"));
}

#[test]
fn out_of_range_index_is_stale() {
    let p = pool();
    assert!(p.get(SlotRef { index: 7, seq: 0 }).is_err());
}

#[test]
fn freeing_trailing_slots_trims_pool() {
    let mut p = pool();
    let refs: Vec<_> = (0..4)
        .map(|i| p.allocate("x", Layer::text(i), false))
        .collect();

    p.release(refs[1]).unwrap();
    p.release(refs[2]).unwrap();
    assert_eq!(p.len(), 4);
    assert_eq!(p.live(), 2);

    // freeing the top slot drops it and the free run beneath it
    p.release(refs[3]).unwrap();
    assert_eq!(p.len(), 1);

    p.release(refs[0]).unwrap();
    assert_eq!(p.len(), 0);
}

#[test]
fn release_reports_ownership() {
    let mut p = pool();
    let owned = p.allocate("o", Layer::background(0), true);
    let borrowed = p.allocate("b", Layer::background(1), false);
    assert_eq!(p.release(borrowed).unwrap(), ("b", false));
    assert_eq!(p.release(owned).unwrap(), ("o", true));
}

#[test]
fn live_iteration_skips_free_slots() {
    let mut p = pool();
    let a = p.allocate("a", Layer::sprite(0), true);
    let b = p.allocate("b", Layer::sprite(0), false);
    let c = p.allocate("c", Layer::sprite(0), true);
    p.release(b).unwrap();

    let live: Vec<_> = p.iter_live().map(|(r, _)| r).collect();
    assert_eq!(live, [a, c]);

    let owned = p.drain_owned();
    assert_eq!(owned, ["a", "c"]);
    assert_eq!(p.len(), 0);
}
