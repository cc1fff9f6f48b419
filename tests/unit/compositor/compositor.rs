use super::*;
use crate::backend::memory::MemoryBackend;
use crate::foundation::error::{BackendError, VnError};

fn comp() -> Compositor<MemoryBackend> {
    Compositor::new(MemoryBackend::new())
}

fn shown(c: &mut Compositor<MemoryBackend>, layer: Layer) -> SlotRef {
    let r = c
        .new_composited_sized(Size::new(2, 2), layer, BlendMode::Blend, false)
        .unwrap();
    c.show(r, true).unwrap();
    r
}

fn order(c: &Compositor<MemoryBackend>) -> Vec<SlotRef> {
    c.draw_list().into_iter().map(|e| e.slot).collect()
}

#[test]
fn new_images_start_hidden_and_clean() {
    let mut c = comp();
    let r = c
        .new_composited_sized(Size::new(4, 4), Layer::sprite(1), BlendMode::None, false)
        .unwrap();
    assert!(!c.is_shown(r).unwrap());
    assert!(!c.is_updated(r).unwrap());
    assert!(c.is_owning(r).unwrap());
    assert!(!c.is_visible(r).unwrap());
    assert!(c.draw_list().is_empty());
}

#[test]
fn type_and_range_filter_scenario() {
    let mut c = comp();
    let _a = shown(&mut c, Layer::sprite(2));
    let b = shown(&mut c, Layer::sprite(5));
    let cc = shown(&mut c, Layer::background(0));
    let _d = shown(&mut c, Layer::human(1));

    c.set_active_types(LayerTypes::BACKGROUND | LayerTypes::SPRITE);
    c.set_active_sprite_range(3, 10);
    assert_eq!(order(&c), [cc, b]);
}

#[test]
fn human_reorder_scenario() {
    let mut c = comp();
    let h1 = shown(&mut c, Layer::human(1));
    let h2 = shown(&mut c, Layer::human(2));
    let h3 = shown(&mut c, Layer::human(3));
    assert_eq!(order(&c), [h1, h2, h3]);

    c.set_human_order(&[3, 1]);
    assert_eq!(c.human_order(), [3, 1]);
    assert_eq!(order(&c), [h3, h1, h2]);

    c.set_human_order(&[]);
    assert_eq!(order(&c), [h1, h2, h3]);
}

#[test]
fn equal_keys_keep_creation_order() {
    let mut c = comp();
    let first = shown(&mut c, Layer::text(0));
    let second = shown(&mut c, Layer::text(0));
    // the newer image lands in a lower slot after a free
    let filler = shown(&mut c, Layer::text(9));
    c.delete_composited(first).unwrap();
    let third = shown(&mut c, Layer::text(0));
    assert_eq!(third.index, 0);
    assert_eq!(order(&c), [second, third, filler]);
}

#[test]
fn active_type_editing() {
    let mut c = comp();
    assert_eq!(c.active_types(), LayerTypes::all());
    c.remove_active_types(LayerTypes::HUMAN | LayerTypes::TEXT);
    assert_eq!(c.active_types(), LayerTypes::BACKGROUND | LayerTypes::SPRITE);
    c.add_active_types(LayerTypes::TEXT);
    assert!(c.active_types().contains(LayerTypes::TEXT));
    assert!(!c.active_types().contains(LayerTypes::HUMAN));
    assert_eq!(c.active_sprite_range(), (0, u16::MAX));
}

#[test]
fn hide_removes_from_draw_list() {
    let mut c = comp();
    let r = shown(&mut c, Layer::sprite(0));
    assert!(c.is_visible(r).unwrap());
    c.show(r, false).unwrap();
    assert!(!c.is_visible(r).unwrap());
    assert!(c.draw_list().is_empty());
}

#[test]
fn stale_reference_fails_closed_after_reuse() {
    let mut c = comp();
    let old = shown(&mut c, Layer::sprite(1));
    c.delete_composited(old).unwrap();
    let new = shown(&mut c, Layer::human(7));
    assert_eq!(old.index, new.index);

    assert!(c.layer(old).unwrap_err().is_stale_reference());
    assert!(c.show(old, false).is_err());
    assert!(c.is_shown(old).is_err());
    assert!(c.texture(old).is_err());
    assert!(c.update_composited(old, None, &[0; 16], 8).is_err());
    assert!(c.delete_composited(old).is_err());

    // the new occupant is untouched
    assert_eq!(c.layer(new).unwrap(), Layer::human(7));
    assert!(c.is_shown(new).unwrap());
    assert_eq!(c.live_count(), 1);
}

#[test]
fn deleting_owned_destroys_once_and_borrowed_never() {
    let mut c = comp();
    let tex = c
        .new_image(&TextureDesc::argb(Size::new(1, 1), BlendMode::None))
        .unwrap();
    let borrowed = c.new_composited(tex, Layer::sprite(0), false);
    let owned = shown(&mut c, Layer::sprite(1));

    c.delete_composited(borrowed).unwrap();
    assert_eq!(c.backend().destroyed(), 0);
    assert!(c.backend().contains(tex));

    c.delete_composited(owned).unwrap();
    assert_eq!(c.backend().destroyed(), 1);
    assert!(c.delete_composited(owned).is_err());
    assert_eq!(c.backend().destroyed(), 1);

    c.delete_image(tex);
    assert_eq!(c.backend().destroyed(), 2);
    assert_eq!(c.backend().live(), 0);
}

#[test]
fn freeing_top_slot_shrinks_pool() {
    let mut c = comp();
    let a = shown(&mut c, Layer::sprite(0));
    let b = shown(&mut c, Layer::sprite(1));
    let top = shown(&mut c, Layer::sprite(2));
    c.delete_composited(b).unwrap();
    assert_eq!(c.pool_len(), 3);
    c.delete_composited(top).unwrap();
    assert_eq!(c.pool_len(), 1);
    c.delete_composited(a).unwrap();
    assert_eq!(c.pool_len(), 0);
}

#[test]
fn creation_failure_propagates_without_allocating() {
    let mut c = Compositor::new(MemoryBackend::with_budget(64));
    let err = c
        .new_composited_sized(Size::new(16, 16), Layer::background(0), BlendMode::None, false)
        .unwrap_err();
    assert!(matches!(err, VnError::Backend(BackendError::Create(_))));
    assert_eq!(c.pool_len(), 0);
}

#[test]
fn update_marks_updated_until_cleared() {
    let mut c = comp();
    let r = shown(&mut c, Layer::sprite(0));
    let px: Vec<u32> = vec![0xFF00_00FF; 4];
    assert!(c
        .update_composited(r, None, bytemuck::cast_slice(&px), 8)
        .unwrap());
    assert!(c.is_updated(r).unwrap());
    assert!(c.draw_list()[0].updated);

    let tex = *c.texture(r).unwrap();
    assert_eq!(c.backend().read_surface(tex).unwrap().pixels(), &px[..]);

    c.clear_updated();
    assert!(!c.is_updated(r).unwrap());
}

#[test]
fn failed_update_keeps_content_but_marks_updated() {
    let mut c = comp();
    let src = Surface::filled(2, 2, 0xFF12_3456);
    let r = c
        .new_composited_from(&src, Layer::text(0), BlendMode::Blend)
        .unwrap();

    // region outside the 2x2 texture
    let ok = c
        .update_composited(r, Some(Rect::new(1, 1, 4, 4)), &[0; 64], 16)
        .unwrap();
    assert!(!ok);
    assert!(c.is_updated(r).unwrap());
    let tex = *c.texture(r).unwrap();
    assert_eq!(c.backend().read_surface(tex), Some(src.clone()));

    // a stride that overflows the byte count is refused, not a panic
    c.clear_updated();
    let ok = c
        .update_composited(r, Some(Rect::new(0, 0, 1, 2)), &[0; 64], usize::MAX / 2 + 8)
        .unwrap();
    assert!(!ok);
    assert!(c.is_updated(r).unwrap());
    assert_eq!(c.backend().read_surface(tex), Some(src));
}

#[test]
fn update_from_surface_region() {
    let mut c = comp();
    let r = c
        .new_composited_sized(Size::new(2, 1), Layer::sprite(0), BlendMode::None, false)
        .unwrap();
    let mut src = Surface::new(4, 2);
    src.put(2, 1, 0xAA);
    src.put(3, 1, 0xBB);

    assert!(c
        .update_composited_from(r, &src, Some(Rect::new(2, 1, 2, 1)), None)
        .unwrap());
    let tex = *c.texture(r).unwrap();
    assert_eq!(c.backend().read_surface(tex).unwrap().pixels(), [0xAA, 0xBB]);

    let outside = c.update_composited_from(r, &src, Some(Rect::new(3, 1, 2, 1)), None);
    assert!(matches!(outside, Err(VnError::Buffer(_))));
}

#[test]
fn raw_image_updates() {
    let mut c = comp();
    let tex = c
        .new_image_from(&Surface::filled(2, 1, 1), BlendMode::None)
        .unwrap();
    assert!(c.update_image(&tex, Some(Rect::new(1, 0, 1, 1)), &7u32.to_ne_bytes(), 4));
    assert!(!c.update_image(&tex, Some(Rect::new(2, 0, 1, 1)), &7u32.to_ne_bytes(), 4));
    let src = Surface::filled(1, 1, 9);
    assert!(c.update_image_from(&tex, &src, None, Some(Rect::new(0, 0, 1, 1))).unwrap());
    assert_eq!(c.backend().read_surface(tex).unwrap().pixels(), [9, 7]);
    c.delete_image(tex);
}

#[test]
fn planar_images_are_created_as_yv12() {
    let mut c = comp();
    let r = c
        .new_composited_sized(Size::new(4, 4), Layer::background(0), BlendMode::None, true)
        .unwrap();
    let tex = *c.texture(r).unwrap();
    assert_eq!(c.backend().desc(tex).unwrap().format, PixelFormat::Yv12);
}

#[test]
fn view_opts_seed_the_view() {
    let opts = ViewOpts {
        active_types: vec![LayerType::Human],
        sprite_range: (1, 2),
        human_order: vec![4],
    };
    let c = Compositor::with_view_opts(MemoryBackend::new(), &opts);
    assert_eq!(c.active_types(), LayerTypes::HUMAN);
    assert_eq!(c.active_sprite_range(), (1, 2));
    assert_eq!(c.human_order(), [4]);
}
