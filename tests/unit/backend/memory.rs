use super::*;

fn desc(w: u32, h: u32) -> TextureDesc {
    TextureDesc::argb(Size::new(w, h), BlendMode::Blend)
}

#[test]
fn create_and_destroy_are_counted() {
    let mut be = MemoryBackend::new();
    let a = be.create_texture(&desc(4, 4)).unwrap();
    let b = be.create_texture(&desc(2, 2)).unwrap();
    assert_ne!(a, b);
    assert_eq!(be.live(), 2);
    assert_eq!(be.used_bytes(), 4 * 4 * 4 + 2 * 2 * 4);

    be.destroy_texture(a);
    assert_eq!(be.destroyed(), 1);
    assert_eq!(be.live(), 1);
    assert!(!be.contains(a));
    assert!(be.contains(b));
    assert_eq!(be.used_bytes(), 16);
}

#[test]
fn ids_are_never_reused() {
    let mut be = MemoryBackend::new();
    let a = be.create_texture(&desc(1, 1)).unwrap();
    be.destroy_texture(a);
    let b = be.create_texture(&desc(1, 1)).unwrap();
    assert!(b.get() > a.get());
}

#[test]
fn double_destroy_is_not_counted_twice() {
    let mut be = MemoryBackend::new();
    let a = be.create_texture(&desc(1, 1)).unwrap();
    be.destroy_texture(a);
    be.destroy_texture(a);
    assert_eq!(be.destroyed(), 1);
}

#[test]
fn budget_rejects_creation() {
    let mut be = MemoryBackend::with_budget(100);
    let a = be.create_texture(&desc(4, 4)).unwrap();
    let err = be.create_texture(&desc(4, 4)).unwrap_err();
    assert!(matches!(err, BackendError::Create(_)));
    assert!(be.create_texture(&desc(100, 100)).is_err());

    be.destroy_texture(a);
    assert!(be.create_texture(&desc(4, 4)).is_ok());
}

#[test]
fn surface_textures_copy_pixels() {
    let mut be = MemoryBackend::new();
    let mut s = Surface::new(3, 2);
    s.put(2, 1, 0xFF11_2233);
    let t = be.create_texture_from_surface(&s, BlendMode::None).unwrap();
    assert_eq!(be.read_surface(t), Some(s));
    assert_eq!(be.desc(t).map(|d| d.blend), Some(BlendMode::None));
}

#[test]
fn partial_update_honours_stride() {
    let mut be = MemoryBackend::new();
    let t = be.create_texture(&desc(4, 3)).unwrap();

    // a 2x2 patch read out of a wider 3-pixel source row
    let src: Vec<u32> = vec![1, 2, 99, 3, 4, 99];
    let bytes: &[u8] = bytemuck::cast_slice(&src);
    be.update_texture(&t, Some(Rect::new(1, 1, 2, 2)), bytes, 12)
        .unwrap();

    let out = be.read_surface(t).unwrap();
    assert_eq!(out.row(0), [0, 0, 0, 0]);
    assert_eq!(out.row(1), [0, 1, 2, 0]);
    assert_eq!(out.row(2), [0, 3, 4, 0]);
}

#[test]
fn bad_updates_fail_and_leave_content() {
    let mut be = MemoryBackend::new();
    let s = Surface::filled(2, 2, 7);
    let t = be.create_texture_from_surface(&s, BlendMode::None).unwrap();

    let outside = be.update_texture(&t, Some(Rect::new(1, 1, 2, 2)), &[0; 64], 8);
    assert!(matches!(outside, Err(BackendError::Update(_))));
    let short = be.update_texture(&t, None, &[0; 12], 8);
    assert!(short.is_err());
    let narrow_stride = be.update_texture(&t, None, &[0; 64], 4);
    assert!(narrow_stride.is_err());

    assert_eq!(be.read_surface(t), Some(s));
}

#[test]
fn updating_unknown_texture_fails() {
    let mut be = MemoryBackend::new();
    let t = be.create_texture(&desc(1, 1)).unwrap();
    be.destroy_texture(t);
    assert!(be.update_texture(&t, None, &[0; 4], 4).is_err());
}

#[test]
fn planar_textures_take_whole_updates_only() {
    let mut be = MemoryBackend::new();
    let d = TextureDesc {
        size: Size::new(4, 2),
        format: PixelFormat::Yv12,
        blend: BlendMode::None,
    };
    let t = be.create_texture(&d).unwrap();
    assert_eq!(be.bytes(t).map(<[u8]>::len), Some(8 + 2 + 2));

    let data: Vec<u8> = (0..12).collect();
    be.update_texture(&t, None, &data, 4).unwrap();
    assert_eq!(be.bytes(t), Some(&data[..]));
    assert!(be.update_texture(&t, Some(Rect::new(0, 0, 2, 2)), &data, 4).is_err());
    assert_eq!(be.read_surface(t), None);
}

#[test]
fn overflowing_stride_is_an_update_error() {
    let mut be = MemoryBackend::new();
    let t = be.create_texture(&desc(2, 4)).unwrap();
    let before = be.bytes(t).map(<[u8]>::to_vec);

    let err = be
        .update_texture(&t, Some(Rect::new(0, 0, 1, 3)), &[0xAB; 64], usize::MAX / 2 + 8)
        .unwrap_err();
    assert!(matches!(err, BackendError::Update(_)));
    assert_eq!(be.bytes(t).map(<[u8]>::to_vec), before);

    // a single row never multiplies the stride
    be.update_texture(&t, Some(Rect::new(0, 0, 1, 1)), &[0xAB; 4], usize::MAX)
        .unwrap();
    assert_eq!(be.bytes(t).map(|b| b[..4].to_vec()), Some(vec![0xAB; 4]));
}
