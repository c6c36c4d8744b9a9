use super::*;

#[test]
fn every_viseme_maps_to_a_sprite() {
    assert_eq!(MouthSprite::for_viseme(Viseme::A), MouthSprite::Closed);
    assert_eq!(MouthSprite::for_viseme(Viseme::X), MouthSprite::SILENCE);
    assert_eq!(MouthSprite::for_viseme(Viseme::D), MouthSprite::Wide);
    assert_eq!(MouthSprite::for_viseme(Viseme::H), MouthSprite::Wide);
    assert_eq!(MouthSprite::for_viseme(Viseme::B), MouthSprite::Small);
    assert_eq!(MouthSprite::for_viseme(Viseme::C), MouthSprite::Medium);
    assert_eq!(MouthSprite::for_viseme(Viseme::E), MouthSprite::Round);
    assert_eq!(MouthSprite::for_viseme(Viseme::F), MouthSprite::Teeth);
    assert_eq!(MouthSprite::for_viseme(Viseme::G), MouthSprite::Special);
    assert_eq!(MouthSprite::for_value(EventValue::Energy(0.0)), MouthSprite::Closed);
    assert_eq!(MouthSprite::for_value(EventValue::Energy(0.9)), MouthSprite::Wide);
}

#[test]
fn placeholder_has_transparent_border_and_colored_bar() {
    let img = placeholder(MouthSprite::Medium);
    assert_eq!(img.dimensions(), (60, 40));
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(img.get_pixel(9, 20).0[3], 0);
    assert_eq!(img.get_pixel(10, 15).0, [0, 0, 255, 128]);
    assert_eq!(img.get_pixel(50, 25).0, [0, 0, 255, 128]);
    assert_eq!(img.get_pixel(51, 25).0[3], 0);
}

#[test]
fn catalog_loads_files_and_falls_back_per_sprite() {
    let dir = tempfile::tempdir().unwrap();
    let wide = RgbaImage::from_pixel(8, 4, Rgba([9, 9, 9, 255]));
    wide.save(dir.path().join("southparkWide(A_AH).png"))
        .unwrap();
    std::fs::write(dir.path().join("southparkRound(O_OO).png"), b"broken").unwrap();

    let catalog = SpriteCatalog::load(Some(dir.path()));
    assert_eq!(catalog.get(MouthSprite::Wide), &wide);
    assert_eq!(catalog.get(MouthSprite::Round), &placeholder(MouthSprite::Round));
    assert_eq!(catalog.get(MouthSprite::Closed), &placeholder(MouthSprite::Closed));
}
