use super::*;

#[test]
fn only_opaque_white_selects_opaque_logo() {
    for hex in ["#ffffff", "#ffffffff", "#fff"] {
        let c = Rgba8::parse_hex(hex).unwrap();
        assert_eq!(LogoVariant::for_background(c), LogoVariant::Opaque, "{hex}");
    }
    for hex in ["#fff0", "#ffffff80", "#f0f0f0", "#000000"] {
        let c = Rgba8::parse_hex(hex).unwrap();
        assert_eq!(
            LogoVariant::for_background(c),
            LogoVariant::Transparent,
            "{hex}"
        );
    }
}

#[test]
fn sources_map_variants_to_urls() {
    let sources = LogoSources::default();
    assert_eq!(sources.url_for(LogoVariant::Opaque), "logo.jpg");
    assert_eq!(
        sources.url_for_background(Rgba8::new(255, 255, 255, 0)),
        "logo.png"
    );
}
