use chrono::NaiveDate;

use super::*;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn style_defaults_match_first_run_form() {
    let style = StyleRecord::default();
    assert_eq!(style.header, DEFAULT_HEADER);
    assert_eq!(style.background, Rgba8::new(255, 255, 255, 0));
    assert_eq!(style.logo_offset(), (0, 0));
    assert_eq!(style.flags, StyleFlags::from([StyleFlag::NoComma]));
}

#[test]
fn flags_are_a_set() {
    let a = StyleFlags::from([StyleFlag::NoDate, StyleFlag::NoLogo, StyleFlag::NoDate]);
    let b = StyleFlags::from([StyleFlag::NoLogo, StyleFlag::NoDate]);
    assert_eq!(a, b);
    assert_eq!(a.len(), 2);

    let parsed: StyleFlags =
        serde_json::from_str(r#"["noDate","noLogo","noDate"]"#).unwrap();
    assert_eq!(parsed, b);
}

#[test]
fn toggle_flips_membership() {
    let mut flags = StyleFlags::new();
    assert!(flags.toggle(StyleFlag::WithSign));
    assert!(flags.contains(StyleFlag::WithSign));
    assert!(!flags.toggle(StyleFlag::WithSign));
    assert!(flags.is_empty());
}

#[test]
fn no_sign_is_outside_active_vocabulary() {
    assert!(!StyleFlag::NoSign.is_active());
    assert!(!StyleFlag::ACTIVE.contains(&StyleFlag::NoSign));
    for f in StyleFlag::ACTIVE {
        assert!(f.is_active());
        assert_eq!(f.as_str().parse::<StyleFlag>().unwrap(), f);
    }
    assert!("noSeal".parse::<StyleFlag>().is_err());
}

#[test]
fn logo_offset_is_clamped() {
    let mut style = StyleRecord::default();
    style.set_logo_offset(40, -99);
    assert_eq!((style.logo_offset_x, style.logo_offset_y), (15, -15));

    style.logo_offset_x = 5;
    style.logo_offset_y = -5;
    assert_eq!(style.logo_offset(), (5, -5));

    style.logo_offset_x = -16;
    assert_eq!(style.logo_offset().0, -15);
}

#[test]
fn content_accepts_numeric_class_and_null_dates() {
    let json = r#"{"name":"张三","cls":2,"dormitory":"M202","leaveDate":null}"#;
    let c: ContentRecord = serde_json::from_str(json).unwrap();
    assert_eq!(c.name, "张三");
    assert_eq!(c.class_id, "2");
    assert_eq!(c.dormitory, "M202");
    assert_eq!(c.leave_date, None);
    assert_eq!(c.back_date, None);
}

#[test]
fn content_round_trips_through_json() {
    let c = ContentRecord {
        leave_date: Some(at(2024, 5, 1, 8, 30)),
        ..ContentRecord::default()
    };
    let json = serde_json::to_string(&c).unwrap();
    assert!(json.contains("\"cls\":\"1\""));
    let back: ContentRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}

#[test]
fn style_reads_persisted_field_names() {
    let json = r##"{"header":"同意","bgColor":"#ffffff","offsetX":3,"offsetY":-2,"extra":["noSign","noComma"]}"##;
    let s: StyleRecord = serde_json::from_str(json).unwrap();
    assert_eq!(s.header, "同意");
    assert_eq!(s.background, Rgba8::WHITE);
    assert_eq!(s.logo_offset(), (3, -2));
    assert!(s.has(StyleFlag::NoSign));
    assert!(s.has(StyleFlag::NoComma));
}

#[test]
fn missing_style_fields_take_defaults() {
    let s: StyleRecord = serde_json::from_str(r#"{"header":"x"}"#).unwrap();
    assert_eq!(s.header, "x");
    assert_eq!(s.flags, StyleRecord::default().flags);
}

#[test]
fn parse_timestamp_accepts_naive_forms() {
    assert_eq!(parse_timestamp("2024-05-01 08:30").unwrap(), at(2024, 5, 1, 8, 30));
    assert_eq!(
        parse_timestamp("2024-05-01T08:30:00").unwrap(),
        at(2024, 5, 1, 8, 30)
    );
    assert!(parse_timestamp("tomorrow").is_err());
}

#[test]
fn unknown_flag_names_are_skipped_not_fatal() {
    let style: StyleRecord = serde_json::from_str(
        r##"{"header":"同意","bgColor":"#123456","offsetX":4,"extra":["noDate","sparkles",7,"noLogo"]}"##,
    )
    .unwrap();
    assert_eq!(style.header, "同意");
    assert_eq!(style.background, Rgba8::new(0x12, 0x34, 0x56, 255));
    assert_eq!(style.logo_offset_x, 4);
    assert_eq!(
        style.flags,
        StyleFlags::from([StyleFlag::NoDate, StyleFlag::NoLogo])
    );
}
