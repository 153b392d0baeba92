use chrono::NaiveDate;

use super::*;

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(8, 3, 9)
        .unwrap()
}

fn solid(premul: [u8; 4], width: u32, height: u32) -> Bitmap {
    Bitmap {
        width,
        height,
        data: premul.repeat((width * height) as usize),
    }
}

#[test]
fn file_name_convention() {
    assert_eq!(
        export_file_name("李华", at(), ExportFormat::Png),
        "qzes_李华_20240501080309.png"
    );
    assert_eq!(
        export_file_name("a/b", at(), ExportFormat::Jpeg),
        "qzes_a_b_20240501080309.jpg"
    );
    assert_eq!(
        export_file_name("", at(), ExportFormat::Png),
        "qzes__20240501080309.png"
    );
}

#[test]
fn format_parses_common_spellings() {
    assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
    assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
    assert_eq!("jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
    assert!("gif".parse::<ExportFormat>().is_err());
}

#[test]
fn png_keeps_straight_alpha() {
    let bytes = encode_bitmap(&solid([128, 0, 0, 128], 3, 2), ExportFormat::Png).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    let px = img.get_pixel(1, 1).0;
    assert!(px[0].abs_diff(255) <= 1);
    assert_eq!(px[3], 128);
}

#[test]
fn jpeg_flattens_transparency_to_white() {
    let bytes = encode_bitmap(&solid([0, 0, 0, 0], 8, 8), ExportFormat::Jpeg).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (8, 8));
    let px = img.get_pixel(4, 4).0;
    assert!(px.iter().all(|&c| c >= 250), "{px:?}");
}

#[test]
fn write_bitmap_creates_directory() {
    let dir = std::env::temp_dir()
        .join(format!("qzes_export_{}", std::process::id()))
        .join("nested");
    let path = write_bitmap(
        &solid([0, 0, 0, 255], 2, 2),
        &dir,
        "张三",
        at(),
        ExportFormat::Png,
    )
    .unwrap();
    assert!(path.ends_with("qzes_张三_20240501080309.png"));
    assert!(path.exists());
    std::fs::remove_dir_all(dir.parent().unwrap()).ok();
}

#[test]
fn mismatched_bitmap_is_an_export_error() {
    let bad = Bitmap {
        width: 4,
        height: 4,
        data: vec![0; 3],
    };
    assert!(matches!(
        encode_bitmap(&bad, ExportFormat::Png),
        Err(NoteError::Export(_))
    ));
}
