use super::*;

#[test]
fn clock_formats_minutes_and_seconds() {
    assert_eq!(format_clock(0.0), "00:00");
    assert_eq!(format_clock(7.9), "00:07");
    assert_eq!(format_clock(65.0), "01:05");
    assert_eq!(format_clock(600.4), "10:00");
}

#[test]
fn clock_treats_invalid_input_as_zero() {
    assert_eq!(format_clock(-3.0), "00:00");
    assert_eq!(format_clock(f64::NAN), "00:00");
}

#[test]
fn hex_colors_unpack_channels() {
    let c = Rgba8::hex(0xf43f5e);
    assert_eq!((c.r, c.g, c.b, c.a), (0xf4, 0x3f, 0x5e, 255));
    assert_eq!(c.with_alpha(77).a, 77);
}

#[test]
fn ids_serialize_as_plain_strings() {
    let id = SceneId::new("scene-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"scene-1\"");
    let back: ImageId = serde_json::from_str("\"img\"").unwrap();
    assert_eq!(back.as_str(), "img");
}
