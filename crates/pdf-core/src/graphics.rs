//! Vector graphics operators
//!
//! All coordinates here are PDF user space (origin bottom-left). The
//! document converts from top-origin coordinates before calling in.

use crate::document::Color;
use lopdf::{dictionary, Dictionary, Object};

/// Bezier control distance for approximating a quarter circle
const KAPPA: f64 = 0.552_284_75;

/// Format a number for a content stream: at most 3 decimals, no trailing zeros
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn fill_color(color: Color) -> String {
    format!(
        "{} {} {} rg",
        fmt_num(color.r as f64),
        fmt_num(color.g as f64),
        fmt_num(color.b as f64)
    )
}

fn stroke_color(color: Color) -> String {
    format!(
        "{} {} {} RG",
        fmt_num(color.r as f64),
        fmt_num(color.g as f64),
        fmt_num(color.b as f64)
    )
}

/// Filled rectangle; `y` is the bottom edge
pub fn fill_rect_operators(x: f64, y: f64, width: f64, height: f64, color: Color) -> Vec<u8> {
    format!(
        "q\n{}\n{} {} {} {} re\nf\nQ\n",
        fill_color(color),
        fmt_num(x),
        fmt_num(y),
        fmt_num(width),
        fmt_num(height)
    )
    .into_bytes()
}

/// Stroked rectangle outline; `y` is the bottom edge
pub fn stroke_rect_operators(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: Color,
    line_width: f64,
) -> Vec<u8> {
    format!(
        "q\n{}\n{} w\n{} {} {} {} re\nS\nQ\n",
        stroke_color(color),
        fmt_num(line_width),
        fmt_num(x),
        fmt_num(y),
        fmt_num(width),
        fmt_num(height)
    )
    .into_bytes()
}

/// Straight line segment
pub fn line_operators(
    from: (f64, f64),
    to: (f64, f64),
    color: Color,
    line_width: f64,
) -> Vec<u8> {
    format!(
        "q\n{}\n{} w\n{} {} m\n{} {} l\nS\nQ\n",
        stroke_color(color),
        fmt_num(line_width),
        fmt_num(from.0),
        fmt_num(from.1),
        fmt_num(to.0),
        fmt_num(to.1)
    )
    .into_bytes()
}

/// Filled circle built from four Bezier curves
pub fn circle_operators(cx: f64, cy: f64, radius: f64, color: Color) -> Vec<u8> {
    let k = radius * KAPPA;
    let p = |x: f64, y: f64| format!("{} {}", fmt_num(x), fmt_num(y));

    let mut ops = format!("q\n{}\n", fill_color(color));
    ops.push_str(&format!("{} m\n", p(cx + radius, cy)));
    ops.push_str(&format!(
        "{} {} {} c\n",
        p(cx + radius, cy + k),
        p(cx + k, cy + radius),
        p(cx, cy + radius)
    ));
    ops.push_str(&format!(
        "{} {} {} c\n",
        p(cx - k, cy + radius),
        p(cx - radius, cy + k),
        p(cx - radius, cy)
    ));
    ops.push_str(&format!(
        "{} {} {} c\n",
        p(cx - radius, cy - k),
        p(cx - k, cy - radius),
        p(cx, cy - radius)
    ));
    ops.push_str(&format!(
        "{} {} {} c\n",
        p(cx + k, cy - radius),
        p(cx + radius, cy - k),
        p(cx + radius, cy)
    ));
    ops.push_str("f\nQ\n");
    ops.into_bytes()
}

/// Paint a shading clipped to a rectangle; `y` is the bottom edge
pub fn shading_operators(shading_name: &str, x: f64, y: f64, width: f64, height: f64) -> Vec<u8> {
    format!(
        "q\n{} {} {} {} re\nW\nn\n/{shading_name} sh\nQ\n",
        fmt_num(x),
        fmt_num(y),
        fmt_num(width),
        fmt_num(height)
    )
    .into_bytes()
}

/// Axial (type 2) shading running left to right between two colors
pub fn axial_shading(x0: f64, y: f64, x1: f64, from: Color, to: Color) -> Dictionary {
    let rgb = |c: Color| -> Object {
        Object::Array(vec![
            Object::Real(c.r),
            Object::Real(c.g),
            Object::Real(c.b),
        ])
    };

    dictionary! {
        "ShadingType" => 2,
        "ColorSpace" => "DeviceRGB",
        "Coords" => vec![
            Object::Real(x0 as f32),
            Object::Real(y as f32),
            Object::Real(x1 as f32),
            Object::Real(y as f32),
        ],
        "Function" => dictionary! {
            "FunctionType" => 2,
            "Domain" => vec![Object::Integer(0), Object::Integer(1)],
            "C0" => rgb(from),
            "C1" => rgb(to),
            "N" => 1,
        },
        "Extend" => vec![Object::Boolean(true), Object::Boolean(true)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ops_str(ops: Vec<u8>) -> String {
        String::from_utf8(ops).unwrap()
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(100.0), "100");
        assert_eq!(fmt_num(841.89), "841.89");
        assert_eq!(fmt_num(0.123456), "0.123");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(-12.5), "-12.5");
    }

    #[test]
    fn test_fill_rect_operators() {
        let ops = ops_str(fill_rect_operators(40.0, 700.0, 512.0, 25.0, Color::white()));
        assert!(ops.contains("1 1 1 rg"));
        assert!(ops.contains("40 700 512 25 re"));
        assert!(ops.contains("\nf\n"));
        assert!(ops.starts_with("q\n"));
        assert!(ops.ends_with("Q\n"));
    }

    #[test]
    fn test_stroke_rect_operators() {
        let ops = ops_str(stroke_rect_operators(10.0, 20.0, 30.0, 40.0, Color::black(), 1.5));
        assert!(ops.contains("0 0 0 RG"));
        assert!(ops.contains("1.5 w"));
        assert!(ops.contains("10 20 30 40 re\nS"));
    }

    #[test]
    fn test_line_operators() {
        let ops = ops_str(line_operators((40.0, 40.0), (555.28, 40.0), Color::black(), 1.0));
        assert!(ops.contains("40 40 m\n555.28 40 l\nS"));
    }

    #[test]
    fn test_circle_operators_close_on_start_point() {
        let ops = ops_str(circle_operators(50.0, 50.0, 2.0, Color::black()));
        assert!(ops.contains("52 50 m"));
        assert_eq!(ops.matches(" c\n").count(), 4);
        assert!(ops.contains("52 50 c\nf"));
    }

    #[test]
    fn test_shading_operators_clip_first() {
        let ops = ops_str(shading_operators("Sh1", 40.0, 748.89, 515.28, 3.0));
        assert!(ops.contains("40 748.89 515.28 3 re\nW\nn\n/Sh1 sh"));
    }

    #[test]
    fn test_axial_shading_dictionary() {
        let shading = axial_shading(40.0, 750.0, 555.0, Color::black(), Color::white());
        assert_eq!(shading.get(b"ShadingType").unwrap().as_i64().unwrap(), 2);
        let coords = shading.get(b"Coords").unwrap().as_array().unwrap();
        assert_eq!(coords.len(), 4);
        let function = shading.get(b"Function").unwrap().as_dict().unwrap();
        assert_eq!(function.get(b"FunctionType").unwrap().as_i64().unwrap(), 2);
    }
}
