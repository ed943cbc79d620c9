//! SVG output for a list of draw instructions.

use std::fmt::Write;

use crate::draw::DrawInstruction;

/// SVG user units per inch.
pub const PX_PER_INCH: f64 = 96.0;

const LABEL_FONT_SIZE: u32 = 15;
const CAPTION_FONT_SIZE: u32 = 30;
const LINE_HEIGHT: f64 = 1.3;
/// Room left around the drawing, in inches.
const CANVAS_PADDING: f64 = 3.0;

fn px(inches: f64) -> f64 {
    (inches * PX_PER_INCH * 100.0).round() / 100.0
}

pub fn render_svg(instructions: &[DrawInstruction]) -> String {
    let (max_x, max_y) = instructions
        .iter()
        .map(DrawInstruction::extent)
        .fold((0.0_f64, 0.0_f64), |(w, h), (x, y)| (w.max(x), h.max(y)));
    let width = px(max_x + CANVAS_PADDING);
    let height = px(max_y + CANVAS_PADDING);

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );

    for instruction in instructions {
        match instruction {
            DrawInstruction::StockOutline {
                x,
                y,
                width,
                height,
            } => {
                let _ = writeln!(
                    out,
                    r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#eee" stroke="#ff0" stroke-width="1"/>"##,
                    px(*x),
                    px(*y),
                    px(*width),
                    px(*height)
                );
            }
            DrawInstruction::WasteRect {
                x,
                y,
                width,
                height,
            } => {
                let _ = writeln!(
                    out,
                    r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#f00" stroke-width="0"/>"##,
                    px(*x),
                    px(*y),
                    px(*width),
                    px(*height)
                );
            }
            DrawInstruction::CutLine { x1, y1, x2, y2 } => {
                write_line(&mut out, (*x1, *y1, *x2, *y2), "#f0f");
            }
            DrawInstruction::DividerLine { x1, y1, x2, y2 } => {
                write_line(&mut out, (*x1, *y1, *x2, *y2), "#000");
            }
            DrawInstruction::BoardLabel {
                text,
                x,
                y,
                width,
                height,
            } => {
                write_text(
                    &mut out,
                    text,
                    LABEL_FONT_SIZE,
                    x + width / 2.0,
                    y + height / 2.0,
                    true,
                );
            }
            DrawInstruction::MarginLabel { text, x, y } => {
                write_text(&mut out, text, LABEL_FONT_SIZE, *x, *y, false);
            }
            DrawInstruction::StockCaption { text, x, y } => {
                write_text(&mut out, text, CAPTION_FONT_SIZE, *x, *y, false);
            }
        }
    }

    out.push_str("</svg>\n");
    out
}

fn write_line(out: &mut String, (x1, y1, x2, y2): (f64, f64, f64, f64), color: &str) {
    let _ = writeln!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="1"/>"#,
        px(x1),
        px(y1),
        px(x2),
        px(y2)
    );
}

/// Centred text; multi-line text is stacked with one `tspan` per line.
fn write_text(out: &mut String, text: &str, size: u32, x: f64, y: f64, rotate: bool) {
    let (cx, cy) = (px(x), px(y));
    let transform = if rotate {
        format!(r#" transform="rotate(90 {cx} {cy})""#)
    } else {
        String::new()
    };
    let lines: Vec<&str> = text.lines().collect();
    // Shift up so the block of lines is centred on (x, y).
    let first_dy = match lines.len() {
        0 | 1 => 0.0,
        n => -((n - 1) as f64) * LINE_HEIGHT / 2.0,
    };

    let _ = write!(
        out,
        r##"<text x="{cx}" y="{cy}" font-family="osifont" font-size="{size}" fill="#888" text-anchor="middle" dominant-baseline="middle"{transform}>"##
    );
    for (i, line) in lines.iter().enumerate() {
        let dy = if i == 0 { first_dy } else { LINE_HEIGHT };
        let _ = write!(
            out,
            r#"<tspan x="{cx}" dy="{dy}em">{}</tspan>"#,
            escape(line)
        );
    }
    out.push_str("</text>\n");
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<DrawInstruction> {
        vec![
            DrawInstruction::StockOutline {
                x: 3.0,
                y: 3.0,
                width: 48.75,
                height: 96.75,
            },
            DrawInstruction::CutLine {
                x1: 13.125,
                y1: 3.0,
                x2: 13.125,
                y2: 99.75,
            },
            DrawInstruction::WasteRect {
                x: 13.125,
                y: 3.0,
                width: 38.625,
                height: 96.75,
            },
            DrawInstruction::BoardLabel {
                text: "Side & back\n20.125 x 10.125\"".into(),
                x: 3.0,
                y: 3.0,
                width: 10.125,
                height: 20.125,
            },
        ]
    }

    #[test]
    fn test_document_shape() {
        let svg = render_svg(&sample());
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect ").count(), 2);
        assert_eq!(svg.matches("<line ").count(), 1);
        assert_eq!(svg.matches("<tspan ").count(), 2);
    }

    #[test]
    fn test_units_are_pixels() {
        let svg = render_svg(&sample());
        assert!(svg.contains(r#"<line x1="1260" y1="288" x2="1260" y2="9576""#));
        // Canvas covers the stock outline plus padding: (51.75 + 3) * 96.
        assert!(svg.contains(r#"width="5256""#));
    }

    #[test]
    fn test_label_escaped_and_rotated() {
        let svg = render_svg(&sample());
        assert!(svg.contains("Side &amp; back"));
        assert!(svg.contains("20.125 x 10.125&quot;"));
        assert!(svg.contains("rotate(90 774 1254)"));
    }

    #[test]
    fn test_empty_canvas() {
        let svg = render_svg(&[]);
        assert!(svg.contains(r#"width="288""#));
        assert!(!svg.contains("<rect"));
    }
}
