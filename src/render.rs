use crate::draw::DrawInstruction;

const MAX_WIDTH: f64 = 120.0;
const MAX_HEIGHT: f64 = 60.0;

/// Plots the instructions onto a character grid for a quick terminal preview.
pub fn render_preview(instructions: &[DrawInstruction]) -> String {
    let (max_x, max_y) = instructions
        .iter()
        .map(DrawInstruction::extent)
        .fold((0.0_f64, 0.0_f64), |(w, h), (x, y)| (w.max(x), h.max(y)));
    if max_x <= 0.0 || max_y <= 0.0 {
        return String::new();
    }

    let scale = f64::min(MAX_WIDTH / max_x, MAX_HEIGHT / max_y);
    let grid_w = (max_x * scale).round() as usize;
    let grid_h = (max_y * scale).round() as usize;
    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let cell = |v: f64| (v * scale).round().max(0.0) as usize;
    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    // Outlines and cuts first so waste fill and labels never hide an edge.
    for instruction in instructions {
        match instruction {
            DrawInstruction::StockOutline {
                x,
                y,
                width,
                height,
            } => {
                let (sx, sy) = (cell(*x), cell(*y));
                draw_rect(&mut grid, sx, sy, cell(x + width) - sx, cell(y + height) - sy);
            }
            DrawInstruction::CutLine { x1, y1, x2, y2 }
            | DrawInstruction::DividerLine { x1, y1, x2, y2 } => {
                draw_line(&mut grid, (cell(*x1), cell(*y1)), (cell(*x2), cell(*y2)));
            }
            _ => {}
        }
    }

    for instruction in instructions {
        match instruction {
            DrawInstruction::WasteRect {
                x,
                y,
                width,
                height,
            } => {
                fill_rect(&mut grid, cell(*x), cell(*y), cell(x + width), cell(y + height));
            }
            DrawInstruction::BoardLabel {
                text,
                x,
                y,
                width,
                height,
            } => {
                let label = text.lines().next().unwrap_or_default();
                let (sx, sy) = (cell(*x), cell(*y));
                put_label(&mut grid, label, sx, sy, cell(x + width), cell(y + height));
            }
            _ => {}
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

fn put(grid: &mut [Vec<char>], x: usize, y: usize, ch: char) {
    if let Some(c) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
        *c = match (*c, ch) {
            ('|', '-') | ('-', '|') | ('+', _) => '+',
            _ => ch,
        };
    }
}

fn draw_line(grid: &mut [Vec<char>], (x1, y1): (usize, usize), (x2, y2): (usize, usize)) {
    if y1 == y2 {
        for x in x1.min(x2)..=x1.max(x2) {
            put(grid, x, y1, '-');
        }
    } else {
        for y in y1.min(y2)..=y1.max(y2) {
            put(grid, x1, y, '|');
        }
    }
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    draw_line(grid, (x, y), (x + w, y));
    draw_line(grid, (x, y + h), (x + w, y + h));
    draw_line(grid, (x, y), (x, y + h));
    draw_line(grid, (x + w, y), (x + w, y + h));

    for cx in [x, x + w] {
        for cy in [y, y + h] {
            if let Some(c) = grid.get_mut(cy).and_then(|row| row.get_mut(cx)) {
                *c = '+';
            }
        }
    }
}

/// Marks the interior of a waste region; edges stay as drawn.
fn fill_rect(grid: &mut [Vec<char>], x1: usize, y1: usize, x2: usize, y2: usize) {
    for y in (y1 + 1)..y2 {
        for x in (x1 + 1)..x2 {
            if let Some(c) = grid.get_mut(y).and_then(|row| row.get_mut(x))
                && *c == ' '
            {
                *c = '.';
            }
        }
    }
}

fn put_label(grid: &mut [Vec<char>], label: &str, x1: usize, y1: usize, x2: usize, y2: usize) {
    if x2 <= x1 + 2 || y2 <= y1 + 1 {
        return;
    }
    let chars: Vec<char> = label.chars().collect();
    let cx = (x1 + x2) / 2;
    let cy = (y1 + y2) / 2;
    let start_x = cx.saturating_sub(chars.len() / 2);

    for (i, &ch) in chars.iter().enumerate() {
        let x = start_x + i;
        if x > x1
            && x < x2
            && cy > y1
            && cy < y2
            && let Some(c) = grid.get_mut(cy).and_then(|row| row.get_mut(x))
        {
            *c = ch;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline() -> DrawInstruction {
        DrawInstruction::StockOutline {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
        }
    }

    #[test]
    fn test_preview_outline() {
        let output = render_preview(&[outline()]);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
    }

    #[test]
    fn test_preview_cut_and_waste() {
        let output = render_preview(&[
            outline(),
            DrawInstruction::CutLine {
                x1: 50.0,
                y1: 0.0,
                x2: 50.0,
                y2: 50.0,
            },
            DrawInstruction::WasteRect {
                x: 50.0,
                y: 0.0,
                width: 50.0,
                height: 50.0,
            },
        ]);
        assert!(output.contains('.'));
        // The cut meets the outline in a corner on the top edge.
        let top = output.lines().next().unwrap();
        assert_eq!(top.matches('+').count(), 3);
    }

    #[test]
    fn test_preview_label() {
        let output = render_preview(&[
            outline(),
            DrawInstruction::BoardLabel {
                text: "Side\n20 x 10\"".into(),
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 50.0,
            },
        ]);
        assert!(output.contains("Side"));
        assert!(!output.contains("20 x 10"));
    }

    #[test]
    fn test_preview_empty() {
        assert_eq!(render_preview(&[]), "");
    }
}
