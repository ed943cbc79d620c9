use crate::config::Padding;
use crate::error::{LayoutError, Result};
use crate::types::{BoardRequest, BoardRow, NumericField, StockRow, StockSheet};

/// Gap between neighbouring sheets in the diagram, in inches.
pub const STOCK_SPACING: f64 = 3.0;

/// Converts raw stock rows into usable sheets laid out left to right.
pub fn normalize_stock(rows: &[StockRow], padding: &Padding) -> Result<Vec<StockSheet>> {
    check_padding(padding)?;
    let mut sheets = Vec::with_capacity(rows.len());
    let mut current_x = 0.0;

    for (id, row) in rows.iter().enumerate() {
        let nominal_width = row.width.parse_positive(&format!("stock {id} width"))?;
        let nominal_height = row.height.parse_positive(&format!("stock {id} height"))?;
        let top_margin = parse_margin(row.top_margin.as_ref(), &format!("stock {id} top_margin"))?;
        let bottom_margin =
            parse_margin(row.bottom_margin.as_ref(), &format!("stock {id} bottom_margin"))?;

        let width = nominal_width - 2.0 * padding.stock_waste;
        let height = nominal_height - 2.0 * padding.stock_waste - top_margin - bottom_margin;
        if width <= 0.0 {
            return Err(LayoutError::invalid_dimension(
                format!("stock {id} usable width"),
                width.to_string(),
            ));
        }
        if height <= 0.0 {
            return Err(LayoutError::invalid_dimension(
                format!("stock {id} usable height"),
                height.to_string(),
            ));
        }

        let x = current_x + STOCK_SPACING;
        current_x = x + width;

        sheets.push(StockSheet {
            id,
            title: row.title.clone().filter(|t| !t.trim().is_empty()),
            width,
            height,
            top_margin,
            bottom_margin,
            x,
            y: STOCK_SPACING,
            nominal_width,
            nominal_height,
        });
    }

    Ok(sheets)
}

/// Pads each board by kerf and board waste; grouped boards stack all copies.
pub fn normalize_boards(rows: &[BoardRow], padding: &Padding) -> Result<Vec<BoardRequest>> {
    check_padding(padding)?;
    rows.iter()
        .enumerate()
        .map(|(id, row)| {
            let requested_width = row.width.parse_positive(&format!("board {id} width"))?;
            let requested_height = row.height.parse_positive(&format!("board {id} height"))?;
            let quantity = row.quantity.parse_count(&format!("board {id} quantity"))?;

            let allowance = 2.0 * padding.half_kerf + 2.0 * padding.board_waste;
            let padded_width = requested_width + allowance;
            let single_height = requested_height + allowance;
            let padded_height = if padding.group_multiple_boards {
                single_height * quantity as f64
            } else {
                single_height
            };
            check_padded(padded_width, &format!("board {id} padded width"))?;
            check_padded(padded_height, &format!("board {id} padded height"))?;

            Ok(BoardRequest {
                id,
                title: row.title.clone(),
                requested_width,
                requested_height,
                quantity,
                grouped: padding.group_multiple_boards,
                padded_width,
                padded_height,
                placed: false,
            })
        })
        .collect()
}

pub fn normalize(
    stock: &[StockRow],
    boards: &[BoardRow],
    padding: &Padding,
) -> Result<(Vec<StockSheet>, Vec<BoardRequest>)> {
    Ok((normalize_stock(stock, padding)?, normalize_boards(boards, padding)?))
}

/// Kerf and waste allowances must be finite and non-negative.
fn check_padding(padding: &Padding) -> Result<()> {
    let settings = [
        ("kerf", padding.half_kerf * 2.0),
        ("board_waste", padding.board_waste),
        ("stock_waste", padding.stock_waste),
    ];
    for (field, value) in settings {
        if !value.is_finite() || value < 0.0 {
            return Err(LayoutError::invalid_dimension(field, value.to_string()));
        }
    }
    Ok(())
}

fn check_padded(value: f64, field: &str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::invalid_dimension(field, value.to_string()))
    }
}

fn parse_margin(value: Option<&NumericField>, field: &str) -> Result<f64> {
    let Some(value) = value.filter(|v| !v.as_str().trim().is_empty()) else {
        return Ok(0.0);
    };
    let m = value.parse(field)?;
    if m < 0.0 {
        return Err(LayoutError::invalid_dimension(field, value.as_str()));
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padding(group: bool) -> Padding {
        Padding {
            half_kerf: 0.0625,
            board_waste: 0.125,
            stock_waste: 0.125,
            group_multiple_boards: group,
        }
    }

    fn stock(w: &str, h: &str, top: &str, bottom: &str) -> StockRow {
        StockRow {
            width: w.into(),
            height: h.into(),
            top_margin: Some(top.into()),
            bottom_margin: Some(bottom.into()),
            title: None,
        }
    }

    fn board(w: &str, h: &str, qty: &str) -> BoardRow {
        BoardRow {
            width: w.into(),
            height: h.into(),
            quantity: qty.into(),
            title: "Side".into(),
        }
    }

    #[test]
    fn test_stock_usable_area() {
        let sheets = normalize_stock(&[stock("49", "97", "2", "1")], &padding(false)).unwrap();
        let s = &sheets[0];
        assert_eq!(s.width, 48.75);
        assert_eq!(s.height, 97.0 - 0.25 - 3.0);
        assert_eq!(s.top_margin, 2.0);
        assert_eq!(s.bottom_margin, 1.0);
        assert_eq!(s.outline_height(), 96.75);
    }

    #[test]
    fn test_stock_laid_out_left_to_right() {
        let rows = [stock("49", "97", "0", "0"), stock("25", "49", "0", "0")];
        let sheets = normalize_stock(&rows, &padding(false)).unwrap();
        assert_eq!(sheets[0].x, 3.0);
        assert_eq!(sheets[1].x, 3.0 + 48.75 + 3.0);
        assert!(sheets.iter().all(|s| s.y == STOCK_SPACING));
        assert_eq!(sheets[1].id, 1);
    }

    #[test]
    fn test_missing_margins_default_to_zero() {
        let row = StockRow {
            width: "49".into(),
            height: "97".into(),
            ..Default::default()
        };
        let sheets = normalize_stock(&[row], &padding(false)).unwrap();
        assert_eq!(sheets[0].top_margin, 0.0);
        assert_eq!(sheets[0].height, 96.75);
    }

    #[test]
    fn test_invalid_stock_dimensions() {
        let err = normalize_stock(&[stock("abc", "97", "0", "0")], &padding(false)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidDimension { .. }));
        let err = normalize_stock(&[stock("49", "-1", "0", "0")], &padding(false)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidDimension { .. }));
        // Margins larger than the sheet leave nothing to cut.
        let err = normalize_stock(&[stock("49", "10", "6", "6")], &padding(false)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidDimension { .. }));
        let err = normalize_stock(&[stock("49", "97", "-2", "0")], &padding(false)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidDimension { .. }));
    }

    #[test]
    fn test_board_padding() {
        let boards = normalize_boards(&[board("10", "20", "3")], &padding(false)).unwrap();
        let b = &boards[0];
        assert_eq!(b.padded_width, 10.375);
        assert_eq!(b.padded_height, 20.375);
        assert_eq!(b.effective_quantity(), 3);
        assert!(!b.placed);
    }

    #[test]
    fn test_grouped_board_stacks_copies() {
        let boards = normalize_boards(&[board("10", "20", "3")], &padding(true)).unwrap();
        let b = &boards[0];
        assert!(b.grouped);
        assert_eq!(b.padded_width, 10.375);
        assert_eq!(b.padded_height, 20.375 * 3.0);
        assert_eq!(b.effective_quantity(), 1);
    }

    #[test]
    fn test_invalid_board_rows() {
        assert!(normalize_boards(&[board("0", "20", "1")], &padding(false)).is_err());
        assert!(normalize_boards(&[board("10", "x", "1")], &padding(false)).is_err());
        assert!(normalize_boards(&[board("10", "20", "0")], &padding(false)).is_err());
    }

    #[test]
    fn test_negative_or_nan_settings_rejected() {
        let rows = [board("10", "20", "1")];
        for half_kerf in [f64::NAN, -6.0, f64::INFINITY] {
            let p = Padding {
                half_kerf,
                ..padding(false)
            };
            let err = normalize_boards(&rows, &p).unwrap_err();
            assert!(matches!(err, LayoutError::InvalidDimension { ref field, .. } if field == "kerf"));
        }

        let p = Padding {
            board_waste: -0.5,
            ..padding(false)
        };
        assert!(matches!(
            normalize_boards(&rows, &p).unwrap_err(),
            LayoutError::InvalidDimension { ref field, .. } if field == "board_waste"
        ));

        let p = Padding {
            stock_waste: f64::NAN,
            ..padding(false)
        };
        let err = normalize_stock(&[stock("49", "97", "0", "0")], &p).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidDimension { ref field, .. } if field == "stock_waste"));
    }

    #[test]
    fn test_padded_size_must_stay_positive() {
        assert!(check_padded(10.375, "w").is_ok());
        assert!(check_padded(0.0, "w").is_err());
        assert!(check_padded(-1.75, "w").is_err());
        assert!(check_padded(f64::NAN, "w").is_err());
    }

    #[test]
    fn test_settings_from_config_are_checked_before_rows() {
        let config = crate::config::LayoutConfig {
            kerf: -12.0,
            ..Default::default()
        };
        let err = normalize(
            &[stock("49", "97", "0", "0")],
            &[board("10", "20", "1")],
            &config.padding(),
        )
        .unwrap_err();
        assert!(err.is_input_error());
    }
}
