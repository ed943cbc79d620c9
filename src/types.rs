use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LayoutError, Result};

/// Solver and engine coordinates are inches multiplied by this factor.
pub const SCALE: f64 = 1000.0;

pub fn to_scaled(inches: f64) -> i64 {
    (inches * SCALE).round() as i64
}

pub fn to_inches(scaled: i64) -> f64 {
    scaled as f64 / SCALE
}

/// Axis-aligned rectangle in scaled, sheet-relative units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@({},{})", self.w, self.h, self.x, self.y)
    }
}

/// A numeric input cell kept as text until normalization.
///
/// Accepts either a JSON number or a string so the same rows can come from
/// CSV files and from request bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NumericField(pub String);

impl NumericField {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(&self, field: &str) -> Result<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LayoutError::invalid_dimension(field, self.0.as_str()))
    }

    /// Parses a strictly positive value.
    pub fn parse_positive(&self, field: &str) -> Result<f64> {
        let v = self.parse(field)?;
        if v <= 0.0 {
            return Err(LayoutError::invalid_dimension(field, self.0.as_str()));
        }
        Ok(v)
    }

    pub fn parse_count(&self, field: &str) -> Result<u32> {
        match self.0.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(LayoutError::invalid_dimension(field, self.0.as_str())),
        }
    }
}

impl From<&str> for NumericField {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for NumericField {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor;

        impl serde::de::Visitor<'_> for FieldVisitor {
            type Value = NumericField;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a number or a numeric string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(NumericField(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(NumericField(v.to_string()))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                Ok(NumericField(v.to_string()))
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
                Ok(NumericField(v.to_string()))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(NumericField(v.to_string()))
            }
        }

        deserializer.deserialize_any(FieldVisitor)
    }
}

/// One row of `stock.csv`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StockRow {
    pub width: NumericField,
    pub height: NumericField,
    #[serde(default)]
    pub top_margin: Option<NumericField>,
    #[serde(default)]
    pub bottom_margin: Option<NumericField>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One row of `boards.csv`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BoardRow {
    pub width: NumericField,
    pub height: NumericField,
    pub quantity: NumericField,
    #[serde(default)]
    pub title: String,
}

/// A stock sheet in layout inches, already reduced to its usable cut area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSheet {
    pub id: usize,
    pub title: Option<String>,
    /// Usable width after edge waste.
    pub width: f64,
    /// Usable height after edge waste and both margins.
    pub height: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub x: f64,
    pub y: f64,
    /// Dimensions as entered, before any waste was removed.
    pub nominal_width: f64,
    pub nominal_height: f64,
}

impl StockSheet {
    pub fn scaled_width(&self) -> i64 {
        to_scaled(self.width)
    }

    pub fn scaled_height(&self) -> i64 {
        to_scaled(self.height)
    }

    /// The synthetic parent of every top-level node on this sheet.
    pub fn root_rect(&self) -> Rect {
        Rect::new(0, 0, self.scaled_width(), self.scaled_height())
    }

    /// Height of the drawn outline, margins included.
    pub fn outline_height(&self) -> f64 {
        self.height + self.top_margin + self.bottom_margin
    }

    /// Absolute position of the top-left corner of the cut area.
    pub fn origin(&self) -> (f64, f64) {
        (self.x, self.y + self.top_margin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardRequest {
    pub id: usize,
    pub title: String,
    pub requested_width: f64,
    pub requested_height: f64,
    pub quantity: u32,
    pub grouped: bool,
    pub padded_width: f64,
    /// Padded height; covers every copy when `grouped`.
    pub padded_height: f64,
    pub placed: bool,
}

impl BoardRequest {
    /// Number of copies the solver is asked to place.
    pub fn effective_quantity(&self) -> u32 {
        if self.grouped { 1 } else { self.quantity }
    }

    pub fn scaled_width(&self) -> i64 {
        to_scaled(self.padded_width)
    }

    pub fn scaled_height(&self) -> i64 {
        to_scaled(self.padded_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(100, 200, 50, 25);
        assert_eq!(r.right(), 150);
        assert_eq!(r.bottom(), 225);
        assert!(Rect::new(0, 0, 1000, 1000).contains(&r));
        assert!(!r.contains(&Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_scaling_is_exact_for_common_fractions() {
        assert_eq!(to_scaled(10.125), 10125);
        assert_eq!(to_scaled(0.1 * 3.0), 300);
        assert_eq!(to_inches(48750), 48.75);
    }

    #[test]
    fn test_numeric_field_parse() {
        assert_eq!(NumericField::from(" 12.5 ").parse("w").unwrap(), 12.5);
        assert!(NumericField::from("abc").parse("w").is_err());
        assert!(NumericField::from("0").parse_positive("w").is_err());
        assert!(NumericField::from("-3").parse_positive("w").is_err());
        assert!(NumericField::from("NaN").parse("w").is_err());
        assert_eq!(NumericField::from("4").parse_count("q").unwrap(), 4);
        assert!(NumericField::from("1.5").parse_count("q").is_err());
    }

    #[test]
    fn test_numeric_field_accepts_json_numbers_and_strings() {
        let row: BoardRow =
            serde_json::from_str(r#"{"width": 10, "height": "20.5", "quantity": 2, "title": "Side"}"#)
                .unwrap();
        assert_eq!(row.width.as_str(), "10");
        assert_eq!(row.height.as_str(), "20.5");
        assert_eq!(row.quantity.parse_count("quantity").unwrap(), 2);
    }

    #[test]
    fn test_effective_quantity() {
        let mut b = BoardRequest {
            id: 0,
            title: "Shelf".into(),
            requested_width: 10.0,
            requested_height: 20.0,
            quantity: 3,
            grouped: false,
            padded_width: 10.5,
            padded_height: 20.5,
            placed: false,
        };
        assert_eq!(b.effective_quantity(), 3);
        b.grouped = true;
        assert_eq!(b.effective_quantity(), 1);
    }
}
