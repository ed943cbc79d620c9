//! Cut diagrams for sheet goods.
//!
//! Stock sheets and required boards are normalized into padded, scaled
//! layout space, handed to an external guillotine packing solver, and the
//! solver's placement tree is reconciled into labeled boards, cut lines and
//! waste regions that can be rendered as SVG.

pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod expander;
pub mod forest;
pub mod input;
pub mod layout;
pub mod normalize;
pub mod render;
pub mod report;
pub mod solver;
pub mod svg;
pub mod types;

pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use layout::{LayoutPlan, plan};
