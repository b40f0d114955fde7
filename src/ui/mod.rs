/// Rendering layer: egui panels and charts over [`crate::state::AppState`].
pub mod charts;
pub mod panels;
