pub mod encode;
pub mod panel;
pub mod predict;
