// Generated by rosmsg-codegen. Do not edit.

/// A point in 3D space
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
