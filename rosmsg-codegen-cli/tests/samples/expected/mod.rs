// Generated by rosmsg-codegen. Do not edit.

pub mod point;
pub mod robot_state;

pub use point::Point;
pub use robot_state::RobotState;
