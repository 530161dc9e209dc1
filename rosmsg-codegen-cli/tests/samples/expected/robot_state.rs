// Generated by rosmsg-codegen. Do not edit.

/// Snapshot of a robot's state.
///
/// Published periodically by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotState {
    /// robot name
    pub name: ::std::string::String,
    pub battery: f64,
    pub enabled: bool,
    pub joint_ids: Vec<i32>,
    /// current position
    pub position: super::point::Point,
}
impl RobotState {
    /// robot is waiting for commands
    pub const MODE_IDLE: u8 = 0;
    /// robot is executing a task
    pub const MODE_ACTIVE: u8 = 1;
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// robot is waiting for commands
    Idle = 0,
    /// robot is executing a task
    Active = 1,
}
