// Shared rig line parsing, calibration, and run state logic.

pub mod calib;
pub mod line;
pub mod model;
pub mod run;
