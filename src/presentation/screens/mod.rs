pub mod control;
pub mod device_select;
