pub mod app;
pub mod components;
pub mod input;
pub mod joystick;
pub mod screens;
