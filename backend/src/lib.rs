// Crate root for the tensile bench server modules.

pub mod acquisition;
pub mod app;
pub mod buffers;
pub mod constants;
pub mod demo;
pub mod export;
pub mod http;
pub mod meta;
pub mod model;
pub mod recording;
pub mod serial;
pub mod tasks;
pub mod ui;
pub mod utils;
pub mod ws;
