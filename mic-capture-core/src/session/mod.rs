pub mod cancel;
pub mod recorder;
