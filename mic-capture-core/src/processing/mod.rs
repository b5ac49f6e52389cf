pub mod amplification;
pub mod clip;
pub mod levels;
pub mod window;
