pub mod ninja;

pub use ninja::NinjaRateSource;
