//! Forward-price estimation, implied-volatility inversion, and confidence scoring.

pub mod confidence;
pub mod forward;
pub mod implied_vol;

pub use confidence::score_confidence;
pub use forward::estimate_forward;
pub use implied_vol::{bs_price, invert_implied_vol, norm_cdf};
