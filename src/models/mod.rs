//! Domain value types for the option-probability engine.

mod option;
mod polymarket;
mod prediction;

pub use option::{OptionPoint, OptionState, QuoteEvent, Surface};
pub use polymarket::{Direction, EventMetadata, MarketMetadata};
pub use prediction::{
    ConfidenceDiagnostics, ExpiryPredictions, ForwardEstimate, IvResult, ModelPrediction,
    StrikeProbability,
};
