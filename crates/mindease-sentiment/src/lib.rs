pub mod lexicon;
pub mod scorer;

pub use scorer::{Analysis, SentimentScorer};
