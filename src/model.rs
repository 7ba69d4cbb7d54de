
mod ngram;

/// One learned conditional probability: P(event | context)
#[derive( Debug, Clone, PartialEq )]
pub struct ModelEntry<'a> {
    pub context: &'a [String],
    pub event: &'a str,
    pub probability: f64,
}

/// Probabilistic model over boundary-delimited token sequences
pub trait SequenceModel {
    /// Number of preceding tokens an event is conditioned on
    fn get_order( &self ) -> usize;

    /// Lazily enumerates every learned conditional probability
    fn entries<'a>( &'a self ) -> Box<dyn Iterator<Item = ModelEntry<'a>> + 'a>;

    /// Probability of a whole boundary-delimited sequence
    fn score<S: AsRef<str>>( &self, delimited: &[S] ) -> f64;
}

pub use ngram::{NgramModel, NgramFormatter};
