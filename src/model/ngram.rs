
mod serialize; // pretty printing of the model

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::Count;
use crate::data::BOUNDARY_START;

use super::*;

pub use serialize::NgramFormatter;

/// Maximum likelihood n-gram model over a token stream.
/// An event is conditioned on the `order` tokens before it. Every sequence of the
/// stream starts a fresh context of `order` start markers, so its first symbol is an event too.
#[derive( Debug, Clone )]
pub struct NgramModel {
    order: usize,
    /// context -> event -> count
    counts: FxHashMap<Vec<String>, FxHashMap<String, Count>>,
    /// context -> number of events observed after it
    context_totals: FxHashMap<Vec<String>, Count>,
}

impl SequenceModel for NgramModel {

    fn get_order( &self ) -> usize {
	self.order
    }

    fn entries<'a>( &'a self ) -> Box<dyn Iterator<Item = ModelEntry<'a>> + 'a> {
	let mut contexts: Vec<&'a Vec<String>> = self.counts.keys().collect();
	contexts.sort();
	let entries = contexts.into_iter().flat_map( move |context| {
	    let events = &self.counts[ context ];
	    let total = self.context_totals[ context ];
	    let mut ordered: Vec<(&'a String, &'a Count)> = events.iter().collect();
	    ordered.sort();
	    ordered.into_iter().map( move |(event, count)| ModelEntry{
		context: context.as_slice(),
		event: event.as_str(),
		probability: calc_prob( *count, total ),
	    })
	});
	Box::new( entries )
    }

    fn score<S: AsRef<str>>( &self, delimited: &[S] ) -> f64 {
	windows( self.order, delimited ).iter()
	    .map( |(context, event)| self.prob( &context[ .. ], event ))
	    .product()
    }
}

impl NgramModel {

    /// Counts every (context, event) window of the padded sequences of the stream.
    pub fn train<S: AsRef<str>>( order: usize, tokens: &[S] ) -> NgramModel {
	let mut model = NgramModel{
	    order,
	    counts: FxHashMap::default(),
	    context_totals: FxHashMap::default(),
	};
	for (context, event) in windows( order, tokens ) {
	    let context: Vec<String> = context.iter().map( |t| t.to_string() ).collect();
	    let event = event.to_string();
	    *model.context_totals.entry( context.clone() ).or_insert( 0 ) += 1;
	    *model.counts.entry( context ).or_default().entry( event ).or_insert( 0 ) += 1;
	}
	debug!( "n-gram model of order {order}: {} contexts", model.counts.len() );
	model
    }

    /// P(event | context), zero for anything never observed
    pub fn prob<S: AsRef<str>>( &self, context: &[S], event: &str ) -> f64 {
	let context: Vec<String> = context.iter().map( |t| t.as_ref().to_string() ).collect();
	let total = self.context_totals.get( &context ).copied().unwrap_or( 0 );
	let count = self.counts.get( &context )
	    .and_then( |events| events.get( event ))
	    .copied()
	    .unwrap_or( 0 );
	calc_prob( count, total )
    }

    /// Base 2 log probability of a delimited sequence; impossible sequences give negative infinity
    pub fn log_score<S: AsRef<str>>( &self, delimited: &[S] ) -> f64 {
	windows( self.order, delimited ).iter()
	    .map( |(context, event)| log( self.prob( &context[ .. ], event )))
	    .sum()
    }

    pub fn get_context_count( &self ) -> usize {
	self.counts.len()
    }
}

/// Pairs every token of every padded sequence with the `order` tokens before it
fn windows<S: AsRef<str>>( order: usize, delimited: &[S] ) -> Vec<(Vec<&str>, &str)> {
    let sequences = pad_sequences( order, delimited );
    let mut windows = Vec::new();
    for padded in &sequences {
	for window in padded.windows( order + 1 ) {
	    windows.push( (window[ .. order ].to_vec(), window[ order ]) );
	}
    }
    windows
}

/// Splits a stream at its start markers and replaces each marker by `order` of them.
/// Tokens before the first marker form a sequence of their own.
fn pad_sequences<S: AsRef<str>>( order: usize, tokens: &[S] ) -> Vec<Vec<&str>> {
    let mut sequences: Vec<Vec<&str>> = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
	let token = token.as_ref();
	let starts = token == BOUNDARY_START;
	if starts || index == 0 {
	    sequences.push( vec!( BOUNDARY_START; order ));
	}
	if !starts {
	    if let Some( current ) = sequences.last_mut() {
		current.push( token );
	    }
	}
    }
    sequences
}

fn calc_prob( count: Count, total: Count ) -> f64 {
    if total == 0 { 0.0 }
    else { count as f64 / total as f64 }
}

/// Log of base 2 that maps 0.0 to negative infinity
fn log( x: f64 ) -> f64 {
    if x > 0.0 { f64::log2( x ) } else { f64::NEG_INFINITY }
}
