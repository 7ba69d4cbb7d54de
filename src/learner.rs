
mod serialize; // pretty printing and JSON export of the rule tables
mod tables;

use rayon::prelude::*;
use tracing::{debug, info, info_span, trace};

use crate::*;
use crate::data::{context_sets, delimit};

pub use serialize::RulesFormatter;
pub use tables::RuleTables;

/// Order of the sequence model trained alongside the rules
pub const DEFAULT_ORDER: usize = 2;

/// Accumulates corpus statistics in a single pass. Frozen into `RuleTables` once the corpus is consumed.
#[derive( Debug, Clone )]
pub struct RuleLearner {
    alphabet: Alphabet,
    /// number of positions each symbol occupies
    occurrences: Vec<Count>,
    /// [a][b]: positions of a whose sequence holds b at another position
    cooccurrences: Vec<Vec<Count>>,
    /// symbols ever seen left of each symbol
    before: Vec<SymbolSet>,
    /// symbols ever seen right of each symbol
    after: Vec<SymbolSet>,
    /// intersection of all left contexts of each symbol
    must_precede: Vec<SymbolSet>,
    /// intersection of all right contexts of each symbol
    must_follow: Vec<SymbolSet>,
    /// boundary-delimited corpus for the sequence model
    tokens: Vec<String>,
    number_sequences: Count,
}

/// Rule tables together with the sequence model learned from the same corpus.
pub struct Grammar {
    pub rules: RuleTables,
    pub model: NgramModel,
}

impl RuleLearner {

    pub fn new( alphabet: Alphabet ) -> RuleLearner {
	let m = alphabet.len();
	let full = alphabet.full_set();
	RuleLearner{
	    occurrences: vec!( 0; m ),
	    cooccurrences: vec!( vec!( 0; m ); m ),
	    before: vec!( alphabet.empty_set(); m ),
	    after: vec!( alphabet.empty_set(); m ),
	    must_precede: vec!( full.clone(); m ),
	    must_follow: vec!( full; m ),
	    tokens: Vec::new(),
	    number_sequences: 0,
	    alphabet,
	}
    }

    /// Learns from every sequence of the corpus in order
    pub fn train <'a, C> ( alphabet: Alphabet, corpus: C ) -> RuleLearner where
	C: IntoIterator<Item = &'a Sequence>,
    {
	let span = info_span!( "training" );
	let _guard = span.enter();

	let mut learner = RuleLearner::new( alphabet );
	for sequence in corpus {
	    learner.observe( &sequence[ .. ] );
	}
	info!( "Observed {} sequences", learner.number_sequences );
	learner
    }

    /// Same result as `train`, but counts chunks of the corpus on the rayon pool and merges the partial learners.
    pub fn train_parallel( alphabet: Alphabet, corpus: &[Sequence] ) -> RuleLearner {
	let span = info_span!( "training", parallel = true );
	let _guard = span.enter();

	// reduce keeps the order of the chunks, so the token stream stays in corpus order
	let learner = corpus.par_iter()
	    .fold( || RuleLearner::new( alphabet.clone() ), |mut partial, sequence| {
		partial.observe( &sequence[ .. ] );
		partial
	    })
	    .reduce( || RuleLearner::new( alphabet.clone() ), RuleLearner::merge );
	info!( "Observed {} sequences", learner.number_sequences );
	learner
    }

    /// Updates all statistics with one sequence. Empty sequences are ignored.
    pub fn observe <S: AsRef<str>> ( &mut self, sequence: &[S] ) {
	if sequence.is_empty() {
	    return;
	}
	self.number_sequences += 1;

	let m = self.alphabet.len();
	let symbols = self.alphabet.encode( sequence );
	trace!( "Observing {} symbols of {} tokens", symbols.len(), sequence.len() );

	for (position, symbol) in symbols.iter().enumerate() {
	    let symbol = *symbol;
	    self.occurrences[ symbol ] += 1;

	    let (preceding, following) = context_sets( &symbols, position, m );
	    let mut others = preceding.clone();
	    others.union_with( &following );
	    for other in others.iter() {
		self.cooccurrences[ symbol ][ other ] += 1;
	    }

	    self.before[ symbol ].union_with( &preceding );
	    self.after[ symbol ].union_with( &following );
	    // anything missing from this context cannot be required on that side
	    self.must_precede[ symbol ].intersect_with( &preceding );
	    self.must_follow[ symbol ].intersect_with( &following );
	}

	self.tokens.extend( delimit( sequence ));
    }

    /// Combines the statistics of two learners over the same alphabet.
    /// The other learner's tokens are appended after this one's.
    pub fn merge( mut self, other: RuleLearner ) -> RuleLearner {
	for symbol in self.alphabet.symbols() {
	    self.occurrences[ symbol ] += other.occurrences[ symbol ];
	    for (count, other_count) in self.cooccurrences[ symbol ].iter_mut().zip( &other.cooccurrences[ symbol ] ) {
		*count += other_count;
	    }
	    self.before[ symbol ].union_with( &other.before[ symbol ] );
	    self.after[ symbol ].union_with( &other.after[ symbol ] );
	    self.must_precede[ symbol ].intersect_with( &other.must_precede[ symbol ] );
	    self.must_follow[ symbol ].intersect_with( &other.must_follow[ symbol ] );
	}
	self.tokens.extend( other.tokens );
	self.number_sequences += other.number_sequences;
	self
    }

    pub fn get_alphabet( &self ) -> &Alphabet {
	&self.alphabet
    }

    pub fn get_occurrences( &self, symbol: Symbol ) -> Count {
	self.occurrences.get( symbol ).copied().unwrap_or( 0 )
    }

    pub fn get_cooccurrences( &self, symbol: Symbol, other: Symbol ) -> Count {
	self.cooccurrences.get( symbol )
	    .and_then( |row| row.get( other ))
	    .copied()
	    .unwrap_or( 0 )
    }

    pub fn get_sequence_count( &self ) -> Count {
	self.number_sequences
    }

    /// Boundary-delimited tokens of all observed sequences
    pub fn token_stream( &self ) -> &[String] {
	&self.tokens
    }

    /// Derives the categorical rules from the counts.
    pub fn freeze( self ) -> RuleTables {
	let m = self.alphabet.len();
	let mut requires = vec!( self.alphabet.empty_set(); m );
	let mut excludes = vec!( self.alphabet.empty_set(); m );

	for symbol in self.alphabet.symbols() {
	    let count = self.occurrences[ symbol ];
	    for other in self.alphabet.symbols() {
		let together = self.cooccurrences[ symbol ][ other ];
		// zero first: a symbol that never occurs excludes everything
		if together == 0 {
		    excludes[ symbol ].insert( other );
		} else if together == count {
		    requires[ symbol ].insert( other );
		}
	    }
	}

	let no_precede = self.before.iter().map( |seen| self.alphabet.complement( seen )).collect();
	let no_follow = self.after.iter().map( |seen| self.alphabet.complement( seen )).collect();

	let mut must_precede = self.must_precede;
	let mut must_follow = self.must_follow;
	for symbol in self.alphabet.symbols() {
	    // only a symbol that never occurs can still hold itself here
	    must_precede[ symbol ].remove( symbol );
	    must_follow[ symbol ].remove( symbol );
	}

	debug!( "Froze rules for {} symbols", m );
	RuleTables{
	    alphabet: self.alphabet,
	    occurrences: self.occurrences,
	    cooccurrences: self.cooccurrences,
	    before: self.before,
	    after: self.after,
	    requires,
	    excludes,
	    no_precede,
	    no_follow,
	    must_precede,
	    must_follow,
	    empty: SymbolSet::new(),
	}
    }

    /// Freezes the rules and fits the sequence model of the given order on the token stream.
    pub fn finish( mut self, order: usize ) -> Grammar {
	let tokens = std::mem::take( &mut self.tokens );
	let model = NgramModel::train( order, &tokens );
	info!( "Sequence model of order {order} learned {} contexts from {} tokens", model.get_context_count(), tokens.len() );
	Grammar{ rules: self.freeze(), model }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::symbol_set;

    fn corpus( lines: &[&str] ) -> Vec<Sequence> {
	lines.iter()
	    .map( |line| line.split_whitespace().map( |t| t.to_string() ).collect() )
	    .collect()
    }

    fn symbols( tables: &RuleTables, set: &SymbolSet ) -> String {
	tables.get_alphabet().format_set( set )
    }

    fn train( lines: &[&str] ) -> RuleTables {
	RuleLearner::train( Alphabet::default(), &corpus( lines )).freeze()
    }

    #[test]
    /// Single line `a c d`: a always meets c and d
    fn literal_requires() {
	let data = corpus( &["a c d"] );
	let learner = RuleLearner::train( Alphabet::default(), &data );
	let alphabet = learner.get_alphabet().clone();
	let (a, c, d) = (0, 1, 2);
	assert_eq!( learner.get_occurrences( a ), 1 );
	assert_eq!( learner.get_cooccurrences( a, c ), 1 );
	assert_eq!( learner.get_cooccurrences( a, d ), 1 );

	let tables = learner.freeze();
	assert_eq!( symbols( &tables, tables.requires( a )), "c, d" );
	assert_eq!( symbols( &tables, tables.excludes( a )), "a, e, f, g" );
	// nothing was ever seen before a
	assert_eq!( tables.no_precede( a ), &alphabet.full_set() );
	assert_eq!( symbols( &tables, tables.no_follow( a )), "a, e, f, g" );
    }

    #[test]
    /// Repeated symbols count once per position
    fn counts_per_position() {
	let data = corpus( &["a a c", "c"] );
	let learner = RuleLearner::train( Alphabet::default(), &data );
	let (a, c) = (0, 1);
	assert_eq!( learner.get_occurrences( a ), 2 );
	assert_eq!( learner.get_cooccurrences( a, a ), 2 );
	assert_eq!( learner.get_cooccurrences( a, c ), 2 );
	assert_eq!( learner.get_occurrences( c ), 2 );
	assert_eq!( learner.get_cooccurrences( c, a ), 1 );

	let tables = learner.freeze();
	assert!( tables.requires( a ).contains( c ));
	assert!( tables.requires( a ).contains( a ));
	// c occurs alone once, so it neither requires nor excludes a
	assert!( !tables.requires( c ).contains( a ));
	assert!( !tables.excludes( c ).contains( a ));
    }

    #[test]
    fn requires_and_excludes_are_disjoint() {
	let tables = train( &["a c d", "a c", "e f", "g", "c d e f g", "d d a"] );
	for symbol in tables.get_alphabet().symbols() {
	    assert!( tables.requires( symbol ).is_disjoint( tables.excludes( symbol )));
	}
    }

    #[test]
    /// A symbol that never occurs excludes the whole alphabet and requires nothing
    fn unseen_symbol_saturation() {
	let tables = train( &["a c", "c d"] );
	let g = 5;
	assert_eq!( tables.get_occurrences( g ), 0 );
	assert_eq!( tables.excludes( g ), &tables.get_alphabet().full_set() );
	assert!( tables.requires( g ).is_empty() );
	// never narrowed, apart from g itself
	let others = tables.get_alphabet().complement( &symbol_set( &[g], 6 ));
	assert_eq!( tables.must_precede( g ), &others );
	assert_eq!( tables.must_follow( g ), &others );
    }

    #[test]
    /// No-precede and the observed left contexts partition the alphabet
    fn before_after_coverage() {
	let tables = train( &["a c d", "d c", "e a f", "g"] );
	let full = tables.get_alphabet().full_set();
	for symbol in tables.get_alphabet().symbols() {
	    let mut covered = tables.no_precede( symbol ).clone();
	    assert!( covered.is_disjoint( tables.before( symbol )));
	    covered.union_with( tables.before( symbol ));
	    assert_eq!( covered, full );

	    let mut covered = tables.no_follow( symbol ).clone();
	    assert!( covered.is_disjoint( tables.after( symbol )));
	    covered.union_with( tables.after( symbol ));
	    assert_eq!( covered, full );
	}
    }

    #[test]
    fn must_precede_narrows() {
	let (a, c, d, e) = (0, 1, 2, 3);
	let tables = train( &["a c d", "a e c d", "e a d c"] );
	// d always has a on its left
	assert_eq!( symbols( &tables, tables.must_precede( d )), "a" );
	// c is followed by d twice but ends the last line
	assert!( tables.must_follow( c ).is_empty() );
	// a starts a line, so nothing must precede it
	assert!( tables.must_precede( a ).is_empty() );
	assert_eq!( symbols( &tables, tables.must_follow( a )), "c, d" );
	assert!( !tables.must_follow( a ).contains( e ));
    }

    #[test]
    fn unknown_tokens_are_ignored() {
	let with_noise = train( &["a x c", "y", "c z d"] );
	let clean = train( &["a c", "c d"] );
	for symbol in clean.get_alphabet().symbols() {
	    assert_eq!( with_noise.requires( symbol ), clean.requires( symbol ));
	    assert_eq!( with_noise.excludes( symbol ), clean.excludes( symbol ));
	    assert_eq!( with_noise.no_precede( symbol ), clean.no_precede( symbol ));
	    assert_eq!( with_noise.must_follow( symbol ), clean.must_follow( symbol ));
	}
    }

    #[test]
    fn empty_lines_are_no_ops() {
	let data = corpus( &["", "a c", "   "] );
	let learner = RuleLearner::train( Alphabet::default(), &data );
	assert_eq!( learner.get_sequence_count(), 1 );
	assert_eq!( learner.token_stream(), &["<s>", "a", "c", "</s>"] );
    }

    #[test]
    /// Parallel training reproduces the sequential tables and token stream
    fn parallel_matches_sequential() {
	let lines: Vec<&str> = ["a c d", "e f", "a a g", "d c e", "", "g f e d c a", "c"]
	    .iter().cycle().take( 70 ).copied().collect();
	let data = corpus( &lines );

	let sequential = RuleLearner::train( Alphabet::default(), &data );
	let parallel = RuleLearner::train_parallel( Alphabet::default(), &data );
	assert_eq!( sequential.token_stream(), parallel.token_stream() );
	assert_eq!( sequential.get_sequence_count(), parallel.get_sequence_count() );

	let sequential = sequential.freeze();
	let parallel = parallel.freeze();
	for symbol in sequential.get_alphabet().symbols() {
	    assert_eq!( sequential.get_occurrences( symbol ), parallel.get_occurrences( symbol ));
	    assert_eq!( sequential.requires( symbol ), parallel.requires( symbol ));
	    assert_eq!( sequential.excludes( symbol ), parallel.excludes( symbol ));
	    assert_eq!( sequential.no_precede( symbol ), parallel.no_precede( symbol ));
	    assert_eq!( sequential.no_follow( symbol ), parallel.no_follow( symbol ));
	    assert_eq!( sequential.must_precede( symbol ), parallel.must_precede( symbol ));
	    assert_eq!( sequential.must_follow( symbol ), parallel.must_follow( symbol ));
	}
    }

    #[test]
    fn finish_trains_model_on_delimited_stream() {
	let data = corpus( &["a c", "a c"] );
	let grammar = RuleLearner::train( Alphabet::default(), &data ).finish( DEFAULT_ORDER );
	assert_eq!( grammar.model.get_order(), 2 );
	let probability = grammar.model.score( &delimit( &["a", "c"] ));
	assert!( probability > 0.0 );
	assert!( grammar.rules.requires( 0 ).contains( 1 ));
    }
}
