
use std::collections::BTreeSet;

use tracing::Level;

use crate::*;
use crate::data::context_sets;

/// Outcome of checking one rule class. The sequence passes when there are no reasons.
#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct Verdict {
    reasons: BTreeSet<String>,
}

/// Verdicts for both rule classes on one sequence
#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct Classification {
    pub cooccurrence: Verdict,
    pub linear_order: Verdict,
}

/// Applies frozen rule tables to held-out sequences. Never mutates the tables.
#[derive( Debug, Clone, Copy )]
pub struct RuleChecker<'a> {
    tables: &'a RuleTables,
}

impl Verdict {

    pub fn ok( &self ) -> bool {
	self.reasons.is_empty()
    }

    /// Violations in sorted order
    pub fn reasons( &self ) -> impl Iterator<Item = &str> {
	self.reasons.iter().map( |reason| reason.as_str() )
    }

    pub fn contains( &self, reason: &str ) -> bool {
	self.reasons.contains( reason )
    }

    pub fn len( &self ) -> usize {
	self.reasons.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.reasons.is_empty()
    }

    pub fn format_reasons( &self ) -> String {
	self.reasons().collect::<Vec<_>>().join( ", " )
    }

    fn violate( &mut self, reason: String ) {
	self.reasons.insert( reason );
    }
}

impl <'a> RuleChecker<'a> {

    pub fn new( tables: &'a RuleTables ) -> RuleChecker<'a> {
	RuleChecker{ tables }
    }

    /// Checks a sequence against the co-occurrence and the linear order rules.
    /// Tokens outside the alphabet are skipped.
    pub fn classify <S: AsRef<str>> ( &self, sequence: &[S] ) -> Classification {
	let alphabet = self.tables.get_alphabet();
	let symbols = alphabet.encode( sequence );
	let mut classification = Classification::default();

	for (position, symbol) in symbols.iter().enumerate() {
	    let (preceding, following) = context_sets( &symbols, position, alphabet.len() );
	    self.check_cooccurrence( *symbol, &preceding, &following, &mut classification.cooccurrence );
	    self.check_linear_order( *symbol, &preceding, &following, &mut classification.linear_order );
	}

	if tracing::enabled!( Level::TRACE ) {
	    classification.log( "classified", Level::TRACE );
	}
	classification
    }

    fn check_cooccurrence( &self, symbol: Symbol, preceding: &SymbolSet, following: &SymbolSet, verdict: &mut Verdict ) {
	let alphabet = self.tables.get_alphabet();
	let name = alphabet.name( symbol );
	let mut others = preceding.clone();
	others.union_with( following );

	for excluded in self.tables.excludes( symbol ).intersection( &others ) {
	    verdict.violate( format!( "{name} excludes {}", alphabet.name( excluded )));
	}
	for required in self.tables.requires( symbol ).difference( &others ) {
	    verdict.violate( format!( "{name} requires {}", alphabet.name( required )));
	}
    }

    fn check_linear_order( &self, symbol: Symbol, preceding: &SymbolSet, following: &SymbolSet, verdict: &mut Verdict ) {
	let alphabet = self.tables.get_alphabet();
	let name = alphabet.name( symbol );

	for other in preceding.intersection( self.tables.no_precede( symbol )) {
	    verdict.violate( format!( "{} cannot precede {name}", alphabet.name( other )));
	}
	for other in following.intersection( self.tables.no_follow( symbol )) {
	    verdict.violate( format!( "{} cannot follow {name}", alphabet.name( other )));
	}
	for other in self.tables.must_precede( symbol ).difference( preceding ) {
	    verdict.violate( format!( "{} must precede {name}", alphabet.name( other )));
	}
	for other in self.tables.must_follow( symbol ).difference( following ) {
	    verdict.violate( format!( "{} must follow {name}", alphabet.name( other )));
	}
    }
}

impl Classification {
    /// Grammatical under both rule classes
    pub fn ok( &self ) -> bool {
	self.cooccurrence.ok() && self.linear_order.ok()
    }
}

impl Loggable for Classification {
    fn log( &self, message: &str, level: Level ) {
	let line = format!( "{message}: co-occurrence {} [{}] linear order {} [{}]",
			    self.cooccurrence.ok(), self.cooccurrence.format_reasons(),
			    self.linear_order.ok(), self.linear_order.format_reasons() );
	log_at( level, &line );
    }
}
