
use tracing::Level;

use crate::*;

/// Rules learned from a corpus. Read-only once built.
/// Every per-symbol accessor answers with the empty set or zero for symbols outside the alphabet.
#[derive( Debug, Clone )]
pub struct RuleTables {
    pub(crate) alphabet: Alphabet,
    pub(crate) occurrences: Vec<Count>,
    pub(crate) cooccurrences: Vec<Vec<Count>>,
    pub(crate) before: Vec<SymbolSet>,
    pub(crate) after: Vec<SymbolSet>,
    /// b in requires[a]: every occurrence of a shares its sequence with b
    pub(crate) requires: Vec<SymbolSet>,
    /// b in excludes[a]: no occurrence of a shares its sequence with b
    pub(crate) excludes: Vec<SymbolSet>,
    /// b in no_precede[a]: b was never seen anywhere left of a
    pub(crate) no_precede: Vec<SymbolSet>,
    /// b in no_follow[a]: b was never seen anywhere right of a
    pub(crate) no_follow: Vec<SymbolSet>,
    /// b in must_precede[a]: b was left of every occurrence of a
    pub(crate) must_precede: Vec<SymbolSet>,
    /// b in must_follow[a]: b was right of every occurrence of a
    pub(crate) must_follow: Vec<SymbolSet>,
    /// answer for symbols outside the alphabet
    pub(crate) empty: SymbolSet,
}

impl RuleTables {

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

    pub fn requires( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.requires, symbol, &self.empty ) }
    pub fn excludes( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.excludes, symbol, &self.empty ) }
    pub fn no_precede( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.no_precede, symbol, &self.empty ) }
    pub fn no_follow( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.no_follow, symbol, &self.empty ) }
    pub fn must_precede( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.must_precede, symbol, &self.empty ) }
    pub fn must_follow( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.must_follow, symbol, &self.empty ) }
    /// Symbols observed left of the given symbol
    pub fn before( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.before, symbol, &self.empty ) }
    /// Symbols observed right of the given symbol
    pub fn after( &self, symbol: Symbol ) -> &SymbolSet { lookup( &self.after, symbol, &self.empty ) }
}

impl Loggable for RuleTables {
    fn log( &self, message: &str, level: Level ) {
	let alphabet = &self.alphabet;
	for symbol in alphabet.symbols() {
	    let line = format!( "{message}: {} requires [{}] excludes [{}] no-precede [{}] no-follow [{}]",
				alphabet.name( symbol ),
				alphabet.format_set( self.requires( symbol )),
				alphabet.format_set( self.excludes( symbol )),
				alphabet.format_set( self.no_precede( symbol )),
				alphabet.format_set( self.no_follow( symbol )));
	    log_at( level, &line );
	}
    }
}

fn lookup <'a> ( table: &'a [SymbolSet], symbol: Symbol, empty: &'a SymbolSet ) -> &'a SymbolSet {
    table.get( symbol ).unwrap_or( empty )
}
