
use bit_set::BitSet;
use rustc_hash::FxHashMap;

pub type Count = u64;
/// Index of a symbol in its alphabet
pub type Symbol = usize;
/// Set of symbols of one alphabet, stored by index
pub type SymbolSet = BitSet;
/// Raw tokens of one line, in order
pub type Sequence = Vec<String>;

/// Marks the start of a sequence for the sequence model
pub const BOUNDARY_START: &str = "<s>";
/// Marks the end of a sequence for the sequence model
pub const BOUNDARY_END: &str = "</s>";

/// Symbols of the reference grammar
pub const DEFAULT_SYMBOLS: [&str; 6] = ["a", "c", "d", "e", "f", "g"];

/// Fixed, ordered set of symbols a grammar is defined over.
#[derive( Debug, Clone )]
pub struct Alphabet {
    names: Vec<String>,
    index: FxHashMap<String, Symbol>,
}

impl Alphabet {

    /// Creates an alphabet in the given order. Repeated names keep their first position.
    pub fn new <I, S> ( names: I ) -> Alphabet where
	I: IntoIterator<Item = S>,
	S: Into<String>,
    {
	let mut alphabet = Alphabet{ names: Vec::new(), index: FxHashMap::default() };
	for name in names {
	    let name: String = name.into();
	    if !alphabet.index.contains_key( &name ) {
		alphabet.index.insert( name.clone(), alphabet.names.len() );
		alphabet.names.push( name );
	    }
	}
	alphabet
    }

    pub fn len( &self ) -> usize {
	self.names.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.names.is_empty()
    }

    pub fn symbols( &self ) -> std::ops::Range<Symbol> {
	0 .. self.names.len()
    }

    pub fn lookup( &self, token: &str ) -> Option<Symbol> {
	self.index.get( token ).copied()
    }

    /// Name of a symbol. Panics on symbols from another alphabet.
    pub fn name( &self, symbol: Symbol ) -> &str {
	&self.names[ symbol ]
    }

    /// Translates tokens into symbols, skipping tokens outside the alphabet.
    pub fn encode <S: AsRef<str>> ( &self, tokens: &[S] ) -> Vec<Symbol> {
	tokens.iter()
	    .filter_map( |token| self.lookup( token.as_ref() ))
	    .collect()
    }

    pub fn empty_set( &self ) -> SymbolSet {
	SymbolSet::with_capacity( self.len() )
    }

    pub fn full_set( &self ) -> SymbolSet {
	let mut set = self.empty_set();
	for symbol in self.symbols() {
	    set.insert( symbol );
	}
	set
    }

    /// Complement of a set with respect to this alphabet
    pub fn complement( &self, set: &SymbolSet ) -> SymbolSet {
	let mut complement = self.full_set();
	complement.difference_with( set );
	complement
    }

    /// Sorted names of the set members joined by commas.
    pub fn format_set( &self, set: &SymbolSet ) -> String {
	self.set_names( set ).join( ", " )
    }

    /// Names of the set members sorted by name, whatever the alphabet order
    pub fn set_names( &self, set: &SymbolSet ) -> Vec<&str> {
	let mut names: Vec<&str> = set.iter()
	    .filter( |symbol| *symbol < self.len() )
	    .map( |symbol| self.name( symbol ))
	    .collect();
	names.sort_unstable();
	names
    }
}

impl Default for Alphabet {
    fn default() -> Self {
	Alphabet::new( DEFAULT_SYMBOLS )
    }
}

/// Collects the symbols of a slice into a set, dropping duplicates
pub fn symbol_set( symbols: &[Symbol], capacity: usize ) -> SymbolSet {
    let mut set = SymbolSet::with_capacity( capacity );
    for symbol in symbols {
	set.insert( *symbol );
    }
    set
}

/// Splits a sequence at a position into the sets of symbols before and after it.
pub fn context_sets( symbols: &[Symbol], position: usize, capacity: usize ) -> (SymbolSet, SymbolSet) {
    let preceding = symbol_set( &symbols[ .. position ], capacity );
    let following = symbol_set( &symbols[ position + 1 .. ], capacity );
    (preceding, following)
}

/// Wraps tokens in boundary markers for the sequence model.
pub fn delimit <S: AsRef<str>> ( tokens: &[S] ) -> Vec<String> {
    let mut delimited = Vec::with_capacity( tokens.len() + 2 );
    delimited.push( BOUNDARY_START.to_string() );
    delimited.extend( tokens.iter().map( |token| token.as_ref().to_string() ));
    delimited.push( BOUNDARY_END.to_string() );
    delimited
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_skips_unknown_tokens() {
	let alphabet = Alphabet::default();
	let encoded = alphabet.encode( &["a", "x", "g", "c", "<s>"] );
	assert_eq!( encoded, vec!( 0, 5, 1 ));
    }

    #[test]
    fn repeated_names_keep_first_position() {
	let alphabet = Alphabet::new( ["b", "a", "b"] );
	assert_eq!( alphabet.len(), 2 );
	assert_eq!( alphabet.lookup( "b" ), Some( 0 ));
	assert_eq!( alphabet.lookup( "a" ), Some( 1 ));
    }

    #[test]
    /// Sets are printed sorted by name, not in alphabet order
    fn format_sorted_by_name() {
	let alphabet = Alphabet::new( ["g", "a", "d"] );
	let set = symbol_set( &[2, 0, 1], alphabet.len() );
	assert_eq!( alphabet.format_set( &set ), "a, d, g" );
	assert_eq!( alphabet.set_names( &symbol_set( &[0, 2], alphabet.len() )), vec!( "d", "g" ));
	assert_eq!( alphabet.format_set( &alphabet.empty_set() ), "" );
    }

    #[test]
    fn context_sets_exclude_position() {
	let (before, after) = context_sets( &[0, 1, 0, 2, 2], 2, 3 );
	assert_eq!( before.iter().collect::<Vec<_>>(), vec!( 0, 1 ));
	assert_eq!( after.iter().collect::<Vec<_>>(), vec!( 2 ));

	let (before, after) = context_sets( &[0], 0, 3 );
	assert!( before.is_empty() );
	assert!( after.is_empty() );
    }

    #[test]
    fn complement_covers_alphabet() {
	let alphabet = Alphabet::default();
	let set = symbol_set( &[1, 3], alphabet.len() );
	let complement = alphabet.complement( &set );
	assert_eq!( alphabet.format_set( &complement ), "a, d, f, g" );
	assert!( complement.is_disjoint( &set ));
    }

    #[test]
    fn delimit_adds_boundaries() {
	let delimited = delimit( &["a", "c"] );
	assert_eq!( delimited, vec!( "<s>", "a", "c", "</s>" ));
	assert_eq!( delimit::<&str>( &[] ), vec!( "<s>", "</s>" ));
    }
}
