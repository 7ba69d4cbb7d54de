use serde::{self, Serialize};

use crate::*;
use crate::io::PrettyFormatter;

use super::RuleTables;

/// Renders the rule tables as the per-symbol console summary
pub struct RulesFormatter {
    show_must: bool,
    show_counts: bool,
}

/// JSON view of the rules of one symbol
#[derive( Serialize )]
struct SymbolRules<'a> {
    occurrences: Count,
    requires: Vec<&'a str>,
    excludes: Vec<&'a str>,
    no_precede: Vec<&'a str>,
    no_follow: Vec<&'a str>,
    must_precede: Vec<&'a str>,
    must_follow: Vec<&'a str>,
}

impl PrettyFormatter<RuleTables> for RulesFormatter {

    fn format_pretty( &self, tables: &RuleTables ) -> String {
	let alphabet = tables.get_alphabet();
	let mut output = String::new();
	for symbol in alphabet.symbols() {
	    output = join_lines( output, alphabet.name( symbol ).to_string() );
	    if self.show_counts {
		let partners: Vec<String> = alphabet.symbols()
		    .map( |other| format!( "{}={}", alphabet.name( other ), tables.get_cooccurrences( symbol, other )))
		    .collect();
		output = join_lines( output, format!( "  occurrences: {}", tables.get_occurrences( symbol )));
		output = join_lines( output, format!( "  co-occurrences: {}", partners.join( ", " )));
	    }
	    output = join_lines( output, format_rule( "requires", alphabet.format_set( tables.requires( symbol ))));
	    output = join_lines( output, format_rule( "excludes", alphabet.format_set( tables.excludes( symbol ))));
	    output = join_lines( output, format_rule( "no-precede", alphabet.format_set( tables.no_precede( symbol ))));
	    output = join_lines( output, format_rule( "no-follow", alphabet.format_set( tables.no_follow( symbol ))));
	    if self.show_must {
		output = join_lines( output, format_rule( "must-precede", alphabet.format_set( tables.must_precede( symbol ))));
		output = join_lines( output, format_rule( "must-follow", alphabet.format_set( tables.must_follow( symbol ))));
	    }
	}
	output
    }
}

impl serde::Serialize for RuleTables {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
	let alphabet = self.get_alphabet();
	let entries = alphabet.symbols().map( |symbol| {
	    let rules = SymbolRules{
		occurrences: self.get_occurrences( symbol ),
		requires: alphabet.set_names( self.requires( symbol )),
		excludes: alphabet.set_names( self.excludes( symbol )),
		no_precede: alphabet.set_names( self.no_precede( symbol )),
		no_follow: alphabet.set_names( self.no_follow( symbol )),
		must_precede: alphabet.set_names( self.must_precede( symbol )),
		must_follow: alphabet.set_names( self.must_follow( symbol )),
	    };
	    (alphabet.name( symbol ), rules)
	});
	serializer.collect_map( entries )
    }
}

fn format_rule( rule: &str, symbols: String ) -> String {
    format!( "  {rule}: {symbols}" )
}

fn join_lines( mut accumulator: String, addition: String ) -> String {
    accumulator.push_str( addition.as_str() );
    accumulator.push( '\n' );
    accumulator
}

impl RulesFormatter {
    pub fn new() -> RulesFormatter {
	RulesFormatter{
	    show_must: false,
	    show_counts: false,
	}
    }

    pub fn show_must( &mut self ) { self.show_must = true; }
    pub fn show_counts( &mut self ) { self.show_counts = true; }
}

impl Default for RulesFormatter {
    fn default() -> Self {
	RulesFormatter::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::Sequence;

    fn train( lines: &[&str] ) -> RuleTables {
	let corpus: Vec<Sequence> = lines.iter()
	    .map( |line| line.split_whitespace().map( |t| t.to_string() ).collect() )
	    .collect();
	RuleLearner::train( Alphabet::new( ["a", "c", "d"] ), &corpus ).freeze()
    }

    #[test]
    fn summary_lists_sorted_rules() {
	let tables = train( &["d c a"] );
	let summary = RulesFormatter::new().format_pretty( &tables );
	let lines: Vec<&str> = summary.lines().collect();
	assert_eq!( lines, vec!(
	    "a",
	    "  requires: c, d",
	    "  excludes: a",
	    "  no-precede: a",
	    "  no-follow: a, c, d",
	    "c",
	    "  requires: a, d",
	    "  excludes: c",
	    "  no-precede: a, c",
	    "  no-follow: c, d",
	    "d",
	    "  requires: a, c",
	    "  excludes: d",
	    "  no-precede: a, c, d",
	    "  no-follow: d",
	));
    }

    #[test]
    fn optional_sections() {
	let tables = train( &["a c", "a d c"] );
	let mut formatter = RulesFormatter::new();
	formatter.show_must();
	formatter.show_counts();
	let summary = formatter.format_pretty( &tables );
	assert!( summary.contains( "  occurrences: 2\n" ));
	assert!( summary.contains( "  co-occurrences: a=0, c=2, d=1\n" ));
	assert!( summary.contains( "  must-follow: c\n" ));
    }

    #[test]
    fn json_keys_by_symbol_name() {
	let tables = train( &["a c"] );
	let value = serde_json::to_value( &tables ).unwrap();
	assert_eq!( value["a"]["occurrences"], 1 );
	assert_eq!( value["a"]["requires"], serde_json::json!( ["c"] ));
	assert_eq!( value["d"]["excludes"], serde_json::json!( ["a", "c", "d"] ));
	assert_eq!( value["c"]["no_follow"], serde_json::json!( ["a", "c", "d"] ));
    }
}
