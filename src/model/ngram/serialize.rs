use crate::io::PrettyFormatter;

use crate::model::{ModelEntry, SequenceModel};

use super::NgramModel;

/// Lists every learned conditional probability, one per line
pub struct NgramFormatter {
    precision: usize,
}

impl PrettyFormatter<NgramModel> for NgramFormatter {

    fn format_pretty( &self, model: &NgramModel ) -> String {
	model.entries()
	    .map( |entry| format_entry( &entry, self.precision ))
	    .fold( String::new(), |mut output, line| {
		output.push_str( &line );
		output.push( '\n' );
		output
	    })
    }
}

fn format_entry( entry: &ModelEntry, precision: usize ) -> String {
    format!( "{} -> {}: {:.*}", entry.context.join( " " ), entry.event, precision, entry.probability )
}

impl NgramFormatter {
    pub fn new() -> NgramFormatter {
	NgramFormatter{ precision: 3 }
    }

    pub fn set_precision( &mut self, precision: usize ) { self.precision = precision; }
}

impl Default for NgramFormatter {
    fn default() -> Self {
	NgramFormatter::new()
    }
}
