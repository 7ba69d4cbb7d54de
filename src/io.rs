use std::path::Path;
use std::fs::File;
use std::io::{BufReader, BufRead, BufWriter, Write};

use tracing::info;

use crate::*;
use crate::error::{Error, Result};

/// Converts a structure into a string
pub trait PrettyFormatter<T> {
    fn format_pretty( &self, object: &T ) -> String;
}

/// Header of the tab separated report
pub const REPORT_HEADER: [&str; 7] = [
    "sequence",
    "gold",
    "cooccurrence_ok",
    "cooccurrence_reasons",
    "linear_order_ok",
    "linear_order_reasons",
    "probability",
];

/// Reads a line-oriented file. The converter is given the 1-based line number and the line.
pub fn read_data<T, F>( path: &Path, converter: F ) -> Result<Vec<T>> where
    F: FnMut( usize, &str ) -> Result<Option<T>>,
{
    let file = File::open( path ).map_err( |e| Error::read( path, e ))?;
    parse_data( BufReader::new( file ), path, converter )
}

/// Like `read_data` on an open reader; `path` only names the source in errors.
pub fn parse_data<R, T, F>( reader: R, path: &Path, mut converter: F ) -> Result<Vec<T>> where
    R: BufRead,
    F: FnMut( usize, &str ) -> Result<Option<T>>,
{
    let mut data = Vec::new();
    for (index, line) in reader.lines().enumerate() {
	let line = line.map_err( |e| Error::read( path, e ))?;
	if let Some( datum ) = converter( index + 1, &line )? {
	    data.push( datum );
	}
    }
    Ok( data )
}

/// Splits a line into whitespace separated tokens
pub fn parse_sequence( line: &str ) -> Sequence {
    line.split_whitespace().map( |token| token.to_string() ).collect()
}

/// Parses `<symbols>,<label>`. Only the label `True` marks a grammatical sequence.
pub fn parse_test_record( line_number: usize, line: &str ) -> Result<TestRecord> {
    match line.split_once( ',' ) {
	Some( (symbols, label) ) => Ok( TestRecord::new( parse_sequence( symbols ), label.trim() == "True" )),
	None => Err( Error::MissingLabel{ line_number, line: line.to_string() }),
    }
}

/// Reads one training sequence per line. Empty lines are kept and ignored by the learner.
pub fn read_corpus( path: &Path ) -> Result<Vec<Sequence>> {
    let corpus = read_data( path, convert_corpus_line )?;
    info!( "Read {} corpus lines from {}", corpus.len(), path.display() );
    Ok( corpus )
}

/// Like `read_corpus` on an open reader
pub fn parse_corpus<R: BufRead>( reader: R, path: &Path ) -> Result<Vec<Sequence>> {
    parse_data( reader, path, convert_corpus_line )
}

fn convert_corpus_line( _line_number: usize, line: &str ) -> Result<Option<Sequence>> {
    Ok( Some( parse_sequence( line )))
}

/// Reads gold-labelled test records, skipping blank lines.
pub fn read_test_records( path: &Path ) -> Result<Vec<TestRecord>> {
    let records = read_data( path, convert_test_line )?;
    info!( "Read {} test records from {}", records.len(), path.display() );
    Ok( records )
}

fn convert_test_line( line_number: usize, line: &str ) -> Result<Option<TestRecord>> {
    if line.trim().is_empty() {
	return Ok( None );
    }
    parse_test_record( line_number, line ).map( Some )
}

/// Writes the tab separated report, one row per evaluation
pub fn write_report<W: Write>( writer: &mut W, evaluations: &[Evaluation] ) -> std::io::Result<()> {
    writeln!( writer, "{}", REPORT_HEADER.join( "\t" ))?;
    for evaluation in evaluations {
	let classification = &evaluation.classification;
	writeln!( writer, "{}\t{}\t{}\t{}\t{}\t{}\t{}",
		  evaluation.record.text(),
		  format_bool( evaluation.record.gold ),
		  format_bool( classification.cooccurrence.ok() ),
		  classification.cooccurrence.format_reasons(),
		  format_bool( classification.linear_order.ok() ),
		  classification.linear_order.format_reasons(),
		  evaluation.probability )?;
    }
    writer.flush()
}

/// Writes the report to a file
pub fn save_report( evaluations: &[Evaluation], path: &Path ) -> Result<()> {
    let file = File::create( path ).map_err( |e| Error::write( path, e ))?;
    let mut writer = BufWriter::new( file );
    write_report( &mut writer, evaluations ).map_err( |e| Error::write( path, e ))?;
    info!( "Wrote {} report rows to {}", evaluations.len(), path.display() );
    Ok( () )
}

/// Exports the rule tables as pretty printed JSON
pub fn write_rules_json( tables: &RuleTables, path: &Path ) -> Result<()> {
    let model_string = serde_json::to_string_pretty( tables )?;
    let mut file = File::create( path ).map_err( |e| Error::write( path, e ))?;
    writeln!( file, "{}", model_string ).map_err( |e| Error::write( path, e ))
}

/// Spells booleans the way the gold labels do
pub fn format_bool( value: bool ) -> &'static str {
    if value { "True" } else { "False" }
}
