
use std::fmt;

use rayon::prelude::*;
use tracing::{info, Level};
use tracing::level_filters::LevelFilter;

use crate::*;
use crate::data::delimit;

/// Held-out sequence with its externally supplied grammaticality
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct TestRecord {
    pub tokens: Sequence,
    pub gold: bool,
}

/// Everything reported for one test record
#[derive( Debug, Clone )]
pub struct Evaluation {
    pub record: TestRecord,
    pub classification: Classification,
    /// probability of the boundary-delimited sequence under the sequence model
    pub probability: f64,
}

/// Number of records on which each verdict matches the gold label
#[derive( Debug, Clone, Copy, Default, PartialEq, Eq )]
pub struct Agreement {
    pub total: usize,
    pub cooccurrence: usize,
    pub linear_order: usize,
    /// both rule classes accept exactly the gold-grammatical records
    pub combined: usize,
}

impl TestRecord {
    pub fn new( tokens: Sequence, gold: bool ) -> TestRecord {
	TestRecord{ tokens, gold }
    }

    pub fn text( &self ) -> String {
	self.tokens.join( " " )
    }
}

/// Classifies every record and scores it with the sequence model. Keeps the record order.
pub fn evaluate( grammar: &Grammar, records: Vec<TestRecord> ) -> Vec<Evaluation> {
    let checker = RuleChecker::new( &grammar.rules );
    let evaluations: Vec<Evaluation> = records.into_par_iter()
	.map( |record| {
	    let classification = checker.classify( &record.tokens );
	    let probability = grammar.model.score( &delimit( &record.tokens ));
	    Evaluation{ record, classification, probability }
	})
	.collect();
    for evaluation in &evaluations {
	evaluation.log( "evaluated", Level::DEBUG );
    }
    info!( "Evaluated {} test records", evaluations.len() );
    evaluations
}

impl Agreement {

    pub fn tally( evaluations: &[Evaluation] ) -> Agreement {
	let mut agreement = Agreement::default();
	for evaluation in evaluations {
	    let gold = evaluation.record.gold;
	    let classification = &evaluation.classification;
	    agreement.total += 1;
	    agreement.cooccurrence += usize::from( classification.cooccurrence.ok() == gold );
	    agreement.linear_order += usize::from( classification.linear_order.ok() == gold );
	    agreement.combined += usize::from( classification.ok() == gold );
	}
	agreement
    }
}

impl fmt::Display for Agreement {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
	writeln!( f, "agreement with gold labels over {} records", self.total )?;
	writeln!( f, "  co-occurrence: {}", format_ratio( self.cooccurrence, self.total ))?;
	writeln!( f, "  linear order: {}", format_ratio( self.linear_order, self.total ))?;
	write!( f, "  combined: {}", format_ratio( self.combined, self.total ))
    }
}

impl Loggable for Evaluation {
    fn log( &self, message: &str, level: Level ) {
	if level <= LevelFilter::current() {
	    let line = format!( "{message}: {} (gold {}) p={}", self.record.text(), self.record.gold, self.probability );
	    log_at( level, &line );
	    self.classification.log( message, level );
	}
    }
}

fn format_ratio( count: usize, total: usize ) -> String {
    if total == 0 {
	format!( "{count}/{total}" )
    } else {
	format!( "{count}/{total} ({:.1}%)", 100.0 * count as f64 / total as f64 )
    }
}
