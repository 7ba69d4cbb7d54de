use tracing::{info,debug};

use rand::prelude::*;
use statrs::distribution::DiscreteUniform;

use std::time::*;

use aglearn::*;
use aglearn::learner::DEFAULT_ORDER;

fn main() -> Result<(), String> {
    prepare_logging();

    let alphabet = Alphabet::default();
    let sizes = [1000, 10000, 100000];
    let max_length = 8;

    for size in sizes {
	let corpus = generate_random_corpus( &alphabet, size, max_length )?;
	benchmark_training( &alphabet, &corpus );
	benchmark_classification( &alphabet, &corpus, 10000 )?;
    }

    Result::Ok( () )
}

fn benchmark_training( alphabet: &Alphabet, corpus: &[Sequence] ) {
    info!( "Start benchmark: training on {} sequences", corpus.len() );

    let start = Instant::now();
    let sequential = RuleLearner::train( alphabet.clone(), corpus );
    let sequential_time = Instant::now().duration_since( start );
    info!( "Result: sequential training took {}ms", sequential_time.as_millis() );

    let start = Instant::now();
    let parallel = RuleLearner::train_parallel( alphabet.clone(), corpus );
    let parallel_time = Instant::now().duration_since( start );
    info!( "Result: parallel training took {}ms", parallel_time.as_millis() );

    // both must agree before the timings mean anything
    assert_eq!( sequential.token_stream(), parallel.token_stream() );

    let start = Instant::now();
    let grammar = sequential.finish( DEFAULT_ORDER );
    let finish_time = Instant::now().duration_since( start );
    info!( "Result: freezing rules and fitting the model took {}ms ({} contexts)", finish_time.as_millis(), grammar.model.get_context_count() );
}

fn benchmark_classification( alphabet: &Alphabet, corpus: &[Sequence], number_queries: usize ) -> Result<(), String> {
    let grammar = RuleLearner::train( alphabet.clone(), corpus ).finish( DEFAULT_ORDER );
    let checker = RuleChecker::new( &grammar.rules );
    let queries = generate_random_corpus( alphabet, number_queries, 8 )?;

    info!( "Start benchmark: classifying {number_queries} random sequences" );
    let start = Instant::now();
    let mut accepted = 0;
    for query in &queries {
	let classification = checker.classify( query );
	if classification.ok() {
	    accepted += 1;
	}
    }
    let time = Instant::now().duration_since( start );
    debug!( "{accepted} of {number_queries} random sequences were grammatical" );
    info!( "Result: {number_queries} classifications took {}ms", time.as_millis() );
    Ok( () )
}

/// Draws sequences of uniform length in 1..=max_length with uniformly chosen symbols
fn generate_random_corpus( alphabet: &Alphabet, size: usize, max_length: usize ) -> Result<Vec<Sequence>, String> {
    let length_distribution = DiscreteUniform::new( 1, max_length as i64 ).map_err( |e| e.to_string() )?;
    let symbol_distribution = DiscreteUniform::new( 0, alphabet.len() as i64 - 1 ).map_err( |e| e.to_string() )?;
    let mut gen = thread_rng();

    let mut corpus = Vec::with_capacity( size );
    for _ in 0 .. size {
	let length = length_distribution.sample( &mut gen ) as usize;
	let sequence: Sequence = (0 .. length)
	    .map( |_| alphabet.name( symbol_distribution.sample( &mut gen ) as usize ).to_string() )
	    .collect();
	corpus.push( sequence );
    }
    Ok( corpus )
}

fn prepare_logging() {
    let tracer = tracing_subscriber::fmt::fmt()
	.with_max_level( tracing_subscriber::filter::LevelFilter::INFO )
	.finish();
    tracing::subscriber::set_global_default( tracer ).unwrap();
}
