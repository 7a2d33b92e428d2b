/*!
 * Monitoring
 * Structured tracing setup and spans for the dispatch loop
 */

mod tracer;

pub use tracer::{init_tracing, span_dispatch, try_init_tracing};
