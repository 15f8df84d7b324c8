/*!
 * Monitoring
 * Tracing subscriber setup for applications embedding the cleaner
 */

mod tracer;

pub use tracer::{init_tracing, TRACE_JSON_ENV};
