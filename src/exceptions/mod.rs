/*!
 * Exception Handling
 * Routing of asynchronous cleanup failures to user handlers
 */

mod chain;

pub use chain::{ExceptionChain, ExceptionHandler};
