/*!
 * Shutdown and Drain
 *
 * - **run_cleanup_now**: flush handles that are ready at call time
 * - **drain_on_exit**: forced collection plus direct firing, in bounded rounds
 * - **exit hook**: runs the drain for the process-wide cleaner at exit
 */

mod coordinator;
mod exit_hook;

pub use coordinator::DrainReport;
