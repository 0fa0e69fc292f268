//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue is saturated, submission rejected")]
    Saturated,

    #[error("Queue is closed")]
    Closed,
}
