/// The current state of a request job.
///
/// A job moves `Idle → Sent`, then either loops back through `Redirected`
/// for every followed hop or settles via `Streaming`/`Buffering` into
/// `Resolved`. Any error ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// The job has not been started.
    #[default]
    Idle,

    /// The transport call is in flight, awaiting response headers.
    Sent,

    /// A `Location` header was followed; the next hop is about to be sent.
    Redirected,

    /// The body stream was handed to the caller.
    Streaming,

    /// Reading the response body into memory.
    Buffering,

    /// The job delivered its result.
    Resolved,

    /// The job failed.
    Failed,
}

impl LoadState {
    /// Whether the job has settled.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Resolved | LoadState::Failed)
    }
}
