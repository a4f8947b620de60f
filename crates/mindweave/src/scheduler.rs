/// The host's animation-frame source.
///
/// A requested frame is answered by the host calling
/// [`ViewerSession::on_frame`](crate::ViewerSession::on_frame).
pub trait FrameScheduler {
    fn request_frame(&mut self);
    fn cancel_frame(&mut self);
}

/// Scheduler that only records requests; the caller decides when frames happen.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: bool,
    requests: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Total requests seen so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Consumes the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    fn cancel_frame(&mut self) {
        self.pending = false;
    }
}
