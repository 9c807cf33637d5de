use {
  std::task::{Context, Poll},
  tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};

/// A thin wrapper around an unbounded tokio channel that keeps
/// both halves together until one of them is handed out.
#[derive(Debug)]
pub(crate) struct Channel<T> {
  tx: UnboundedSender<T>,
  rx: UnboundedReceiver<T>,
}

impl<T> Channel<T> {
  pub fn new() -> Self {
    let (tx, rx) = unbounded_channel();
    Self { tx, rx }
  }

  pub fn split(self) -> (UnboundedSender<T>, UnboundedReceiver<T>) {
    (self.tx, self.rx)
  }

  pub fn sender(&self) -> UnboundedSender<T> {
    self.tx.clone()
  }

  pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
    self.rx.poll_recv(cx)
  }
}
