//! Ordered delivery of gateway writes.
//!
//! Effects run as independent tasks, so two writes for the same item could
//! otherwise reach the gateway in either order. A [`WriteQueue`] takes the
//! write at the moment it is dispatched, while the reducer still holds the
//! state lock, and the gateway sees writes in exactly that order.
//!
//! There is no dedicated writer task: whichever effect runs first drains
//! the queue, one write at a time, and every caller waits for the reply to
//! its own write.

use super::{GatewayError, PersistenceGateway};
use crate::types::{TodoId, TodoItem};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot};

/// A write waiting to reach the gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    /// Insert or replace an item
    Save(TodoItem),
    /// Remove an item
    Delete(TodoId),
    /// Finish a batch
    Commit,
}

impl Write {
    /// Name of the gateway operation, used in failure reports
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Save(_) => "save",
            Self::Delete(_) => "delete",
            Self::Commit => "commit",
        }
    }
}

struct Job {
    write: Write,
    reply: oneshot::Sender<Result<(), GatewayError>>,
}

/// FIFO queue in front of a [`PersistenceGateway`]
///
/// Clones share the queue.
#[derive(Clone)]
pub struct WriteQueue {
    gateway: Arc<dyn PersistenceGateway>,
    sender: mpsc::UnboundedSender<Job>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
}

impl WriteQueue {
    /// Create a queue writing to `gateway`
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            gateway,
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Queue `write` behind every write queued before it
    ///
    /// The position is taken immediately, without a runtime. The returned
    /// future delivers pending writes and resolves with the result of this one.
    pub fn enqueue(
        &self,
        write: Write,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send + 'static {
        let (reply, result) = oneshot::channel();
        let queued = self.sender.send(Job { write, reply }).is_ok();
        let queue = self.clone();

        async move {
            if !queued {
                return Err(GatewayError::Unavailable("write queue closed".to_string()));
            }
            queue.drain().await;
            result
                .await
                .unwrap_or_else(|_| Err(GatewayError::Unavailable("write was dropped".to_string())))
        }
    }

    /// Every item in the gateway, read after all writes queued so far
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway cannot be read.
    pub async fn find_all(&self) -> Result<Vec<TodoItem>, GatewayError> {
        let mut receiver = self.receiver.lock().await;
        self.deliver(&mut receiver).await;
        self.gateway.find_all().await
    }

    /// One item from the gateway, read after all writes queued so far
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway cannot be read.
    pub async fn find(&self, id: TodoId) -> Result<Option<TodoItem>, GatewayError> {
        let mut receiver = self.receiver.lock().await;
        self.deliver(&mut receiver).await;
        self.gateway.find(id).await
    }

    /// Deliver queued writes until the queue is empty
    pub async fn drain(&self) {
        let mut receiver = self.receiver.lock().await;
        self.deliver(&mut receiver).await;
    }

    async fn deliver(&self, receiver: &mut mpsc::UnboundedReceiver<Job>) {
        while let Ok(Job { write, reply }) = receiver.try_recv() {
            let result = match write {
                Write::Save(item) => self.gateway.save(item).await,
                Write::Delete(id) => self.gateway.delete(id).await,
                Write::Commit => self.gateway.commit().await,
            };
            // The caller may have stopped waiting
            let _ = reply.send(result);
        }
    }
}

impl std::fmt::Debug for WriteQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteQueue").finish_non_exhaustive()
    }
}
