/*!
 * Anchors
 * Drop-observable identity embedded in every owner
 */

use super::channel::NotificationChannel;
use crate::core::types::{AnchorId, HandleId};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// One registered handle waiting for the owner to go away
struct Watch {
    handle: HandleId,
    channel: Weak<NotificationChannel>,
}

/// Shared state behind an [`Anchor`]
///
/// Its drop is the moment the owner becomes unreachable: every watched
/// handle is pushed onto its cleaner's channel. Only handle ids are held
/// here; the registry owns the handles themselves.
pub(crate) struct AnchorCell {
    id: AnchorId,
    watches: Mutex<Vec<Watch>>,
}

impl Drop for AnchorCell {
    fn drop(&mut self) {
        let watches = std::mem::take(self.watches.get_mut());
        for watch in watches {
            // A cleaner that is already gone has nothing left to run
            if let Some(channel) = watch.channel.upgrade() {
                channel.notify_ready(watch.handle);
            }
        }
    }
}

/// Embedded in an owner to make its drop observable
///
/// An anchor is deliberately not `Clone`: the owner is the only holder, so
/// dropping the owner drops the anchor.
///
/// ```ignore
/// struct Connection {
///     anchor: Anchor,
///     socket: Arc<Socket>,
/// }
///
/// impl Cleanup for Connection {
///     fn anchor(&self) -> &Anchor {
///         &self.anchor
///     }
/// }
/// ```
pub struct Anchor {
    cell: Arc<AnchorCell>,
}

impl Default for Anchor {
    fn default() -> Self {
        Self::new()
    }
}

impl Anchor {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(AnchorCell {
                id: AnchorId::next(),
                watches: Mutex::new(Vec::new()),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> AnchorId {
        self.cell.id
    }

    /// Number of handles that will be enqueued when this anchor drops
    pub fn watched(&self) -> usize {
        self.cell.watches.lock().len()
    }

    pub(crate) fn watch(&self, handle: HandleId, channel: &Arc<NotificationChannel>) {
        self.cell.watches.lock().push(Watch {
            handle,
            channel: Arc::downgrade(channel),
        });
    }

    pub(crate) fn downgrade(&self) -> Weak<AnchorCell> {
        Arc::downgrade(&self.cell)
    }
}

impl std::fmt::Debug for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anchor")
            .field("id", &self.id())
            .field("watched", &self.watched())
            .finish()
    }
}
