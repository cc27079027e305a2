use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;

use listsync::{DragInfo, DragSource, DropConfiguration, DropDestination, DropIndex, DropOutcome};

use crate::DraggingInfo;

/// Handler invocation recorded while accepting a drop.
#[derive(Clone, Debug)]
pub enum Dispatch<T> {
    /// Payload drop (drop-on, drop-into or insert, chosen by the destination).
    Payload {
        info: DragInfo,
        destination: DropDestination<T>,
        data: Vec<Vec<u8>>,
    },
    Move {
        dragged: Vec<T>,
        destination: DropDestination<T>,
    },
    Copy {
        dragged: Vec<T>,
        destination: DropDestination<T>,
    },
}

/// Handler calls deferred to the next event-loop turn.
///
/// Accepting a drop only records what to call; the host drains the queue once the widget has
/// finished its own drag teardown. Each entry keeps the configuration that was current when the
/// drop was accepted.
pub struct PendingDispatches<T> {
    queue: VecDeque<(Arc<DropConfiguration<T>>, Dispatch<T>)>,
}

impl<T> Default for PendingDispatches<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<T: DropIndex> PendingDispatches<T> {
    pub fn push(&mut self, configuration: &Arc<DropConfiguration<T>>, dispatch: Dispatch<T>) {
        self.queue.push_back((configuration.clone(), dispatch));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dispatch<T>> {
        self.queue.iter().map(|(_, dispatch)| dispatch)
    }

    /// Runs every queued call in acceptance order. Returns how many ran.
    pub fn run(&mut self) -> usize {
        let mut ran = 0;
        while let Some((configuration, dispatch)) = self.queue.pop_front() {
            match &dispatch {
                Dispatch::Payload {
                    info,
                    destination,
                    data,
                } => configuration.dispatch(info, destination, data),
                Dispatch::Move {
                    dragged,
                    destination,
                } => configuration.handle_move(dragged, destination),
                Dispatch::Copy {
                    dragged,
                    destination,
                } => configuration.handle_copy(dragged, destination),
            }
            ran += 1;
        }
        if ran > 0 {
            atrace!(ran, "PendingDispatches::run");
        }
        ran
    }
}

/// A drop validated at a resolved destination.
pub(crate) struct Resolved<T> {
    pub(crate) source: DragSource,
    /// Validated as a reorder or forced copy of the widget's own items.
    pub(crate) local: bool,
    pub(crate) destination: DropDestination<T>,
    pub(crate) dragged: Vec<T>,
    pub(crate) outcome: DropOutcome,
}

impl<T: DropIndex> PendingDispatches<T> {
    /// Queues the handler calls of an accepted drop. Returns `false` for a rejected one.
    ///
    /// Local drops queue the move or copy handler; foreign drops queue one payload dispatch per
    /// offered type.
    pub(crate) fn accept(
        &mut self,
        configuration: &Arc<DropConfiguration<T>>,
        resolved: Resolved<T>,
        info: &DraggingInfo,
    ) -> bool {
        let Resolved {
            source,
            local,
            destination,
            dragged,
            outcome,
        } = resolved;
        match (local, outcome) {
            (_, DropOutcome::None) => return false,
            (true, DropOutcome::Copy) => {
                self.push(configuration, Dispatch::Copy { dragged, destination });
            }
            (true, DropOutcome::Move) => {
                self.push(configuration, Dispatch::Move { dragged, destination });
            }
            (false, _) => {
                for offered in info.offered(source) {
                    let data = info.payloads(&offered.ty);
                    self.push(
                        configuration,
                        Dispatch::Payload {
                            info: offered,
                            destination: destination.clone(),
                            data,
                        },
                    );
                }
            }
        }
        true
    }
}

impl<T> core::fmt::Debug for PendingDispatches<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingDispatches")
            .field("len", &self.queue.len())
            .finish()
    }
}
