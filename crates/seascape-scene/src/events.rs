//! The single event queue that serializes every asynchronous mutation
//! (panel edits, load callbacks, host resizes) onto the render loop's thread.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::loader::LoadEvent;
use crate::panel::PanelEdit;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A control-panel field changed.
    Panel(PanelEdit),
    /// Progress or completion of an asset load.
    Load(LoadEvent),
    /// The host viewport changed size (physical pixels).
    Resize { width: u32, height: u32 },
}

pub type EventSender = Sender<SceneEvent>;
pub type EventReceiver = Receiver<SceneEvent>;

/// Create an unbounded multi-producer queue for [`SceneEvent`]s.
pub fn event_queue() -> (EventSender, EventReceiver) {
    unbounded()
}
