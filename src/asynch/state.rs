use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex as AsyncMutex;
use embassy_sync::pubsub::PubSubChannel;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use heapless::Vec;

use crate::config::{CellularConfig, CMD_BUF_SIZE, EVENT_CAPACITY, EVENT_SUBSCRIBERS, SEND_CHUNK_SIZE};
use crate::engine::{CommandKind, Engine, Event, Output};
use crate::error::Error;

pub type EventChannel = PubSubChannel<NoopRawMutex, Event, EVENT_CAPACITY, EVENT_SUBSCRIBERS, 1>;

/// A formatted command handed from [`super::Control`] to the runner.
pub(crate) struct Request {
    pub kind: CommandKind,
    pub cmd: Vec<u8, CMD_BUF_SIZE>,
    /// Written after the `>` prompt
    pub payload: Option<Vec<u8, SEND_CHUNK_SIZE>>,
    pub timeout: Duration,
}

/// Everything shared between the runner and its controls.
pub struct State {
    pub(crate) engine: Mutex<NoopRawMutex, RefCell<Engine>>,
    pub(crate) requests: Channel<NoopRawMutex, Request, 1>,
    pub(crate) response: Signal<NoopRawMutex, Result<Output, Error>>,
    pub(crate) events: EventChannel,
    /// Held by a control for the whole request/response exchange
    pub(crate) exchange: AsyncMutex<NoopRawMutex, ()>,
}

impl State {
    pub fn new<C: CellularConfig>() -> Self {
        Self {
            engine: Mutex::new(RefCell::new(Engine::new::<C>())),
            requests: Channel::new(),
            response: Signal::new(),
            events: PubSubChannel::new(),
            exchange: AsyncMutex::new(()),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub(crate) fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        self.engine.lock(|e| f(&mut e.borrow_mut()))
    }
}
