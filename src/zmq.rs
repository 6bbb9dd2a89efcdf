//! ZeroMQ publisher feeding campaigns to the emailer.
//!
//! `zmq::Socket` is not `Sync`, so the socket lives on its own thread and
//! request handlers hand it messages through a channel. Each message carries
//! a reply channel so the caller learns whether the socket accepted it.

use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread;

use crate::models::zmq::CampaignDispatch;
use crate::services::dispatch::{DispatchError, EmailDispatcher};

type PublishResult = Result<(), DispatchError>;

struct Outgoing {
    payload: Vec<u8>,
    reply: SyncSender<PublishResult>,
}

pub struct ZmqSender {
    tx: Sender<Outgoing>,
}

fn publish_loop(socket: zmq::Socket, rx: Receiver<Outgoing>) {
    for Outgoing { payload, reply } in rx {
        let result = socket.send(payload, 0).map_err(|err| {
            log::error!("Failed to publish to emailer: {err}");
            DispatchError(err.to_string())
        });
        // The caller may have given up waiting; nothing left to report to.
        let _ = reply.send(result);
    }
    log::info!("Emailer publisher stopped");
}

impl ZmqSender {
    /// Connects a PUB socket to `endpoint` and starts the publishing thread.
    pub fn start(endpoint: &str) -> Result<Self, zmq::Error> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB)?;
        socket.connect(endpoint)?;

        let (tx, rx) = mpsc::channel::<Outgoing>();
        thread::Builder::new()
            .name("zmq-emailer-pub".to_string())
            .spawn(move || {
                // Keep the context alive for as long as the socket is used.
                let _context = context;
                publish_loop(socket, rx);
            })
            .map_err(|err| {
                log::error!("Cannot spawn emailer publisher: {err}");
                zmq::Error::EFAULT
            })?;

        log::info!("Publishing campaigns to {endpoint}");
        Ok(Self { tx })
    }

    /// Serializes `message` and waits until the socket has taken it.
    pub fn send_json<T: serde::Serialize>(&self, message: &T) -> PublishResult {
        let payload = serde_json::to_vec(message).map_err(|e| DispatchError(e.to_string()))?;
        let (reply, result) = mpsc::sync_channel(1);
        let stopped = || DispatchError("emailer publisher is not running".to_string());

        self.tx
            .send(Outgoing { payload, reply })
            .map_err(|_| stopped())?;
        result.recv().map_err(|_| stopped())?
    }
}

impl EmailDispatcher for ZmqSender {
    fn dispatch(&self, message: &CampaignDispatch) -> Result<(), DispatchError> {
        self.send_json(message)
    }
}
