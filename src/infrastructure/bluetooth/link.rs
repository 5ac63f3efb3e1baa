use crate::domain::connection::{Connection, ConnectionError};
use crate::domain::models::BluetoothCommand;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handle to the Bluetooth worker.
///
/// Writes are queued and return immediately; delivery failures come back
/// asynchronously as log events.
#[derive(Clone)]
pub struct BleLink {
    commands: mpsc::UnboundedSender<BluetoothCommand>,
    connected: Arc<AtomicBool>,
}

impl BleLink {
    pub fn new(
        commands: mpsc::UnboundedSender<BluetoothCommand>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            commands,
            connected,
        }
    }

    /// Queue a non-write command (scan, connect, disconnect)
    pub fn request(&self, command: BluetoothCommand) -> Result<(), ConnectionError> {
        self.commands
            .send(command)
            .map_err(|_| ConnectionError::SendRejected("Bluetooth worker stopped".to_string()))
    }
}

impl Connection for BleLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::NotConnected);
        }
        self.request(BluetoothCommand::Write(frame.to_vec()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(connected: bool) -> (BleLink, mpsc::UnboundedReceiver<BluetoothCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (BleLink::new(tx, Arc::new(AtomicBool::new(connected))), rx)
    }

    #[test]
    fn test_send_queues_write() {
        let (mut link, mut rx) = link(true);
        link.send(b"1:2:0\n").unwrap();

        match rx.try_recv() {
            Ok(BluetoothCommand::Write(bytes)) => assert_eq!(bytes, b"1:2:0\n"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_send_while_disconnected() {
        let (mut link, mut rx) = link(false);
        assert_eq!(link.send(b"0:0:0\n"), Err(ConnectionError::NotConnected));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_worker_stopped() {
        let (mut link, rx) = link(true);
        drop(rx);
        assert!(matches!(
            link.send(b"0:0:0\n"),
            Err(ConnectionError::SendRejected(_))
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let (link, _rx) = link(false);
        let other = link.clone();
        link.connected.store(true, Ordering::SeqCst);
        assert!(other.is_connected());
    }
}
