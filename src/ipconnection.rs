use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::packet::{Header, Packet, Request, HEADER_LEN, MAX_PACKET_LEN};
use crate::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2500);

type Callback = dyn Fn(&[u8]) + Send + Sync;
type Callbacks = Arc<Mutex<HashMap<(u32, u8), Vec<Arc<Callback>>>>>;

/// Handle to a TCP connection with the hub daemon.
///
/// Cloning is cheap and every clone talks over the same socket. Device
/// proxies keep a clone so they can be moved into callback handlers.
#[derive(Clone)]
pub struct IpConnection {
    inner: Arc<Inner>,
}

struct Inner {
    timeout: Duration,
    socket: Mutex<Option<Socket>>,
    callbacks: Callbacks,
}

struct Socket {
    writer: TcpStream,
    responses: Receiver<Packet>,
    sequence_number: u8,
    /// Set once the receive thread has stopped reading.
    closed: Arc<AtomicBool>,
    receive_thread: JoinHandle<()>,
    callback_thread: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking handler must not take the whole connection down with it.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for IpConnection {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl IpConnection {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                timeout,
                socket: Mutex::new(None),
                callbacks: Arc::default(),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.inner.socket)
            .as_ref()
            .is_some_and(|socket| !socket.is_closed())
    }

    pub fn connect(&self, host: &str, port: u16) -> Result<(), Error> {
        let dead = {
            let mut socket = lock(&self.inner.socket);
            if socket.as_ref().is_some_and(Socket::is_closed) {
                socket.take()
            } else {
                None
            }
        };
        if let Some(dead) = dead {
            dead.close();
        }

        let mut socket = lock(&self.inner.socket);
        if socket.is_some() {
            return Err(Error::AlreadyConnected);
        }

        let writer = TcpStream::connect((host, port))?;
        writer.set_nodelay(true)?;
        let reader = writer.try_clone()?;
        info!("Connected to {host}:{port}");

        let (response_tx, responses) = mpsc::channel();
        let (callback_tx, callback_rx) = mpsc::channel();

        let closed = Arc::new(AtomicBool::new(false));
        let receive_closed = Arc::clone(&closed);
        let receive_thread = thread::Builder::new()
            .name("ipcon-receive".into())
            .spawn(move || {
                receive_loop(reader, response_tx, callback_tx);
                receive_closed.store(true, Ordering::Release);
            })?;

        let callbacks = Arc::clone(&self.inner.callbacks);
        let callback_thread = thread::Builder::new()
            .name("ipcon-callback".into())
            .spawn(move || callback_loop(callback_rx, callbacks))?;

        *socket = Some(Socket {
            writer,
            responses,
            sequence_number: 0,
            closed,
            receive_thread,
            callback_thread,
        });
        Ok(())
    }

    /// Close the socket, wait for the receive and callback threads and drop
    /// every registered handler.
    ///
    /// Handlers usually hold clones of this connection, so they keep it alive
    /// until this runs.
    pub fn disconnect(&self) -> Result<(), Error> {
        let Some(socket) = lock(&self.inner.socket).take() else {
            return Err(Error::NotConnected);
        };
        socket.close();
        lock(&self.inner.callbacks).clear();
        info!("Disconnected");
        Ok(())
    }

    /// Register `handler` for packets sent by `uid` with `function_id` and
    /// sequence number 0.
    pub fn register_callback<F>(&self, uid: u32, function_id: u8, handler: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        lock(&self.inner.callbacks)
            .entry((uid, function_id))
            .or_default()
            .push(Arc::new(handler));
    }

    /// Send a request, and wait for its response if one is expected.
    pub(crate) fn send(&self, request: Request) -> Result<Option<Vec<u8>>, Error> {
        let mut guard = lock(&self.inner.socket);
        let socket = guard.as_mut().ok_or(Error::NotConnected)?;
        if socket.is_closed() {
            return Err(Self::discard(guard));
        }

        socket.sequence_number = socket.sequence_number % 15 + 1;
        let sequence_number = socket.sequence_number;
        let bytes = request.encode(sequence_number);
        debug!(
            "Request uid:{} fid:{} seq:{} len:{}",
            request.uid(),
            request.function_id(),
            sequence_number,
            bytes.len()
        );
        if let Err(e) = socket.writer.write_all(&bytes) {
            return Err(match e.kind() {
                ErrorKind::BrokenPipe
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted => {
                    warn!("Connection lost: {e}");
                    Self::discard(guard)
                }
                _ => e.into(),
            });
        }

        if !request.response_expected() {
            return Ok(None);
        }

        let deadline = Instant::now() + self.inner.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let packet = match socket.responses.recv_timeout(remaining) {
                Ok(packet) => packet,
                Err(RecvTimeoutError::Timeout) => return Err(Error::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Err(Self::discard(guard)),
            };

            let header = packet.header;
            if header.uid != request.uid()
                || header.function_id != request.function_id()
                || header.sequence_number != sequence_number
            {
                // Late answer to a request that already timed out.
                warn!(
                    "Dropping unmatched response uid:{} fid:{} seq:{}",
                    header.uid, header.function_id, header.sequence_number
                );
                continue;
            }

            packet.check_error()?;
            return Ok(Some(packet.payload));
        }
    }

    /// Tear down a socket the hub has closed.
    fn discard(mut guard: MutexGuard<'_, Option<Socket>>) -> Error {
        let socket = guard.take();
        drop(guard);
        if let Some(socket) = socket {
            socket.close();
        }
        Error::NotConnected
    }
}

impl Socket {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn close(self) {
        // Unblocks the receive thread, which in turn ends the callback thread.
        if let Err(e) = self.writer.shutdown(Shutdown::Both) {
            debug!("Socket shutdown failed: {e}");
        }
        drop(self.responses);

        let current = thread::current().id();
        for handle in [self.receive_thread, self.callback_thread] {
            if handle.thread().id() == current {
                // Disconnecting from inside a handler; the thread exits on its own.
                continue;
            }
            if handle.join().is_err() {
                error!("Connection thread panicked");
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let socket = self
            .socket
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(socket) = socket {
            socket.close();
        }
    }
}

fn read_packet(stream: &mut impl Read) -> std::io::Result<Packet> {
    let mut header_bytes = [0u8; HEADER_LEN];
    stream.read_exact(&mut header_bytes)?;
    let header = Header::decode(&header_bytes);

    if (header.length as usize) < HEADER_LEN || (header.length as usize) > MAX_PACKET_LEN {
        return Err(std::io::Error::new(
            ErrorKind::InvalidData,
            format!("invalid packet length {}", header.length),
        ));
    }

    let mut payload = vec![0u8; header.payload_len()];
    stream.read_exact(&mut payload)?;
    Ok(Packet { header, payload })
}

fn receive_loop(mut reader: TcpStream, responses: Sender<Packet>, callbacks: Sender<Packet>) {
    loop {
        let packet = match read_packet(&mut reader) {
            Ok(packet) => packet,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                info!("Connection closed");
                return;
            }
            Err(e) => {
                // Also the normal way out after `disconnect` shuts the socket down.
                debug!("Receive loop stopped: {e}");
                return;
            }
        };

        let header = packet.header;
        debug!(
            "Received uid:{} fid:{} seq:{} len:{}",
            header.uid, header.function_id, header.sequence_number, header.length
        );

        let target = if header.is_callback() {
            &callbacks
        } else {
            &responses
        };
        if target.send(packet).is_err() {
            return;
        }
    }
}

fn callback_loop(packets: Receiver<Packet>, callbacks: Callbacks) {
    for packet in packets {
        let key = (packet.header.uid, packet.header.function_id);
        // Clone the handlers out so a handler may register further callbacks.
        let handlers = lock(&callbacks).get(&key).cloned().unwrap_or_default();
        if handlers.is_empty() {
            debug!("No handler for callback uid:{} fid:{}", key.0, key.1);
        }
        for handler in handlers {
            handler(&packet.payload);
        }
    }
}
