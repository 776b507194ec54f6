//! Real (non-test) implementations of the host traits, built on tokio UDP
//! sockets the way the teacher's `NetworkManager` wires up multicast: one
//! socket, a background receive task feeding an `mpsc` channel, and
//! `serde_json` framing for everything that goes on the wire.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant as StdInstant;

use async_trait::async_trait;
use rand::Rng;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::address::{Address, Duration as AhDuration, Instant as AhInstant};
use crate::ants::messages::ControlMessage;
use crate::error::{Result, RoutingError};
use crate::host::traits::{Clock, Network, RandomSource, Scheduler, TimerTag};

/// Wall-clock source anchored at process start, so the first `now()` call
/// reads close to zero -- convenient for logs and tests alike.
pub struct SystemClock {
    epoch: StdInstant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            epoch: StdInstant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> AhInstant {
        AhInstant(self.epoch.elapsed().as_nanos() as u64)
    }
}

/// `rand`-backed uniform source. `rand::thread_rng` is `!Send`, so this
/// wraps a reseedable generator behind a mutex instead of reaching for TLS.
pub struct ThreadRandomSource {
    inner: Mutex<rand::rngs::StdRng>,
}

impl ThreadRandomSource {
    pub fn new() -> Self {
        use rand::SeedableRng;
        ThreadRandomSource {
            inner: Mutex::new(rand::rngs::StdRng::from_entropy()),
        }
    }
}

impl Default for ThreadRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandomSource {
    fn uniform_f64(&self) -> f64 {
        self.inner.lock().unwrap().gen::<f64>()
    }

    fn uniform_int(&self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.inner.lock().unwrap().gen_range(lo..hi)
    }
}

/// One UDP socket per interface, addressed by a small integer index the way
/// the original module tracks `m_ipv4` interface numbers.
pub struct TokioNetwork {
    sockets: HashMap<u32, Arc<UdpSocket>>,
    /// Address each interface's broadcast sends land on (its subnet
    /// broadcast or a multicast group, depending on how the host was set
    /// up -- opaque to this type).
    broadcast_targets: HashMap<u32, std::net::SocketAddr>,
    port: u16,
}

impl TokioNetwork {
    pub async fn bind(interfaces: &[(u32, std::net::Ipv4Addr, std::net::SocketAddr)], port: u16) -> Result<Self> {
        let mut sockets = HashMap::new();
        let mut broadcast_targets = HashMap::new();
        for (iface, bind_addr, broadcast) in interfaces {
            let socket = UdpSocket::bind((*bind_addr, port)).await?;
            socket.set_broadcast(true)?;
            sockets.insert(*iface, Arc::new(socket));
            broadcast_targets.insert(*iface, *broadcast);
        }
        Ok(TokioNetwork {
            sockets,
            broadcast_targets,
            port,
        })
    }

    fn encode(msg: &ControlMessage) -> Result<Vec<u8>> {
        serde_json::to_vec(msg).map_err(|e| RoutingError::Codec(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<ControlMessage> {
        serde_json::from_slice(bytes).map_err(|e| RoutingError::Codec(e.to_string()))
    }

    /// Spawns one background task per interface that decodes inbound
    /// datagrams and hands them to `output`, the way the teacher's
    /// `NetworkManager` feeds its receive `mpsc` channel from a background
    /// task per socket.
    pub fn spawn_receivers(&self, output: mpsc::UnboundedSender<(u32, Address, ControlMessage)>) {
        for (&iface, socket) in &self.sockets {
            let socket = Arc::clone(socket);
            let output = output.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 65536];
                loop {
                    match socket.recv_from(&mut buf).await {
                        Ok((len, from)) => {
                            if let Ok(msg) = Self::decode(&buf[..len]) {
                                let from_addr = match from.ip() {
                                    std::net::IpAddr::V4(v4) => Address(v4),
                                    std::net::IpAddr::V6(_) => continue,
                                };
                                if output.send((iface, from_addr, msg)).is_err() {
                                    return;
                                }
                            }
                        }
                        Err(_) => return,
                    }
                }
            });
        }
    }
}

#[async_trait]
impl Network for TokioNetwork {
    async fn send(&self, iface: u32, to: Address, msg: ControlMessage) {
        let Ok(bytes) = Self::encode(&msg) else {
            return;
        };
        if let Some(socket) = self.sockets.get(&iface) {
            let _ = socket.send_to(&bytes, (to.0, self.port)).await;
        }
    }

    async fn broadcast(&self, msg: ControlMessage) {
        let Ok(bytes) = Self::encode(&msg) else {
            return;
        };
        for (iface, socket) in &self.sockets {
            if let Some(target) = self.broadcast_targets.get(iface) {
                let _ = socket.send_to(&bytes, *target).await;
            }
        }
    }
}

/// Dispatches scheduled timer firings onto an `mpsc` channel, decoupling
/// "what runs next" (the `TimerLoop` in `timers.rs`) from "how sleeping is
/// implemented" (tokio).
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<TimerTag>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerTag>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            TokioScheduler {
                sender,
                next_id: AtomicU64::new(0),
            },
            receiver,
        )
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn schedule_after(&self, delay: AhDuration, tag: TimerTag) {
        self.next_id.fetch_add(1, Ordering::Relaxed);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from(delay)).await;
            let _ = sender.send(tag);
        });
    }
}
