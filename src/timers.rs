//! Periodic jobs driving the protocol forward between data-path events:
//! hello diffusion, proactive ant launches for active sessions, and the
//! neighbor/destination expiry sweep. Grounded in `anthocnet.cc`'s
//! `HelloTimerExpire`/`PrAntTimerExpire`/`NBExpire`, each of which
//! reschedules itself with a little extra jitter on top of the fixed
//! interval.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::address::Duration;
use crate::ants::messages::ControlMessage;
use crate::ants::state_machine::AntOutcome;
use crate::facade::ProtocolFacade;
use crate::host::traits::{Clock, Network, RandomSource, Scheduler, TimerTag};

/// Sends every outcome a facade call produced, recursing into
/// `handle_control_message` for anything a `Send`/`Broadcast` provokes a
/// reply to is left to the caller -- this only ships bytes.
pub async fn dispatch_outcomes(network: &dyn Network, outcomes: Vec<AntOutcome>) {
    for outcome in outcomes {
        match outcome {
            AntOutcome::Send { iface, to, msg } => network.send(iface, to, msg).await,
            AntOutcome::Broadcast { msg } => network.broadcast(msg).await,
            AntOutcome::RouteDiscovered { .. } | AntOutcome::Dropped => {}
        }
    }
}

pub struct TimerLoop<T> {
    facade: Arc<Mutex<ProtocolFacade<T>>>,
    scheduler: Arc<dyn Scheduler>,
    network: Arc<dyn Network>,
    clock: Arc<dyn Clock>,
    rng: Arc<dyn RandomSource>,
}

impl<T: Send + 'static> TimerLoop<T> {
    pub fn new(
        facade: Arc<Mutex<ProtocolFacade<T>>>,
        scheduler: Arc<dyn Scheduler>,
        network: Arc<dyn Network>,
        clock: Arc<dyn Clock>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        TimerLoop {
            facade,
            scheduler,
            network,
            clock,
            rng,
        }
    }

    /// Kicks off the hello and proactive-ant timers. The neighbor/dest
    /// expiry sweep piggybacks on the hello interval the way the original
    /// runs its housekeeping from the same cadence.
    pub async fn start(&self) {
        let hello_interval = self.facade.lock().await.config.hello_interval;
        let pr_ant_interval = self.facade.lock().await.config.pr_ant_interval;
        self.scheduler.schedule_after(hello_interval, TimerTag::Hello).await;
        self.scheduler.schedule_after(pr_ant_interval, TimerTag::ProactiveAnt).await;
        self.scheduler.schedule_after(hello_interval, TimerTag::RoutingTableSweep).await;
    }

    /// Processes one fired timer tag and reschedules it. Intended to be
    /// driven in a loop by the host over the `Scheduler`'s firing channel.
    pub async fn handle_tag(&self, tag: TimerTag) {
        match tag {
            TimerTag::Hello => self.hello_timer_expire().await,
            TimerTag::ProactiveAnt => self.pr_ant_timer_expire().await,
            TimerTag::RoutingTableSweep => self.nb_expire().await,
        }
    }

    async fn hello_timer_expire(&self) {
        let now = self.clock.now();
        let (hello, interval, address) = {
            let mut facade = self.facade.lock().await;
            let count = facade.config.hello_diffusion_count;
            let address = facade.address;
            let hello = facade.routing_table.construct_hello_msg(address, count);
            (hello, facade.config.hello_interval, address)
        };
        let _ = address;
        self.network.broadcast(ControlMessage::Hello(hello)).await;

        let jitter = Duration::from_millis(self.rng.uniform_int(0, 20) as u64);
        self.scheduler
            .schedule_after(Duration(interval.as_nanos() + jitter.as_nanos()), TimerTag::Hello)
            .await;
    }

    async fn pr_ant_timer_expire(&self) {
        let now = self.clock.now();
        let (sessions, interval) = {
            let facade = self.facade.lock().await;
            let sessions = facade
                .routing_table
                .active_sessions(now, facade.config.session_expire);
            (sessions, facade.config.pr_ant_interval)
        };
        for dest in sessions {
            let outcomes = {
                let mut facade = self.facade.lock().await;
                facade.start_forward_ant(dest, now, true, &*self.rng)
            };
            dispatch_outcomes(&*self.network, outcomes).await;
        }

        let jitter = Duration::from_millis(self.rng.uniform_int(0, 30) as u64);
        self.scheduler
            .schedule_after(Duration(interval.as_nanos() + jitter.as_nanos()), TimerTag::ProactiveAnt)
            .await;
    }

    async fn nb_expire(&self) {
        let now = self.clock.now();
        let (expired, interval, address) = {
            let mut facade = self.facade.lock().await;
            let nb_expire = facade.config.nb_expire;
            let dst_expire = facade.config.dst_expire;
            let address = facade.address;
            let expired = facade.routing_table.update(now, nb_expire, dst_expire);
            (expired, facade.config.hello_interval, address)
        };

        for failed in expired {
            let msg = {
                let mut facade = self.facade.lock().await;
                facade.routing_table.process_neighbor_timeout(failed, address)
            };
            if msg.has_updates() {
                self.network.broadcast(ControlMessage::LinkFailure(msg)).await;
            }
        }

        self.scheduler.schedule_after(interval, TimerTag::RoutingTableSweep).await;
    }
}
