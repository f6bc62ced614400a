//! Waits for the freshly configured resolvers to answer.

use crate::backend::traits::NameResolver;
use std::{net::Ipv4Addr, time::Duration};
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Vec<Ipv4Addr>),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PollState {
    Polling,
    Done(Resolution),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub resolution: Resolution,
    pub attempts: u32,
    pub elapsed: Duration,
}

pub struct Verifier<'a, R> {
    resolver: &'a R,
    host: &'a str,
    interval: Duration,
    timeout: Duration,
}

impl<'a, R: NameResolver> Verifier<'a, R> {
    pub fn new(resolver: &'a R, host: &'a str, interval: Duration, timeout: Duration) -> Self {
        Self {
            resolver,
            host,
            interval,
            timeout,
        }
    }

    /// Polls until resolved or out of time. Finishes no later than
    /// `timeout + interval` after the call, however slow lookups are.
    pub async fn run(&self) -> Verdict {
        let started = Instant::now();
        let hard_deadline = started + self.timeout + self.interval;
        let mut attempts = 0;

        let resolution = loop {
            if let PollState::Done(resolution) =
                self.step(started, hard_deadline, &mut attempts).await
            {
                break resolution;
            }
        };

        Verdict {
            resolution,
            attempts,
            elapsed: started.elapsed(),
        }
    }

    async fn step(&self, started: Instant, hard_deadline: Instant, attempts: &mut u32) -> PollState {
        if started.elapsed() >= self.timeout {
            return PollState::Done(Resolution::TimedOut);
        }

        sleep(self.interval).await;
        *attempts += 1;

        match timeout_at(hard_deadline, self.resolver.lookup_a(self.host)).await {
            Ok(Ok(addrs)) if !addrs.is_empty() => {
                info!(host = self.host, attempt = *attempts, "name resolved");
                PollState::Done(Resolution::Resolved(addrs))
            }
            Ok(Ok(_)) => {
                debug!(host = self.host, attempt = *attempts, "no A records yet");
                PollState::Polling
            }
            Ok(Err(e)) => {
                debug!(host = self.host, attempt = *attempts, error = %e, "lookup failed");
                PollState::Polling
            }
            Err(_) => {
                debug!(host = self.host, attempt = *attempts, "lookup ran past the deadline");
                PollState::Polling
            }
        }
    }
}
