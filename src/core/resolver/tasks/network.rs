use std::net::IpAddr;
use std::time::Instant;

use reqwest::blocking::Client;
use sysinfo::Networks;

use crate::core::config::{PublicIpConfig, MAX_PUBLIC_IP_TIMEOUT};
use crate::core::resolver::meter::RateMeter;
use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::NetworkLoad;
use crate::error::{ResolverError, Result};
use crate::platform::linux::{self, Route};
use crate::utils::units::{decimal, mb_floor, mbits, text};

/// Bounded lookup of the host's public address
pub struct PublicIpLookup {
    client: Client,
    url: String,
}

impl PublicIpLookup {
    pub fn new(config: &PublicIpConfig) -> Result<Self> {
        let timeout = config.timeout.min(MAX_PUBLIC_IP_TIMEOUT);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("resolverd/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Public address, or `None` on any failure
    pub fn fetch(&self) -> Option<String> {
        match self.try_fetch() {
            Ok(ip) => Some(ip),
            Err(e) => {
                log::debug!(target: "resolver::task::network", "public ip lookup: {}", e);
                None
            }
        }
    }

    fn try_fetch(&self) -> Result<String> {
        let body = self
            .client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .text()?;

        let body = body.trim();
        body.parse::<IpAddr>()
            .map(|ip| ip.to_string())
            .map_err(|_| ResolverError::parse(format!("not an address: {:?}", body)))
    }
}

/// Default route state, interface counters and their rates
pub struct NetworkLoadTask {
    networks: Networks,
    probe: String,
    route: fn(&str) -> Result<Option<Route>>,
    public_ip: Option<PublicIpLookup>,
    interface: Option<String>,
    sent: RateMeter,
    recv: RateMeter,
}

impl NetworkLoadTask {
    pub fn new(probe: impl Into<String>, public_ip: Option<PublicIpLookup>) -> Self {
        Self::with_route(probe, public_ip, linux::route_get)
    }

    /// Task resolving the active route through `route` instead of `ip route`
    pub fn with_route(
        probe: impl Into<String>,
        public_ip: Option<PublicIpLookup>,
        route: fn(&str) -> Result<Option<Route>>,
    ) -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            probe: probe.into(),
            route,
            public_ip,
            interface: None,
            sent: RateMeter::new(),
            recv: RateMeter::new(),
        }
    }

    fn forget_interface(&mut self) {
        self.interface = None;
        self.sent.reset();
        self.recv.reset();
    }
}

impl MetricTask for NetworkLoadTask {
    type Output = NetworkLoad;

    fn name(&self) -> &'static str {
        "network"
    }

    fn resolve(&mut self) -> Result<NetworkLoad> {
        let Some(route) = (self.route)(&self.probe)? else {
            self.forget_interface();
            return Ok(NetworkLoad::down());
        };

        // Counters of a different interface are unrelated to the baseline
        if self.interface.as_deref() != Some(route.interface.as_str()) {
            self.forget_interface();
            self.interface = Some(route.interface.clone());
        }

        self.networks.refresh(true);
        let data = self.networks.get(&route.interface).ok_or_else(|| {
            ResolverError::sensor_unavailable(format!(
                "no counters for interface {}",
                route.interface
            ))
        })?;

        let counters = InterfaceCounters {
            sent: data.total_transmitted(),
            recv: data.total_received(),
            packets_sent: data.total_packets_transmitted(),
            packets_recv: data.total_packets_received(),
        };

        let now = Instant::now();
        self.sent.update_at(counters.sent, now);
        self.recv.update_at(counters.recv, now);

        let public_ip = self.public_ip.as_ref().and_then(PublicIpLookup::fetch);

        Ok(network_load(
            &route,
            &counters,
            self.sent.speed(),
            self.recv.speed(),
            public_ip,
        ))
    }
}

struct InterfaceCounters {
    sent: u64,
    recv: u64,
    packets_sent: u64,
    packets_recv: u64,
}

fn network_load(
    route: &Route,
    counters: &InterfaceCounters,
    sent_speed: f64,
    recv_speed: f64,
    public_ip: Option<String>,
) -> NetworkLoad {
    NetworkLoad {
        up: true,
        name: text(&route.interface),
        ip: route.local_ip.clone(),
        public_ip,
        sent: Some(mb_floor(counters.sent)),
        recv: Some(mb_floor(counters.recv)),
        packets_sent: Some(counters.packets_sent),
        packets_recv: Some(counters.packets_recv),
        upspeed: Some(decimal(mbits(sent_speed), 2)),
        downspeed: Some(decimal(mbits(recv_speed), 2)),
    }
}
