//! Delivery channels and the registry that binds each to its collaborators

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{DomainError, DomainResult};

use super::traits::{CodeGenerator, EntryStore, NotificationDispatcher};

/// Named delivery mechanism a code can be sent through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    /// Every channel the service knows how to name
    pub const ALL: [Channel; 2] = [Channel::Email, Channel::Sms];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            _ => Err(DomainError::UnsupportedChannel {
                channel: s.to_string(),
            }),
        }
    }
}

/// The generator, store and dispatcher used for one channel
#[derive(Clone)]
pub struct ChannelBackend {
    generator: Arc<dyn CodeGenerator>,
    store: Arc<dyn EntryStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl ChannelBackend {
    pub fn new(
        generator: Arc<dyn CodeGenerator>,
        store: Arc<dyn EntryStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            generator,
            store,
            dispatcher,
        }
    }

    pub fn generator(&self) -> &dyn CodeGenerator {
        self.generator.as_ref()
    }

    pub fn store(&self) -> &dyn EntryStore {
        self.store.as_ref()
    }

    pub fn dispatcher(&self) -> &dyn NotificationDispatcher {
        self.dispatcher.as_ref()
    }
}

impl fmt::Debug for ChannelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBackend")
            .field("generator", &self.generator.strategy_name())
            .finish_non_exhaustive()
    }
}

/// Channels configured at startup
///
/// A channel name that parses but was never registered is as unsupported as
/// one that does not parse.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    backends: HashMap<Channel, ChannelBackend>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend, returning the one it replaced
    pub fn register(&mut self, channel: Channel, backend: ChannelBackend) -> Option<ChannelBackend> {
        self.backends.insert(channel, backend)
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_channel(mut self, channel: Channel, backend: ChannelBackend) -> Self {
        self.register(channel, backend);
        self
    }

    /// Look up the backend for a channel name
    pub fn resolve(&self, name: &str) -> DomainResult<(Channel, &ChannelBackend)> {
        let channel: Channel = name.parse()?;
        self.backends
            .get(&channel)
            .map(|backend| (channel, backend))
            .ok_or_else(|| DomainError::UnsupportedChannel {
                channel: name.to_string(),
            })
    }

    pub fn is_registered(&self, channel: Channel) -> bool {
        self.backends.contains_key(&channel)
    }

    /// Registered channels in declaration order
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| self.backends.contains_key(channel))
            .collect()
    }
}
