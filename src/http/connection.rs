// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Connection manager selection for the underlying client

use std::time::Duration;

use reqwest::ClientBuilder;

/// Pooling strategy handed to the HTTP client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionManager {
    /// Keeps at most one idle connection per host. Suits a browser used
    /// from a single thread.
    Single,
    /// Shared pool for concurrent use
    Pooled {
        /// Idle connections kept per host
        max_idle_per_host: usize,
        /// How long idle connections are kept
        idle_timeout: Duration,
    },
}

impl ConnectionManager {
    /// Pooled manager with default limits
    pub fn pooled() -> Self {
        ConnectionManager::Pooled {
            max_idle_per_host: 32,
            idle_timeout: Duration::from_secs(90),
        }
    }

    /// Check if this manager is safe to share between threads
    pub fn is_thread_safe(&self) -> bool {
        matches!(self, ConnectionManager::Pooled { .. })
    }

    /// Apply the pooling limits to a client builder
    pub fn configure(&self, builder: ClientBuilder) -> ClientBuilder {
        match *self {
            ConnectionManager::Single => builder
                .pool_max_idle_per_host(1)
                .pool_idle_timeout(Duration::from_secs(30)),
            ConnectionManager::Pooled {
                max_idle_per_host,
                idle_timeout,
            } => builder
                .pool_max_idle_per_host(max_idle_per_host)
                .pool_idle_timeout(idle_timeout),
        }
    }
}

/// Chooses a connection manager for a browser
pub trait ConnectionManagerFactory: Send + Sync {
    /// Manager for a browser created with the given thread-safety flag
    fn new_manager(&self, thread_safe: bool) -> ConnectionManager;
}

/// Pooled for thread-safe browsers, single otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnectionManagerFactory;

impl ConnectionManagerFactory for DefaultConnectionManagerFactory {
    fn new_manager(&self, thread_safe: bool) -> ConnectionManager {
        if thread_safe {
            ConnectionManager::pooled()
        } else {
            ConnectionManager::Single
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factory() {
        let factory = DefaultConnectionManagerFactory;
        assert_eq!(factory.new_manager(false), ConnectionManager::Single);
        assert!(factory.new_manager(true).is_thread_safe());
    }

    #[test]
    fn test_configure_builds_client() {
        let builder = ConnectionManager::Single.configure(reqwest::Client::builder());
        assert!(builder.build().is_ok());
    }
}
