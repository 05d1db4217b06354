//! Instance-to-channel resolution.

use std::collections::HashMap;

/// Read-only view over the configured instance -> Discord channel mapping.
///
/// An unmapped instance is intentionally not relayed; resolution returning
/// `None` is not an error condition.
#[derive(Debug, Clone)]
pub struct ChannelResolver {
    channels: HashMap<String, u64>,
}

impl ChannelResolver {
    pub fn new(channels: HashMap<String, u64>) -> Self {
        Self { channels }
    }

    pub fn resolve(&self, instance_name: &str) -> Option<u64> {
        self.channels.get(instance_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mapped_instance() {
        let mut channels = HashMap::new();
        channels.insert("S1".to_string(), 42);
        let resolver = ChannelResolver::new(channels);

        assert_eq!(resolver.resolve("S1"), Some(42));
    }

    #[test]
    fn test_unmapped_instance_is_none() {
        let resolver = ChannelResolver::new(HashMap::new());
        assert_eq!(resolver.resolve("S9"), None);
    }
}
