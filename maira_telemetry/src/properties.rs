//! Output boundary towards the host dashboard

use crate::snapshot::TelemetryValue;
use std::collections::BTreeMap;

/// Receiver of named telemetry values, implemented by the host dashboard
pub trait PropertySink {
    /// Publish one named value; called once per property per poll
    fn set(&mut self, name: &str, value: TelemetryValue);
}

/// Map-backed sink for tests and console tooling
#[derive(Debug, Default)]
pub struct PropertyBag {
    values: BTreeMap<String, TelemetryValue>,
}

impl PropertyBag {
    /// Empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the named property, if published
    pub fn get(&self, name: &str) -> Option<&TelemetryValue> {
        self.values.get(name)
    }

    /// All published properties, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TelemetryValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of published properties
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing has been published yet
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertySink for PropertyBag {
    fn set(&mut self, name: &str, value: TelemetryValue) {
        self.values.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_keeps_latest_value() {
        let mut bag = PropertyBag::new();
        bag.set("tickCount", TelemetryValue::I32(1));
        bag.set("tickCount", TelemetryValue::I32(2));
        assert_eq!(bag.get("tickCount"), Some(&TelemetryValue::I32(2)));
        assert_eq!(bag.len(), 1);
    }
}
