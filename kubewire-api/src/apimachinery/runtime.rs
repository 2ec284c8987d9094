//! Embedded objects of unknown type.
use kubewire_core::wire_object;

wire_object! {
    /// An embedded object whose schema is decided at runtime, such as a driver's opaque
    /// configuration. Every key is kept as written.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct RawExtension {
        ..object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubewire_core::codec::{from_value, to_value};
    use serde_json::json;

    #[test]
    fn keeps_everything() {
        let raw = json!({"apiVersion": "gpu.example.com/v1", "kind": "Config", "sharing": {"strategy": "TimeSlicing"}});
        let ext: RawExtension = from_value(raw.clone()).unwrap();
        assert_eq!(ext.object.len(), 3);
        assert_eq!(to_value(&ext).unwrap(), raw);
    }
}
