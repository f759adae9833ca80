use serde_json::{Map, Value};

/// Company overview metrics exactly as the provider reported them.
///
/// The overview endpoint returns dozens of loosely typed metrics (name,
/// sector, ratios, 52-week levels, ...) whose set changes over time, so the
/// record is passed through unmodified rather than mapped onto a fixed struct.
/// Values are strings or numbers keyed by the provider's metric names.
pub type Fundamentals = Map<String, Value>;
