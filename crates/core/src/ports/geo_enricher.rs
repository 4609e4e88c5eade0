//! The `GeoEnricher` port: point-in-polygon lookup against static layers.

use mds_domain::GeoLayer;

/// Resolves a `(longitude, latitude)` point to the identifying property of
/// whichever feature in `layer` contains it. Implementations are expected to
/// be synchronous, in-memory spatial indexes (no I/O per lookup), so this
/// port is not `async`.
pub trait GeoEnricherPort: Send + Sync {
    /// Returns the containing feature's identifier, or `None` if the point
    /// falls outside every feature in the layer.
    fn lookup(&self, longitude: f64, latitude: f64, layer: GeoLayer) -> Option<String>;
}
