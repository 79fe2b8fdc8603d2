//! Marker types.

/// Marker type describing the last time an entity was touched.
#[derive(Clone, Copy, Debug)]
pub struct Touch;
