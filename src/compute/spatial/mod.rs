//! Distance, containment and box-extent computations.

pub mod algorithms;

pub use algorithms::{
    EARTH_RADIUS_METERS, enclosing_box, haversine_distance, is_point_in_polygon,
    is_point_in_ring,
};
