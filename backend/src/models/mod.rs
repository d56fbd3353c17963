pub mod prefecture_rating;
pub mod shared_map;
pub mod visit;
