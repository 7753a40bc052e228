pub mod model;

pub use model::{load_image, Image};
