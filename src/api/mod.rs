pub mod clarifai_api;

pub use clarifai_api::{ClarifaiClient, FaceDetector};
