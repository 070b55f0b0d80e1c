pub mod camera;
pub mod error;
pub mod geometry;
pub mod models;
pub mod refrac;

pub use camera::{BogusParamsOptions, Camera, CameraId, INVALID_CAMERA_ID};
pub use error::{ParamsError, RcmError, Result};
pub use geometry::{Ray3D, Rigid3d};
pub use models::{CameraModel, CameraModelId};
pub use refrac::{CameraRefracModelId, RefracModel};
