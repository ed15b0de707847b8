//! Interactive fractal tree driven by face tracking.
//!
//! A webcam watches the viewer. The largest detected face does two things:
//! - its position moves a virtual eye behind a real-world window, and an
//!   off-axis perspective camera is pointed through that window so the scene
//!   shifts with the viewer's head
//! - its size and horizontal position reshape a recursively drawn tree
//!
//! Each frame runs this pipeline:
//! 1. Grab a frame and find faces with a Haar cascade
//! 2. Map the most prominent face onto an eye position and update the camera
//! 3. Recompute the tree parameters from the face box
//! 4. Grow the tree and draw it through the head-coupled camera
//!
//! # Examples
//!
//! ## Growing a tree
//!
//! ```
//! use interactive_fractal_tree::{
//!     interaction::InteractionParams,
//!     palette::Background,
//!     tree::grow_tree,
//! };
//! use nalgebra::Point2;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = InteractionParams::from_face(80.0, 150.0);
//! let palette = params.palette(Background::Dark);
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let segments = grow_tree(Point2::new(512.0, 768.0), &params, &palette, 2.0, &mut rng)?;
//! println!("{} branches", segments.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Head-coupled projection
//!
//! ```
//! use interactive_fractal_tree::off_axis::{OffAxisCamera, ViewWindow};
//! use nalgebra::Point3;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let window = ViewWindow::centered(0.3, 0.2);
//! let mut camera = OffAxisCamera::default();
//! camera.set_position(Point3::new(0.05, 0.02, 0.4));
//! camera.look_through(&window)?;
//!
//! // Window corners always land on the screen corners
//! let corner = camera.project(&window.top_left).expect("in front of the eye");
//! assert!((corner.x + 1.0).abs() < 1e-9 && (corner.y - 1.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the application
//!
//! ```no_run
//! use interactive_fractal_tree::{
//!     app::{AppConfig, GuiMode, TreeApp},
//!     config::Config,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = AppConfig {
//!     config: Config::default(),
//!     gui_mode: GuiMode::All,
//!     max_frames: None,
//! };
//! let mut app = TreeApp::new(settings)?;
//! app.run()?;
//! # Ok(())
//! # }
//! ```

/// Update / draw / key loop
pub mod app;

/// Webcam and video file input
pub mod capture;

/// YAML configuration
pub mod config;

/// Constants used throughout the application
pub mod constants;

/// Error types for the crate
pub mod error;

/// Face detection with a Haar cascade
pub mod face_detection;

/// Eye position tracking and camera update
pub mod head_tracker;

/// Bounded history of head positions
pub mod history;

/// Face box to tree parameter mapping
pub mod interaction;

/// Off-axis perspective projection
pub mod off_axis;

/// Background and branch color palettes
pub mod palette;

/// Canvas drawing
pub mod render;

/// Recursive tree generation
pub mod tree;

/// Utility functions
pub mod utils;

pub use error::{Error, Result};
