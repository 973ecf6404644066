//! Concrete builders.
//!
//! ```text
//! BuilderApi
//!   ├── LocalBuilder  "local"  config, setting, project  (filesystem)
//!   └── NullBuilder   "null"   config, setting, command, project  (no-op fallback)
//! ```

pub mod local;
pub mod null;

pub use local::LocalBuilder;
pub use null::NullBuilder;
