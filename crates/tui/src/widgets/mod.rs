//! Dashboard widgets.
//!
//! Every render function returns `Result<(), RenderError>` so a fault ends up
//! in the app's error boundary instead of a panic.

pub mod agents;
pub mod command_composer;
pub mod console;
pub mod dashboard;
pub mod detail_view;

pub use command_composer::CommandComposer;
pub use detail_view::DetailView;
