pub mod commands;
pub mod shared_str;
pub mod style;
pub mod types;

pub use commands::RenderCommand;
pub use shared_str::SharedStr;
pub use style::{CompositeOp, FontSpec, TextAlign, TextBaseline};
pub use types::{Color, Point, Rect, Viewport};
