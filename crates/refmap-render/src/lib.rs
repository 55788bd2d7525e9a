pub mod frame;
pub mod hit;
pub mod links;
pub mod paint;

pub use frame::{Frame, Overlay, PreviewEnd};
pub use hit::{Hit, hit_test, hit_test_rect, link_at};
pub use links::LinkGeometry;
