pub mod banner;
pub mod footer;
pub mod header;
pub mod utils;

pub use banner::draw_banner;
pub use footer::draw_footer;
pub use header::draw_header;
pub use utils::{premium_badge, thumbnail_name, truncate};
