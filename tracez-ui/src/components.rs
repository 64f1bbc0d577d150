pub mod page;
pub mod styles;

pub use page::TracezPage;
