pub mod click;

pub use click::ClickHandlerView;
