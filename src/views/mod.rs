//! View state for the admin screens: lists, details, forms and notices.

pub mod detail;
pub mod form;
pub mod list;
pub mod notice;
pub mod render;

pub use detail::{DetailState, DetailView};
pub use form::{submit_create, submit_update, ComponentForm, OrderForm, QuotationForm, RecordForm};
pub use list::{ListView, LoadState};
pub use notice::{Notice, NoticeLevel};
pub use render::Render;
