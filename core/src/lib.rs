//! Root of the `rapid-select-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the host's renderer.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod cache;
pub mod config;
mod debounce;
pub mod error;
pub mod event;
pub mod navigator;
pub mod pagination;
pub mod request;
pub mod selection;
pub mod transport;
mod types;
mod widget;

pub use cache::ResultCache;
pub use config::ConfigOverrides;
pub use config::SelectConfig;
pub use debounce::Debouncer;
pub use debounce::QueryDebouncer;
pub use error::Result;
pub use error::SelectError;
pub use event::SelectEvent;
pub use event::SelectEventSender;
pub use event::WidgetEvent;
pub use event::WidgetEventReceiver;
pub use navigator::KeyboardNavigator;
pub use navigator::SelectKey;
pub use request::FetchToken;
pub use request::RequestController;
pub use selection::SelectMode;
pub use selection::SelectionModel;
pub use transport::OptionsTransport;
pub use transport::PageLoader;
pub use transport::load_page;
pub use types::Query;
pub use types::ResultPage;
pub use types::SelectOption;
pub use widget::SelectWidget;
pub use widget::WidgetView;
