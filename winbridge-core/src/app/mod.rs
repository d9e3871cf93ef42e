/// Contains the [AppContext](context::AppContext) shared with native adapters.
pub mod context;

/// Portable events delivered to the window layer.
pub mod event;

/// Contains the [AppHandler](handler::AppHandler) dispatching native events.
pub mod handler;

/// Pluggable modal exemption rules.
pub mod modal;

/// The window registry and the modal stack.
pub mod registry;

/// Active touch point tracking.
pub mod touch;

/// Contains the [UpdateManager](update::UpdateManager) and [Update](update::Update) flags.
pub mod update;

/// The [WindowHandler](window_handler::WindowHandler) seam to the window layer.
pub mod window_handler;
