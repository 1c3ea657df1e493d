//! Dear ImGui Bindings
//!
//! Layout mirrors, views and a typed function table for the subset of cimgui
//! this crate wraps. Everything here is built from the generic machinery in
//! [`view`](crate::view), [`marshal`](crate::marshal) and
//! [`dispatch`](crate::dispatch).
//!
//! # Example
//!
//! ```rust,no_run
//! use cimgui_interop::config::InteropConfig;
//! use cimgui_interop::imgui::{self, ImVec2};
//!
//! let config = InteropConfig::load_from_cwd()?;
//! let (_dispatcher, ui) = imgui::init(&config)?;
//! let context = ui.create_context();
//! if ui.begin("Hello", None, 0) {
//!     ui.text("cimgui via Rust");
//!     ui.button("OK", ImVec2::new(0.0, 0.0));
//! }
//! ui.end();
//! unsafe { ui.destroy_context(context) };
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod api;
mod types;
mod views;

pub use api::{ImGuiApi, ImGuiFunctions};
pub use types::{
    ImDrawCallback, ImDrawCmd, ImDrawCmdHeader, ImDrawData, ImDrawIdx, ImDrawList, ImDrawListSharedData,
    ImDrawListSplitter, ImDrawVert, ImFontAtlas, ImGuiContext, ImGuiTextFilter, ImGuiTextRange, ImVec2, ImVec4,
    TEXT_FILTER_INPUT_LEN,
};

use crate::config::InteropConfig;
use crate::dispatch::{self, Dispatcher};
use crate::error::InteropResult;
use crate::layout::DeclaredLayout;

/// Struct sizes checked against the library's size query at startup.
pub fn declared_layouts() -> Vec<DeclaredLayout> {
    vec![
        DeclaredLayout::of::<ImVec2>(),
        DeclaredLayout::of::<ImVec4>(),
        DeclaredLayout::of::<ImDrawVert>(),
        DeclaredLayout::of::<ImDrawCmd>(),
        DeclaredLayout::of::<ImDrawList>(),
        DeclaredLayout::of::<ImDrawData>(),
        DeclaredLayout::of::<ImGuiTextRange>(),
        DeclaredLayout::of::<ImGuiTextFilter>(),
    ]
}

/// Select the process-wide dispatcher for the ImGui bindings and bind the
/// function table from it.
pub fn init(config: &InteropConfig) -> InteropResult<(&'static Dispatcher, ImGuiApi)> {
    let dispatcher = dispatch::select_implementation(config, ImGuiFunctions::SYMBOLS, &declared_layouts())?;
    let api = ImGuiApi::load(dispatcher)?;
    Ok((dispatcher, api))
}
