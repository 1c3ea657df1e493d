//! Typed call surface over the bound ImGui exports.

use std::ffi::c_char;
use std::marker::PhantomData;

use super::types::{ImDrawData, ImFontAtlas, ImGuiContext, ImVec2};
use crate::dispatch::Dispatcher;
use crate::error::InteropResult;
use crate::marshal;
use crate::view::TypedView;

crate::native_functions! {
    /// Raw cimgui entry points, one pointer per export.
    pub struct ImGuiFunctions {
        get_version = "igGetVersion": fn() -> *const c_char;
        create_context = "igCreateContext": fn(*mut ImFontAtlas) -> *mut ImGuiContext;
        destroy_context = "igDestroyContext": fn(*mut ImGuiContext);
        get_draw_data = "igGetDrawData": fn() -> *mut ImDrawData;
        begin = "igBegin": fn(*const c_char, *mut bool, i32) -> bool;
        end = "igEnd": fn();
        button = "igButton": fn(*const c_char, ImVec2) -> bool;
        text_unformatted = "igTextUnformatted": fn(*const c_char, *const c_char);
    }
}

/// Marshaling wrappers over [`ImGuiFunctions`].
///
/// Strings are passed through scoped buffers and returned addresses come
/// back as views. The library is single-threaded, so the table is `!Send`.
#[derive(Debug, Clone, Copy)]
pub struct ImGuiApi {
    functions: ImGuiFunctions,
    _not_send: PhantomData<*mut ()>,
}

impl ImGuiApi {
    /// Bind every entry from a dispatcher built with [`ImGuiFunctions::SYMBOLS`].
    pub fn load(dispatcher: &Dispatcher) -> InteropResult<Self> {
        // Safety: the declared signatures mirror cimgui.h
        let functions = unsafe { ImGuiFunctions::load(dispatcher)? };
        Ok(Self {
            functions,
            _not_send: PhantomData,
        })
    }

    pub fn functions(&self) -> &ImGuiFunctions {
        &self.functions
    }

    /// `IMGUI_VERSION` of the loaded binary.
    pub fn version(&self) -> String {
        // Safety: returns a static string or null
        unsafe { marshal::from_foreign((self.functions.get_version)(), None) }
    }

    /// Create a context with the default font atlas and make it current.
    pub fn create_context(&self) -> TypedView<ImGuiContext> {
        // Safety: null atlas asks the library for its own
        unsafe { TypedView::from_ptr((self.functions.create_context)(std::ptr::null_mut())) }
    }

    /// # Safety
    ///
    /// `context` must come from [`ImGuiApi::create_context`] and not be used
    /// afterwards, nor any view derived from it.
    pub unsafe fn destroy_context(&self, context: TypedView<ImGuiContext>) {
        (self.functions.destroy_context)(context.as_ptr())
    }

    /// Draw data of the last rendered frame, `None` before the first render.
    pub fn draw_data(&self) -> Option<TypedView<ImDrawData>> {
        // Safety: the library owns the draw data until the next NewFrame
        unsafe { TypedView::from_ptr((self.functions.get_draw_data)()) }.get()
    }

    /// Begin a window. With `open`, the window gets a close button that
    /// clears the flag.
    pub fn begin(&self, name: &str, open: Option<&mut bool>, flags: i32) -> bool {
        let open = open.map_or(std::ptr::null_mut(), |flag| flag as *mut bool);
        // Safety: name buffer and open flag both outlive the call
        marshal::with_foreign_str(name, |name| unsafe { (self.functions.begin)(name, open, flags) })
    }

    pub fn end(&self) {
        // Safety: no arguments
        unsafe { (self.functions.end)() }
    }

    pub fn button(&self, label: &str, size: ImVec2) -> bool {
        // Safety: label buffer outlives the call
        marshal::with_foreign_str(label, |label| unsafe { (self.functions.button)(label, size) })
    }

    /// Raw text, passed as a `(begin, end)` range so no formatting is applied.
    pub fn text(&self, text: &str) {
        // Safety: both pointers bound the same live buffer
        marshal::with_foreign_range(text, |begin, end| unsafe {
            (self.functions.text_unformatted)(begin, end)
        })
    }
}
