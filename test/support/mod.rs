//! A fake cimgui linked into the test binary and registered as an
//! embedded library.

#![allow(dead_code)]

use std::ffi::{c_char, CStr};
use std::sync::atomic::{AtomicPtr, Ordering};

use cimgui_interop::dispatch::{register_embedded, EmbeddedLibrary};
use cimgui_interop::imgui::{self, ImDrawData, ImFontAtlas, ImGuiContext, ImVec2};
use lazy_static::lazy_static;
use parking_lot::Mutex;

pub const FAKE_CIMGUI: &str = "fakeCimgui";
pub const FAKE_VERSION: &str = "1.90.0";

lazy_static! {
    static ref CALLS: Mutex<Vec<String>> = Mutex::new(Vec::new());
}

static DRAW_DATA: AtomicPtr<ImDrawData> = AtomicPtr::new(std::ptr::null_mut());

/// Native calls recorded so far, drained.
pub fn take_calls() -> Vec<String> {
    std::mem::take(&mut *CALLS.lock())
}

/// Make `igGetDrawData` return `data` (null to clear).
pub fn set_draw_data(data: *mut ImDrawData) {
    DRAW_DATA.store(data, Ordering::SeqCst);
}

fn record(call: String) {
    CALLS.lock().push(call);
}

unsafe fn text(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

struct FakeContext {
    frame: u64,
}

extern "C" fn ig_get_version() -> *const c_char {
    c"1.90.0".as_ptr()
}

extern "C" fn ig_create_context(_atlas: *mut ImFontAtlas) -> *mut ImGuiContext {
    record("igCreateContext".to_string());
    Box::into_raw(Box::new(FakeContext { frame: 0 })) as *mut ImGuiContext
}

unsafe extern "C" fn ig_destroy_context(context: *mut ImGuiContext) {
    record("igDestroyContext".to_string());
    if !context.is_null() {
        drop(Box::from_raw(context as *mut FakeContext));
    }
}

extern "C" fn ig_get_draw_data() -> *mut ImDrawData {
    DRAW_DATA.load(Ordering::SeqCst)
}

unsafe extern "C" fn ig_begin(name: *const c_char, open: *mut bool, flags: i32) -> bool {
    let name = text(name);
    record(format!("igBegin({name}, {flags})"));
    // A "Closable" window reports its close button as clicked
    if name == "Closable" && !open.is_null() {
        *open = false;
    }
    name != "Collapsed"
}

extern "C" fn ig_end() {
    record("igEnd".to_string());
}

unsafe extern "C" fn ig_button(label: *const c_char, size: ImVec2) -> bool {
    let label = text(label);
    record(format!("igButton({label}, {}x{})", size.x, size.y));
    label == "OK"
}

unsafe extern "C" fn ig_text_unformatted(begin: *const c_char, end: *const c_char) {
    let len = end.offset_from(begin) as usize;
    let bytes = std::slice::from_raw_parts(begin as *const u8, len);
    record(format!("igTextUnformatted({})", String::from_utf8_lossy(bytes)));
}

/// Reports this crate's own declared sizes, so the self-check passes.
unsafe extern "C" fn cimgui_size_of(name: *const c_char) -> usize {
    let name = text(name);
    imgui::declared_layouts()
        .iter()
        .find(|layout| layout.name == name)
        .map_or(0, |layout| layout.size)
}

/// Like [`cimgui_size_of`], but from a build whose `ImDrawList` grew a field.
unsafe extern "C" fn skewed_size_of(name: *const c_char) -> usize {
    match text(name).as_str() {
        "ImDrawList" => 208,
        other => imgui::declared_layouts()
            .iter()
            .find(|layout| layout.name == other)
            .map_or(0, |layout| layout.size),
    }
}

fn fake_library(name: &str) -> EmbeddedLibrary {
    EmbeddedLibrary::new(name)
        .with_export("igGetVersion", ig_get_version as *const ())
        .with_export("igCreateContext", ig_create_context as *const ())
        .with_export("igDestroyContext", ig_destroy_context as *const ())
        .with_export("igGetDrawData", ig_get_draw_data as *const ())
        .with_export("igBegin", ig_begin as *const ())
        .with_export("igEnd", ig_end as *const ())
        .with_export("igButton", ig_button as *const ())
        .with_export("igTextUnformatted", ig_text_unformatted as *const ())
}

/// Register the complete fake library plus two broken variants:
/// `partialCimgui` (only `igGetVersion`, `igBegin` and `igEnd`) and
/// `skewedCimgui` (wrong `ImDrawList` size).
pub fn register_fake_libraries() {
    register_embedded(fake_library(FAKE_CIMGUI).with_export("cimguiSizeOf", cimgui_size_of as *const ()));

    let mut partial = EmbeddedLibrary::new("partialCimgui");
    for (symbol, address) in [
        ("igGetVersion", ig_get_version as *const ()),
        ("igBegin", ig_begin as *const ()),
        ("igEnd", ig_end as *const ()),
    ] {
        partial.export(symbol, address);
    }
    register_embedded(partial);

    register_embedded(fake_library("skewedCimgui").with_export("cimguiSizeOf", skewed_size_of as *const ()));
}

pub fn context_frame(context: *mut ImGuiContext) -> u64 {
    // Safety: contexts handed out by the fake are boxed FakeContext values
    unsafe { (*(context as *mut FakeContext)).frame }
}
