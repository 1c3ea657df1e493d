//! `#[repr(C)]` mirrors of the Dear ImGui 1.90 structs the bindings touch.
//!
//! Field order and types follow `imgui.h`; Rust names are snake_case and drop
//! the leading underscore of internal members. Offsets are taken from these
//! mirrors with `offset_of!`, never computed by hand.

use std::ffi::{c_char, c_void};

use crate::view::{DynamicArrayHeader, NativeField, NativeHandle, NativeLayout};

/// Index type of `ImDrawList::IdxBuffer` (default 16-bit build).
pub type ImDrawIdx = u16;

/// Opaque `ImGuiContext`.
pub enum ImGuiContext {}

/// Opaque `ImFontAtlas`.
pub enum ImFontAtlas {}

/// Opaque `ImDrawListSharedData`.
pub enum ImDrawListSharedData {}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImVec2 {
    pub x: f32,
    pub y: f32,
}

impl ImVec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImVec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl ImVec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImDrawVert {
    pub pos: ImVec2,
    pub uv: ImVec2,
    /// Packed RGBA
    pub col: u32,
}

/// Callback slot of `ImDrawCmd`; `None` for ordinary draw commands.
pub type ImDrawCallback = Option<unsafe extern "C" fn(*const ImDrawList, *const ImDrawCmd)>;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImDrawCmd {
    pub clip_rect: ImVec4,
    pub texture_id: *mut c_void,
    pub vtx_offset: u32,
    pub idx_offset: u32,
    pub elem_count: u32,
    pub user_callback: ImDrawCallback,
    pub user_callback_data: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImDrawCmdHeader {
    pub clip_rect: ImVec4,
    pub texture_id: *mut c_void,
    pub vtx_offset: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImDrawListSplitter {
    pub current: i32,
    pub count: i32,
    /// `ImVector<ImDrawChannel>`
    pub channels: DynamicArrayHeader,
}

#[repr(C)]
#[derive(Debug)]
pub struct ImDrawList {
    /// `ImVector<ImDrawCmd>`
    pub cmd_buffer: DynamicArrayHeader,
    /// `ImVector<ImDrawIdx>`
    pub idx_buffer: DynamicArrayHeader,
    /// `ImVector<ImDrawVert>`
    pub vtx_buffer: DynamicArrayHeader,
    pub flags: i32,
    pub vtx_current_idx: u32,
    pub data: *const ImDrawListSharedData,
    pub owner_name: *const c_char,
    pub vtx_write_ptr: *mut ImDrawVert,
    pub idx_write_ptr: *mut ImDrawIdx,
    /// `ImVector<ImVec4>`
    pub clip_rect_stack: DynamicArrayHeader,
    /// `ImVector<ImTextureID>`
    pub texture_id_stack: DynamicArrayHeader,
    /// `ImVector<ImVec2>`
    pub path: DynamicArrayHeader,
    pub cmd_header: ImDrawCmdHeader,
    pub splitter: ImDrawListSplitter,
    pub fringe_scale: f32,
}

#[repr(C)]
#[derive(Debug)]
pub struct ImDrawData {
    pub valid: bool,
    pub cmd_lists_count: i32,
    pub total_idx_count: i32,
    pub total_vtx_count: i32,
    /// `ImVector<ImDrawList*>`
    pub cmd_lists: DynamicArrayHeader,
    pub display_pos: ImVec2,
    pub display_size: ImVec2,
    pub framebuffer_scale: ImVec2,
    pub owner_viewport: NativeHandle,
}

/// `[b, e)` slice of a filter's input buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ImGuiTextRange {
    pub b: *const c_char,
    pub e: *const c_char,
}

/// Length of `ImGuiTextFilter::InputBuf`.
pub const TEXT_FILTER_INPUT_LEN: usize = 256;

#[repr(C)]
#[derive(Debug)]
pub struct ImGuiTextFilter {
    pub input_buf: [c_char; TEXT_FILTER_INPUT_LEN],
    /// `ImVector<ImGuiTextRange>`
    pub filters: DynamicArrayHeader,
    pub count_grep: i32,
}

macro_rules! imgui_layouts {
    ($($ty:ident),* $(,)?) => {
        $(
            unsafe impl NativeLayout for $ty {
                const NAME: &'static str = stringify!($ty);
            }
        )*
    };
}

imgui_layouts!(
    ImVec2,
    ImVec4,
    ImDrawVert,
    ImDrawCmd,
    ImDrawCmdHeader,
    ImDrawListSplitter,
    ImDrawList,
    ImDrawData,
    ImGuiTextRange,
    ImGuiTextFilter,
);

// Plain values, valid for any bit pattern the library stores.
unsafe impl NativeField for ImVec2 {}
unsafe impl NativeField for ImVec4 {}
unsafe impl NativeField for ImDrawVert {}
unsafe impl NativeField for ImDrawCmd {}
unsafe impl NativeField for ImGuiTextRange {}

const _: () = assert!(std::mem::size_of::<ImVec2>() == 8);
const _: () = assert!(std::mem::size_of::<ImVec4>() == 16);
const _: () = assert!(std::mem::size_of::<ImDrawVert>() == 20);
