//! Field accessors on views of the ImGui mirrors.

use std::mem::offset_of;

use super::types::{
    ImDrawCmd, ImDrawData, ImDrawIdx, ImDrawList, ImDrawVert, ImGuiTextFilter, ImGuiTextRange, ImVec2,
    ImVec4, TEXT_FILTER_INPUT_LEN,
};
use crate::marshal;
use crate::view::{native_view, Addressing, InlineBuffer, NativeHandle, NativeLayout, NativeVector, PointerArray, TypedView};

native_view!(ImDrawData {
    /// False until the frame has been rendered.
    valid / set_valid: bool,
    cmd_lists_count / set_cmd_lists_count: i32,
    total_idx_count / set_total_idx_count: i32,
    total_vtx_count / set_total_vtx_count: i32,
    display_pos / set_display_pos: ImVec2,
    display_size / set_display_size: ImVec2,
    framebuffer_scale / set_framebuffer_scale: ImVec2,
});

impl TypedView<ImDrawData> {
    /// The frame's draw lists: an `ImVector<ImDrawList*>`.
    pub fn cmd_lists(&self) -> PointerArray<ImDrawList> {
        // Safety: CmdLists is an ImVector of ImDrawList pointers
        unsafe {
            PointerArray::from_vector(
                self.embedded(offset_of!(ImDrawData, cmd_lists)),
                Addressing::Indirect,
            )
        }
    }

    pub fn owner_viewport(&self) -> NativeHandle {
        // Safety: pointer field of the mirror
        unsafe { self.field(offset_of!(ImDrawData, owner_viewport)) }
    }
}

native_view!(ImDrawList {
    flags / set_flags: i32,
    vtx_current_idx / set_vtx_current_idx: u32,
    fringe_scale / set_fringe_scale: f32,
});

impl TypedView<ImDrawList> {
    pub fn cmd_buffer(&self) -> NativeVector<ImDrawCmd> {
        // Safety: ImVector<ImDrawCmd> header
        unsafe { self.vector(offset_of!(ImDrawList, cmd_buffer)) }
    }

    pub fn idx_buffer(&self) -> NativeVector<ImDrawIdx> {
        // Safety: ImVector<ImDrawIdx> header
        unsafe { self.vector(offset_of!(ImDrawList, idx_buffer)) }
    }

    pub fn vtx_buffer(&self) -> NativeVector<ImDrawVert> {
        // Safety: ImVector<ImDrawVert> header
        unsafe { self.vector(offset_of!(ImDrawList, vtx_buffer)) }
    }

    pub fn clip_rect_stack(&self) -> NativeVector<ImVec4> {
        // Safety: ImVector<ImVec4> header
        unsafe { self.vector(offset_of!(ImDrawList, clip_rect_stack)) }
    }

    pub fn path(&self) -> NativeVector<ImVec2> {
        // Safety: ImVector<ImVec2> header
        unsafe { self.vector(offset_of!(ImDrawList, path)) }
    }

    /// Positions of every vertex, read in place.
    ///
    /// `pos` is the first member of `ImDrawVert`, so each position lives at
    /// `Data + i * sizeof(ImDrawVert)`.
    pub fn vertex_positions(&self) -> PointerArray<ImVec2> {
        // Safety: VtxBuffer holds packed ImDrawVert whose pos sits at offset 0
        unsafe {
            PointerArray::from_vector(
                self.embedded(offset_of!(ImDrawList, vtx_buffer)),
                Addressing::Strided {
                    stride: ImDrawVert::SIZE,
                },
            )
        }
    }

    /// Debug name of the owning window; empty when unset.
    pub fn owner_name(&self) -> String {
        // Safety: const char* field, null or NUL-terminated
        unsafe { self.c_str_field(offset_of!(ImDrawList, owner_name)) }
    }
}

native_view!(ImDrawCmd {
    clip_rect / set_clip_rect: ImVec4,
    texture_id / set_texture_id: NativeHandle,
    vtx_offset / set_vtx_offset: u32,
    idx_offset / set_idx_offset: u32,
    elem_count / set_elem_count: u32,
});

impl TypedView<ImDrawCmd> {
    pub fn has_callback(&self) -> bool {
        // Safety: function pointer field, compared against null only
        let callback: NativeHandle = unsafe { self.field(offset_of!(ImDrawCmd, user_callback)) };
        !callback.is_null()
    }
}

impl TypedView<ImGuiTextRange> {
    pub fn begin(&self) -> NativeHandle {
        // Safety: pointer field of the mirror
        unsafe { self.field(offset_of!(ImGuiTextRange, b)) }
    }

    pub fn end(&self) -> NativeHandle {
        // Safety: pointer field of the mirror
        unsafe { self.field(offset_of!(ImGuiTextRange, e)) }
    }

    pub fn is_empty(&self) -> bool {
        self.begin() == self.end()
    }

    /// Text of the range, decoded without relying on a terminator.
    pub fn text(&self) -> String {
        // Safety: the filter keeps b..e inside its own input buffer
        unsafe { marshal::from_foreign_range(self.begin().cast(), self.end().cast()) }
    }
}

native_view!(ImGuiTextFilter {
    count_grep / set_count_grep: i32,
});

impl TypedView<ImGuiTextFilter> {
    /// The raw `InputBuf`, edited in place by the input widget.
    pub fn input_buf(&self) -> InlineBuffer<u8, TEXT_FILTER_INPUT_LEN> {
        // Safety: char[256] at this offset
        unsafe { self.inline(offset_of!(ImGuiTextFilter, input_buf)) }
    }

    /// Ranges produced by the last `Build()`, pointing into `input_buf`.
    pub fn filters(&self) -> NativeVector<ImGuiTextRange> {
        // Safety: ImVector<ImGuiTextRange> header
        unsafe { self.vector(offset_of!(ImGuiTextFilter, filters)) }
    }
}
