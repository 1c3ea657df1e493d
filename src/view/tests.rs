use std::ffi::c_char;
use std::mem::offset_of;

use super::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    visible: bool,
    id: u32,
    alpha: f32,
    title: *const c_char,
    pos: [f32; 2],
}

unsafe impl NativeLayout for Window {
    const NAME: &'static str = "Window";
}

native_view!(Window {
    /// Whether the window is shown.
    visible / set_visible: bool,
    id / set_id: u32,
    alpha / set_alpha: f32,
});

fn window() -> Window {
    Window {
        visible: true,
        id: 7,
        alpha: 0.5,
        title: b"Tools\0".as_ptr() as *const c_char,
        pos: [10.0, 20.0],
    }
}

#[test]
fn test_wrap_address_round_trip() {
    for address in [0usize, 0x10, 0xdead_bee0, usize::MAX & !0xf] {
        let handle = NativeHandle::from_address(address);
        let view: TypedView<Window> = unsafe { TypedView::wrap(handle) };
        assert_eq!(view.address(), handle);
        assert_eq!(view.address().address(), address);
    }
}

#[test]
fn test_null_view_is_absent() {
    let view: TypedView<Window> = TypedView::null();
    assert!(view.is_null());
    assert!(view.get().is_none());
    assert_eq!(view, unsafe { TypedView::wrap(NativeHandle::NULL) });
}

#[test]
#[should_panic(expected = "dereferenced null view")]
fn test_null_view_field_access_panics() {
    let view: TypedView<Window> = TypedView::null();
    view.id();
}

#[test]
fn test_generated_accessors_write_through() {
    let mut raw = window();
    let view = unsafe { TypedView::from_ptr(&mut raw) };

    assert!(view.visible());
    assert_eq!(view.id(), 7);
    assert_eq!(view.alpha(), 0.5);
    assert_eq!(view.size(), std::mem::size_of::<Window>());

    view.set_visible(false);
    view.set_id(9);
    view.set_alpha(1.0);

    assert!(!raw.visible);
    assert_eq!(raw.id, 9);
    assert_eq!(raw.alpha, 1.0);
}

#[test]
fn test_field_helpers() {
    let mut raw = window();
    let view = unsafe { TypedView::from_ptr(&mut raw) };

    unsafe {
        assert_eq!(view.c_str_field(offset_of!(Window, title)), "Tools");
        let pos: InlineBuffer<f32, 2> = view.inline(offset_of!(Window, pos));
        assert_eq!(pos.to_vec(), vec![10.0, 20.0]);

        let title: TypedView<u8> = view.pointee(offset_of!(Window, title));
        assert_eq!(title.read(), b'T');

        let id: TypedView<u32> = view.embedded(offset_of!(Window, id));
        id.write(11);
    }
    assert_eq!(raw.id, 11);
}

#[test]
fn test_null_string_field_is_empty() {
    let mut raw = window();
    raw.title = std::ptr::null();
    let view = unsafe { TypedView::from_ptr(&mut raw) };
    assert_eq!(unsafe { view.c_str_field(offset_of!(Window, title)) }, "");
    assert!(unsafe { view.pointee::<u8>(offset_of!(Window, title)) }.get().is_none());
}

#[test]
fn test_foreign_bool_is_any_nonzero_byte() {
    let mut byte = 2u8;
    let view: TypedView<bool> = unsafe { TypedView::wrap(NativeHandle::from_ptr(&mut byte)) };
    assert!(view.read());

    view.write(false);
    assert_eq!(byte, 0);
    view.write(true);
    assert_eq!(byte, 1);
}

#[test]
fn test_handle_formatting() {
    let handle = NativeHandle::from_address(0x1000);
    assert_eq!(handle.to_string(), "0x1000");
    assert_eq!(format!("{handle:?}"), "NativeHandle(0x1000)");
    assert_eq!(handle.offset(0x20).address(), 0x1020);
    assert!(NativeHandle::default().is_null());
}
