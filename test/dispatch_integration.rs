//! Startup resolution and the ImGui call surface against a fake embedded cimgui.

mod support;

use cimgui_interop::config::{InteropConfig, PlatformChoice};
use cimgui_interop::dispatch::{self, Dispatcher, DispatcherBuilder, LayoutCheck, Platform};
use cimgui_interop::imgui::{self, ImDrawData, ImGuiApi, ImGuiFunctions, ImVec2};
use cimgui_interop::view::DynamicArrayHeader;
use cimgui_interop::{InteropError, NativeHandle};

use support::{register_fake_libraries, FAKE_CIMGUI, FAKE_VERSION};

fn embedded_config(library: &str) -> InteropConfig {
    let mut config = InteropConfig::default();
    config.library.name = library.to_string();
    config.library.platform = PlatformChoice::Embedded;
    config
}

fn imgui_builder(library: &str) -> DispatcherBuilder {
    register_fake_libraries();
    DispatcherBuilder::from_config(&embedded_config(library))
        .require(ImGuiFunctions::SYMBOLS)
        .layouts(imgui::declared_layouts())
}

#[test]
fn test_process_wide_selection() {
    register_fake_libraries();
    assert!(matches!(dispatch::global(), Err(InteropError::NotInitialized)));

    let (dispatcher, ui) = imgui::init(&embedded_config(FAKE_CIMGUI)).unwrap();
    assert_eq!(dispatcher.library_name(), FAKE_CIMGUI);
    assert_eq!(dispatcher.platform(), Platform::Embedded);
    assert_eq!(dispatcher.layout_check(), LayoutCheck::Verified(imgui::declared_layouts().len()));

    // Never re-evaluated: a different config still yields the first dispatcher
    let again = dispatch::select_implementation(&embedded_config("partialCimgui"), &["igButton"], &[]).unwrap();
    assert!(std::ptr::eq(dispatcher, again));
    assert!(std::ptr::eq(dispatcher, dispatch::global().unwrap()));

    // ...but later binding sets are still checked against what it bound
    let subset = dispatch::select_implementation(&embedded_config(FAKE_CIMGUI), &["igBegin"], &[]).unwrap();
    assert!(std::ptr::eq(dispatcher, subset));
    match dispatch::select_implementation(&embedded_config(FAKE_CIMGUI), &["igBegin", "DoesNotExist"], &[]) {
        Err(InteropError::SymbolNotFound { symbol, library }) => {
            assert_eq!(symbol, "DoesNotExist");
            assert_eq!(library, FAKE_CIMGUI);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(std::ptr::eq(dispatcher, dispatch::global().unwrap()));

    let spare = imgui_builder(FAKE_CIMGUI).build().unwrap();
    assert!(matches!(dispatch::install(spare), Err(InteropError::AlreadyInitialized)));

    // Call surface
    support::take_calls();
    assert_eq!(ui.version(), FAKE_VERSION);

    let context = ui.create_context();
    assert!(!context.is_null());
    assert_eq!(support::context_frame(context.as_ptr()), 0);

    let mut open = true;
    assert!(ui.begin("Closable", Some(&mut open), 0));
    assert!(!open);
    assert!(ui.button("OK", ImVec2::new(80.0, 20.0)));
    assert!(!ui.button("Cancel", ImVec2::default()));
    ui.text("héllo, world");
    ui.end();
    assert!(!ui.begin("Collapsed", None, 32));
    ui.end();
    unsafe { ui.destroy_context(context) };

    assert_eq!(
        support::take_calls(),
        vec![
            "igCreateContext",
            "igBegin(Closable, 0)",
            "igButton(OK, 80x20)",
            "igButton(Cancel, 0x0)",
            "igTextUnformatted(héllo, world)",
            "igEnd",
            "igBegin(Collapsed, 32)",
            "igEnd",
            "igDestroyContext",
        ]
    );
}

#[test]
fn test_missing_export_exposes_no_dispatcher() {
    let err = imgui_builder("partialCimgui").build().unwrap_err();
    match &err {
        InteropError::SymbolNotFound { symbol, library } => {
            assert_eq!(symbol, "igCreateContext");
            assert_eq!(library, "partialCimgui");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(err.is_fatal());
}

#[test]
fn test_layout_skew_aborts_startup() {
    let err = imgui_builder("skewedCimgui").build().unwrap_err();
    match err {
        InteropError::LayoutMismatch {
            type_name,
            declared,
            reported,
        } => {
            assert_eq!(type_name, "ImDrawList");
            assert_eq!(declared, std::mem::size_of::<imgui::ImDrawList>());
            assert_eq!(reported, 208);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_layout_check_can_be_disabled() {
    register_fake_libraries();
    let mut config = embedded_config("skewedCimgui");
    config.layout.verify = false;
    let dispatcher = DispatcherBuilder::from_config(&config)
        .require(ImGuiFunctions::SYMBOLS)
        .layouts(imgui::declared_layouts())
        .build()
        .unwrap();
    assert_eq!(dispatcher.layout_check(), LayoutCheck::Skipped);
}

#[test]
fn test_missing_library_diagnostic() {
    register_fake_libraries();
    let err = Dispatcher::builder("cimgui_missing")
        .platform(Platform::Embedded)
        .build()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("cimgui_missing"));
    assert!(message.contains("embedded"));
    assert!(message.contains(FAKE_CIMGUI));
}

#[test]
fn test_draw_data_through_api() {
    let dispatcher = imgui_builder(FAKE_CIMGUI).build().unwrap();
    let ui = ImGuiApi::load(&dispatcher).unwrap();

    support::set_draw_data(std::ptr::null_mut());
    assert!(ui.draw_data().is_none());

    let mut data = ImDrawData {
        valid: true,
        cmd_lists_count: 0,
        total_idx_count: 0,
        total_vtx_count: 0,
        cmd_lists: DynamicArrayHeader::empty(),
        display_pos: ImVec2::default(),
        display_size: ImVec2::new(800.0, 600.0),
        framebuffer_scale: ImVec2::new(2.0, 2.0),
        owner_viewport: NativeHandle::NULL,
    };
    support::set_draw_data(&mut data);

    let view = ui.draw_data().unwrap();
    assert!(view.valid());
    assert_eq!(view.framebuffer_scale(), ImVec2::new(2.0, 2.0));
    assert!(view.cmd_lists().is_empty());
    assert_eq!(view.cmd_lists().iter().count(), 0);

    support::set_draw_data(std::ptr::null_mut());
}

#[test]
fn test_symbol_addresses_stable() {
    let dispatcher = imgui_builder(FAKE_CIMGUI).build().unwrap();
    for symbol in ImGuiFunctions::SYMBOLS {
        let first = dispatcher.symbol_address(symbol).unwrap();
        assert!(!first.is_null());
        assert_eq!(first, dispatcher.symbol_address(symbol).unwrap());
        assert_eq!(Some(first.address()), dispatcher.library().symbol_address(symbol));
    }
}
