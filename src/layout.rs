//! Layout Self-Check
//!
//! Compares the struct sizes this crate assumes against the sizes the native
//! library reports about itself. Any disagreement means the binding and the
//! binary were built from different headers.

use log::{debug, error};
use serde::Serialize;

use crate::error::{InteropError, InteropResult};
use crate::view::NativeLayout;

/// A struct size as declared on this side of the ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeclaredLayout {
    pub name: &'static str,
    pub size: usize,
}

impl DeclaredLayout {
    pub fn of<T: NativeLayout>() -> Self {
        Self {
            name: T::NAME,
            size: T::SIZE,
        }
    }
}

/// Check each declared layout against `reported`.
///
/// `reported` returns `None` for names the library does not know; those are
/// skipped. Every mismatch is logged, and the first one is returned as
/// [`InteropError::LayoutMismatch`]. On success, returns how many layouts
/// were actually compared.
pub fn verify_layouts(
    declared: &[DeclaredLayout],
    mut reported: impl FnMut(&str) -> Option<usize>,
) -> InteropResult<usize> {
    let mut checked = 0;
    let mut first_mismatch = None;

    for layout in declared {
        let Some(size) = reported(layout.name) else {
            debug!("library does not report a size for {}", layout.name);
            continue;
        };
        checked += 1;
        if size != layout.size {
            error!(
                "layout mismatch for {}: declared {} bytes, library reports {}",
                layout.name, layout.size, size
            );
            first_mismatch.get_or_insert(InteropError::LayoutMismatch {
                type_name: layout.name.to_string(),
                declared: layout.size,
                reported: size,
            });
        }
    }

    match first_mismatch {
        Some(err) => Err(err),
        None => Ok(checked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> Vec<DeclaredLayout> {
        vec![
            DeclaredLayout { name: "ImVec2", size: 8 },
            DeclaredLayout { name: "ImDrawVert", size: 20 },
            DeclaredLayout { name: "ImGuiIO", size: 5000 },
        ]
    }

    #[test]
    fn test_all_match() {
        let checked = verify_layouts(&declared(), |name| match name {
            "ImVec2" => Some(8),
            "ImDrawVert" => Some(20),
            _ => None,
        })
        .unwrap();
        assert_eq!(checked, 2);
    }

    #[test]
    fn test_first_mismatch_reported() {
        let err = verify_layouts(&declared(), |name| match name {
            "ImVec2" => Some(8),
            "ImDrawVert" => Some(24),
            "ImGuiIO" => Some(4000),
            _ => None,
        })
        .unwrap_err();
        match err {
            InteropError::LayoutMismatch {
                type_name,
                declared,
                reported,
            } => {
                assert_eq!(type_name, "ImDrawVert");
                assert_eq!(declared, 20);
                assert_eq!(reported, 24);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_of_uses_native_layout() {
        let layout = DeclaredLayout::of::<i32>();
        assert_eq!(layout.name, "i32");
        assert_eq!(layout.size, 4);
    }
}
