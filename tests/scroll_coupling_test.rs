use std::sync::Arc;

use folio::test_utils::{FakeLoader, FakePdf, RecordingSurface};
use folio::viewer::{PageViewController, RenderSurface, ScrollDelta, ViewerConfig};

fn viewer(config: ViewerConfig) -> PageViewController<RecordingSurface> {
    let loader = FakeLoader::new().with_document("doc.pdf", FakePdf::letter(3));
    // Half a page visible, each wheel notch moves 0.3 of the page
    let mut viewer = PageViewController::new(Arc::new(loader), RecordingSurface::new(), config);
    viewer.open("doc.pdf").unwrap();
    viewer
}

#[test]
fn scrolling_down_turns_page_once_bottom_is_reached() {
    let mut viewer = viewer(ViewerConfig::default());

    assert!(!viewer.handle_scroll(ScrollDelta::down()));
    assert_eq!(viewer.state().page_index, 0);
    assert!(viewer.surface().scroll_position().top > 0.0);

    assert!(viewer.handle_scroll(ScrollDelta::down()));
    assert_eq!(viewer.state().page_index, 1);
    assert_eq!(viewer.surface().scroll_position().top, 0.0);
}

#[test]
fn scrolling_up_from_top_goes_back_a_page() {
    let mut viewer = viewer(ViewerConfig::default());
    viewer.next_page();
    viewer.surface_mut().set_top(0.5);

    assert!(!viewer.handle_scroll(ScrollDelta::up()));
    assert_eq!(viewer.state().page_index, 1);

    assert!(viewer.handle_scroll(ScrollDelta::up()));
    assert_eq!(viewer.state().page_index, 0);
}

#[test]
fn boundary_pages_do_not_wrap() {
    let mut viewer = viewer(ViewerConfig::default());

    assert!(!viewer.handle_scroll(ScrollDelta::up()));
    assert_eq!(viewer.state().page_index, 0);

    viewer.go_to_page(2);
    for _ in 0..5 {
        viewer.handle_scroll(ScrollDelta::down());
    }
    assert_eq!(viewer.state().page_index, 2);
}

#[test]
fn ctrl_wheel_zooms_instead_of_scrolling() {
    let mut viewer = viewer(ViewerConfig::default());
    let zoom = viewer.state().zoom.factor();

    assert!(viewer.handle_scroll(ScrollDelta::up().with_ctrl()));
    assert!((viewer.state().zoom.factor() - zoom * 1.1).abs() < 1e-4);

    assert!(viewer.handle_scroll(ScrollDelta::down().with_ctrl()));
    assert!((viewer.state().zoom.factor() - zoom * 1.1 * 0.9).abs() < 1e-4);

    assert_eq!(viewer.surface().scroll_position().top, 0.0);
    assert_eq!(viewer.state().page_index, 0);
}

#[test]
fn disabled_coupling_only_scrolls() {
    let mut viewer = viewer(ViewerConfig {
        scroll_page_turn: false,
        ..ViewerConfig::default()
    });

    for _ in 0..10 {
        assert!(!viewer.handle_scroll(ScrollDelta::down()));
    }
    assert_eq!(viewer.state().page_index, 0);
    assert_eq!(viewer.surface().scroll_position().bottom, 1.0);
}

#[test]
fn scroll_without_document_is_ignored() {
    let mut viewer = PageViewController::new(
        Arc::new(FakeLoader::new()),
        RecordingSurface::new(),
        ViewerConfig::default(),
    );

    assert!(!viewer.handle_scroll(ScrollDelta::down()));
    assert!(!viewer.handle_scroll(ScrollDelta::up().with_ctrl()));
    assert!(viewer.surface().frames.is_empty());
}
