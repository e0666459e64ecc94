use std::sync::Arc;

use super::*;
use crate::discovery::decode::DecodedPage;

fn candidate(page: u32, w: u32, h: u32) -> ImageCandidate {
    ImageCandidate {
        page: PageNumber::new(page).unwrap(),
        path: format!("png/{page}.png"),
        format: PageFormat::Png,
        image: DecodedPage {
            width: w,
            height: h,
            pixels: Arc::new(image::RgbaImage::new(w, h)),
        },
    }
}

#[tokio::test]
async fn mount_lays_out_to_viewport_width() {
    let view = InMemoryView::new(Viewport::new(400.0, 800.0));
    let c = candidate(1, 800, 1200);
    let slot = view.create_slot(c.page).unwrap();
    let m = view.mount_image(slot, &c).await.unwrap().unwrap();
    assert_eq!(m.natural, Size::new(800.0, 1200.0));
    assert_eq!(m.rendered, Size::new(400.0, 600.0));

    view.set_viewport(Viewport::new(1920.0, 1080.0));
    let m = view.image_metrics(slot).unwrap();
    assert_eq!(m.rendered, Size::new(800.0, 1200.0));
}

#[tokio::test]
async fn failing_and_deferred_pages() {
    let view = InMemoryView::new(Viewport::new(400.0, 800.0));
    let bad = candidate(2, 10, 10);
    let late = candidate(3, 10, 10);
    view.fail_mount(bad.page);
    view.defer_layout(late.page);

    let s2 = view.create_slot(bad.page).unwrap();
    assert!(view.mount_image(s2, &bad).await.is_err());
    view.show_page_fallback(s2, bad.page);

    let s3 = view.create_slot(late.page).unwrap();
    assert_eq!(view.mount_image(s3, &late).await.unwrap(), None);
    assert_eq!(view.image_metrics(s3), None);
    view.finish_layout(late.page);
    assert!(view.image_metrics(s3).is_some());

    assert_eq!(view.slots()[0].content, SlotContent::Fallback);
    assert!(view.scroll_to(SlotId(99)).is_err());
}

#[test]
fn loading_indicator_stays_up_while_any_holder_remains() {
    let view = InMemoryView::new(Viewport::new(400.0, 800.0));
    view.set_loading_indicator(LoadingSource::Initial, true);
    view.set_loading_indicator(LoadingSource::Navigation, true);
    view.set_loading_indicator(LoadingSource::Navigation, true);

    view.set_loading_indicator(LoadingSource::Initial, false);
    assert!(view.loading_visible());
    view.set_loading_indicator(LoadingSource::Navigation, false);
    assert!(view.loading_visible());
    assert_eq!(view.loading_holds(LoadingSource::Navigation), 1);

    view.set_loading_indicator(LoadingSource::Navigation, false);
    assert!(!view.loading_visible());
    // A stray hide is harmless.
    view.set_loading_indicator(LoadingSource::Initial, false);
    assert_eq!(view.loading_history(), vec![true, false]);
}
