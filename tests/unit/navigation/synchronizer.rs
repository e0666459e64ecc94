use super::*;
use crate::discovery::loader::EndReason;
use crate::foundation::core::Viewport;
use crate::state::RenderState;
use crate::view::InMemoryView;
use std::time::Duration;

fn page(n: u32) -> PageNumber {
    PageNumber::new(n).unwrap()
}

fn setup() -> (Rc<GalleryState>, Rc<InMemoryView>, NavigationSynchronizer<Rc<InMemoryView>>) {
    let state = Rc::new(GalleryState::new());
    let view = Rc::new(InMemoryView::new(Viewport::new(1024.0, 768.0)));
    let nav = NavigationSynchronizer::new(Rc::clone(&state), Rc::clone(&view));
    (state, view, nav)
}

fn render(state: &GalleryState, view: &InMemoryView, p: PageNumber, end: RenderState) {
    let slot = view.create_slot(p).unwrap();
    state.insert_record(p, slot).unwrap();
    state.transition(p, RenderState::Loading).unwrap();
    state.transition(p, end).unwrap();
    let handle = state.record(p).unwrap().into();
    state.notify_page(p, handle);
}

#[test]
fn deep_links() {
    assert_eq!(parse_deep_link("#page-12"), Some(page(12)));
    assert_eq!(parse_deep_link("#7"), Some(page(7)));
    assert_eq!(parse_deep_link("?page=3"), Some(page(3)));
    assert_eq!(parse_deep_link("?lang=en&page=41&x=1"), Some(page(41)));
    assert_eq!(parse_deep_link(" 9 "), Some(page(9)));
    assert_eq!(parse_deep_link("#page-0"), None);
    assert_eq!(parse_deep_link("?lang=en"), None);
    assert_eq!(parse_deep_link("#intro"), None);
    assert_eq!(parse_deep_link(""), None);
}

#[tokio::test]
async fn page_zero_is_invalid() {
    let (_, view, nav) = setup();
    assert_eq!(nav.navigate_to(0).await.unwrap(), NavigationOutcome::Invalid);
    assert!(view.loading_history().is_empty());
    assert!(view.scrolls().is_empty());
}

#[tokio::test]
async fn rendered_page_scrolls_immediately() {
    let (state, view, nav) = setup();
    render(&state, &view, page(1), RenderState::Ready);
    assert_eq!(
        nav.navigate_to(1).await.unwrap(),
        NavigationOutcome::Arrived {
            page: page(1),
            waited: false
        }
    );
    assert_eq!(view.scrolls(), vec![page(1)]);
    assert!(view.loading_history().is_empty());
}

#[tokio::test]
async fn failed_page_still_counts_as_arrived() {
    let (state, view, nav) = setup();
    render(&state, &view, page(2), RenderState::Failed);
    let handle = nav.wait_for_page(page(2)).await.unwrap();
    assert_eq!(handle.state, RenderState::Failed);
}

#[tokio::test(start_paused = true)]
async fn waits_for_a_page_still_loading() {
    let (state, view, nav) = setup();
    let producer = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(state.pending_waiters(page(5)), 1);
        render(&state, &view, page(5), RenderState::Ready);
    };
    let (outcome, ()) = tokio::join!(nav.navigate_to(5), producer);
    assert_eq!(
        outcome.unwrap(),
        NavigationOutcome::Arrived {
            page: page(5),
            waited: true
        }
    );
    assert_eq!(view.loading_history(), vec![true, false]);
    assert_eq!(view.scrolls(), vec![page(5)]);
    assert_eq!(state.waiter_count(), 0);
}

#[tokio::test]
async fn missing_page_after_load_is_not_found_without_waiting() {
    let (state, view, nav) = setup();
    render(&state, &view, page(1), RenderState::Ready);
    render(&state, &view, page(3), RenderState::Ready);
    state.mark_all_loaded(EndReason::Exhausted);

    // A gap and a page past the end both resolve immediately.
    assert_eq!(nav.wait_for_page(page(2)).await, None);
    assert_eq!(
        nav.navigate_to(40).await.unwrap(),
        NavigationOutcome::NotFound(page(40))
    );
    assert_eq!(view.not_found(), vec![page(40)]);
    assert_eq!(view.loading_history(), vec![true, false]);
    assert_eq!(state.waiter_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn flushed_waiters_report_not_found() {
    let (state, view, nav) = setup();
    let finisher = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        state.mark_all_loaded(EndReason::Exhausted);
        assert_eq!(state.flush_waiters(), 2);
    };
    let (a, b, ()) = tokio::join!(nav.navigate_to(8), nav.wait_for_page(page(8)), finisher);
    assert_eq!(a.unwrap(), NavigationOutcome::NotFound(page(8)));
    assert_eq!(b, None);
    assert_eq!(view.not_found(), vec![page(8)]);
}

#[tokio::test(start_paused = true)]
async fn waiter_events_are_emitted() {
    let (state, _view, nav) = setup();
    let sink = Rc::new(crate::events::RecordingSink::new());
    let nav = nav.with_events(Events::new(sink.clone()));
    let finisher = async {
        tokio::task::yield_now().await;
        state.flush_waiters();
    };
    let (r, ()) = tokio::join!(nav.wait_for_page(page(4)), finisher);
    assert_eq!(r, None);
    assert_eq!(
        sink.events(),
        vec![GalleryEvent::WaiterRegistered { page: page(4) }]
    );
}
