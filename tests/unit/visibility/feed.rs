use super::*;

fn page(n: u32) -> PageNumber {
    PageNumber::new(n).unwrap()
}

#[tokio::test]
async fn repeated_reports_are_dropped() {
    let (tx, mut feed) = VisibilityFeed::subscribe();
    for change in [
        VisibilityChange::left(page(1)),
        VisibilityChange::entered(page(1)),
        VisibilityChange::entered(page(1)),
        VisibilityChange::entered(page(2)),
        VisibilityChange::left(page(1)),
    ] {
        tx.send(change).unwrap();
    }
    drop(tx);

    let mut seen = Vec::new();
    while let Some(c) = feed.next_change().await {
        seen.push((c.page.get(), c.visible));
    }
    assert_eq!(seen, vec![(1, true), (2, true), (1, false)]);
    assert!(!feed.is_visible(page(1)));
    assert!(feed.is_visible(page(2)));
}

#[tokio::test]
async fn closed_feed_ends() {
    let (tx, mut feed) = VisibilityFeed::subscribe();
    drop(tx);
    assert_eq!(feed.next_change().await, None);
}
