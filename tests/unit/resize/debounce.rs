use super::*;
use tokio::time::{Instant, sleep};

fn vp(w: f64) -> Viewport {
    Viewport::new(w, 600.0)
}

#[tokio::test(start_paused = true)]
async fn burst_yields_only_the_last_viewport() {
    let (tx, mut d) = ResizeDebouncer::new(Duration::from_millis(150));
    let start = Instant::now();
    let feeder = async {
        for w in [800.0, 700.0, 600.0] {
            tx.send(vp(w)).unwrap();
            sleep(Duration::from_millis(100)).await;
        }
    };
    let (settled, ()) = tokio::join!(d.next_settled(), feeder);
    assert_eq!(settled, Some(vp(600.0)));
    // Last event at 200ms, then a quiet 150ms window.
    assert_eq!(start.elapsed(), Duration::from_millis(350));
}

#[tokio::test(start_paused = true)]
async fn separated_events_settle_separately() {
    let (tx, mut d) = ResizeDebouncer::new(Duration::from_millis(150));
    tx.send(vp(1000.0)).unwrap();
    assert_eq!(d.next_settled().await, Some(vp(1000.0)));
    tx.send(vp(500.0)).unwrap();
    assert_eq!(d.next_settled().await, Some(vp(500.0)));
}

#[tokio::test(start_paused = true)]
async fn closed_channel_ends_the_stream() {
    let (tx, mut d) = ResizeDebouncer::from_config(&GalleryConfig::default());
    assert_eq!(d.window(), Duration::from_millis(150));
    tx.send(vp(320.0)).unwrap();
    drop(tx);
    assert_eq!(d.next_settled().await, Some(vp(320.0)));
    assert_eq!(d.next_settled().await, None);
}
