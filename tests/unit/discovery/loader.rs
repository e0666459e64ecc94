use std::io::Cursor;
use std::rc::Rc;

use super::*;
use crate::discovery::fetch::MemoryFetcher;

fn png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 8, image::Rgba([200, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn cfg(threshold: u32, max_pages: u32) -> GalleryConfig {
    GalleryConfig {
        base: "b".to_owned(),
        prefix: "p".to_owned(),
        pad_width: 2,
        formats: vec![PageFormat::Avif, PageFormat::Webp, PageFormat::Png],
        consecutive_failure_threshold: threshold,
        max_pages,
        fetch_timeout_ms: 1_000,
        ..Default::default()
    }
}

fn path(page: u32, format: PageFormat) -> String {
    AssetLayout::new("b", "p", 2).path(PageNumber::new(page).unwrap(), format)
}

async fn drain<F: PageFetcher>(loader: &mut DiscoveryLoader<F>) -> (Vec<u32>, EndReason) {
    let mut found = Vec::new();
    loop {
        match loader.next().await {
            Discovery::Found(c) => found.push(c.page.get()),
            Discovery::End(reason) => return (found, reason),
        }
    }
}

#[tokio::test]
async fn gap_is_skipped_without_renumbering() {
    let mut f = MemoryFetcher::new();
    for p in [1, 2, 4] {
        f.insert(path(p, PageFormat::Png), png());
    }
    let mut loader = DiscoveryLoader::new(&cfg(2, 100), f);
    let (found, end) = drain(&mut loader).await;
    assert_eq!(found, vec![1, 2, 4]);
    assert_eq!(end, EndReason::Exhausted);
    assert_eq!(loader.stats().last_probed.map(PageNumber::get), Some(6));
}

#[tokio::test]
async fn stops_after_threshold_consecutive_absences() {
    let mut f = MemoryFetcher::new();
    for p in 1..=5 {
        f.insert(path(p, PageFormat::Webp), png());
    }
    let f = Rc::new(f);
    let mut loader = DiscoveryLoader::new(&cfg(5, 100), f.clone());
    let (found, end) = drain(&mut loader).await;
    assert_eq!(found, vec![1, 2, 3, 4, 5]);
    assert_eq!(end, EndReason::Exhausted);
    assert_eq!(loader.stats().last_probed.map(PageNumber::get), Some(10));
    assert!(!f.requests().iter().any(|r| r.contains("p11")));
    // Every absent page tried all three formats.
    let page10: Vec<_> = f
        .requests()
        .into_iter()
        .filter(|r| r.contains("p10"))
        .collect();
    assert_eq!(page10.len(), 3);
}

#[tokio::test]
async fn preferred_format_is_sticky_and_moves_on_success() {
    let mut f = MemoryFetcher::new();
    f.insert(path(1, PageFormat::Webp), png())
        .insert(path(2, PageFormat::Png), png())
        .insert(path(3, PageFormat::Png), png());
    let f = Rc::new(f);
    let mut loader = DiscoveryLoader::new(&cfg(1, 100), f.clone());

    assert!(matches!(loader.next().await, Discovery::Found(_)));
    assert_eq!(loader.preferred_format(), Some(PageFormat::Webp));
    assert_eq!(
        loader.probe_order(),
        vec![PageFormat::Webp, PageFormat::Avif, PageFormat::Png]
    );

    assert!(matches!(loader.next().await, Discovery::Found(_)));
    assert_eq!(loader.preferred_format(), Some(PageFormat::Png));

    assert!(matches!(loader.next().await, Discovery::Found(_)));

    assert_eq!(
        f.requests()[..],
        [
            path(1, PageFormat::Avif),
            path(1, PageFormat::Webp),
            path(2, PageFormat::Webp),
            path(2, PageFormat::Avif),
            path(2, PageFormat::Png),
            path(3, PageFormat::Png),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn transient_failures_fall_through_to_next_format() {
    let mut f = MemoryFetcher::new();
    f.stall(path(1, PageFormat::Avif))
        .fail(path(1, PageFormat::Webp), FetchError::Server(503))
        .insert(path(1, PageFormat::Png), png());
    let sink = Rc::new(crate::events::RecordingSink::new());
    let mut loader =
        DiscoveryLoader::new(&cfg(1, 100), f).with_events(Events::new(sink.clone()));

    let Discovery::Found(c) = loader.next().await else {
        panic!("expected page 1");
    };
    assert_eq!(c.format, PageFormat::Png);
    assert_eq!(c.image.width, 4);
    assert_eq!(c.path, "b/png/p01.png");

    let failures: Vec<_> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            GalleryEvent::ProbeFailed { failure, .. } => Some(failure),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec![ProbeFailure::Timeout, ProbeFailure::Server(503)]);
}

#[tokio::test]
async fn undecodable_payload_counts_as_absent() {
    let mut f = MemoryFetcher::new();
    f.insert(path(1, PageFormat::Avif), b"not really avif".to_vec())
        .insert(path(1, PageFormat::Webp), png());
    let mut loader = DiscoveryLoader::new(&cfg(1, 100), f);
    let Discovery::Found(c) = loader.next().await else {
        panic!("expected page 1");
    };
    assert_eq!(c.format, PageFormat::Webp);
    assert_eq!(
        loader.stats().failures_by_format.get(&PageFormat::Avif),
        Some(&1)
    );
}

#[tokio::test]
async fn empty_source_ends_with_no_content_at_ceiling() {
    let f = Rc::new(MemoryFetcher::new());
    let mut loader = DiscoveryLoader::new(&cfg(1, 3), f.clone());
    let (found, end) = drain(&mut loader).await;
    assert!(found.is_empty());
    assert_eq!(end, EndReason::NoContent);
    assert_eq!(f.requests().len(), 9);
}

#[tokio::test]
async fn ceiling_ends_discovery_with_page_limit() {
    let mut f = MemoryFetcher::new();
    for p in 1..=4 {
        f.insert(path(p, PageFormat::Avif), png());
    }
    let mut loader = DiscoveryLoader::new(&cfg(3, 2), f);
    let (found, end) = drain(&mut loader).await;
    assert_eq!(found, vec![1, 2]);
    assert_eq!(end, EndReason::PageLimit);
}

#[tokio::test]
async fn end_is_sticky_and_does_not_probe_again() {
    let f = Rc::new(MemoryFetcher::new());
    let mut loader = DiscoveryLoader::new(&cfg(1, 1), f.clone());
    assert!(matches!(
        loader.next().await,
        Discovery::End(EndReason::NoContent)
    ));
    let before = f.requests().len();
    assert!(matches!(
        loader.next().await,
        Discovery::End(EndReason::NoContent)
    ));
    assert_eq!(f.requests().len(), before);
    assert_eq!(loader.ended(), Some(EndReason::NoContent));
}

#[tokio::test]
async fn last_representable_page_ends_discovery() {
    let last = PageNumber::new(u32::MAX).unwrap();
    let mut f = MemoryFetcher::new();
    f.insert(path(u32::MAX, PageFormat::Png), png());
    let mut loader = DiscoveryLoader::new(&cfg(3, u32::MAX), f);
    loader.next_page = Some(last);

    assert!(matches!(loader.next().await, Discovery::Found(c) if c.page == last));
    assert!(matches!(
        loader.next().await,
        Discovery::End(EndReason::PageLimit)
    ));
    assert_eq!(loader.stats().attempts, 3);
    assert_eq!(loader.stats().last_probed, Some(last));
}

#[tokio::test]
async fn page_numbers_running_out_without_content_is_no_content() {
    let mut loader = DiscoveryLoader::new(&cfg(3, u32::MAX), MemoryFetcher::new());
    loader.next_page = Some(PageNumber::new(u32::MAX).unwrap());
    assert!(matches!(
        loader.next().await,
        Discovery::End(EndReason::NoContent)
    ));
    assert_eq!(loader.stats().attempts, 3);
}
