use super::*;

#[derive(Debug)]
struct Rec(u32, &'static str);

impl PageScoped for Rec {
    fn page(&self) -> PageNumber {
        PageNumber::new(self.0).unwrap()
    }
}

#[test]
fn groups_by_page_preserving_order() {
    let idx = PageIndex::from_records([Rec(2, "a"), Rec(1, "b"), Rec(2, "c")]);
    assert_eq!(idx.len(), 3);
    assert!(!idx.is_empty());
    let p2: Vec<_> = idx
        .for_page(PageNumber::new(2).unwrap())
        .iter()
        .map(|r| r.1)
        .collect();
    assert_eq!(p2, vec!["a", "c"]);
    assert!(idx.for_page(PageNumber::new(9).unwrap()).is_empty());
}
