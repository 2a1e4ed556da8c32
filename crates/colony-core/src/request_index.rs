use crate::id::{CitizenId, RequestToken};
use crate::request::RequestKind;
use std::collections::{BTreeMap, HashMap};

/// A building's open requests, indexed three ways.
///
/// All three views live in one struct and are only changed together: a token
/// is listed under exactly one kind and exactly one worker, and lists that
/// become empty are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestIndex {
    /// Insertion order within each list is request order.
    by_kind: BTreeMap<RequestKind, Vec<RequestToken>>,
    by_token: HashMap<RequestToken, (RequestKind, CitizenId)>,
    by_worker: BTreeMap<CitizenId, Vec<RequestToken>>,
}

impl RequestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `token`. Returns false (and changes nothing) if it is already tracked.
    pub fn insert(&mut self, kind: RequestKind, token: RequestToken, worker: CitizenId) -> bool {
        if self.by_token.contains_key(&token) {
            return false;
        }
        self.by_token.insert(token, (kind, worker));
        self.by_kind.entry(kind).or_default().push(token);
        self.by_worker.entry(worker).or_default().push(token);
        true
    }

    /// Stop tracking `token` in all three views.
    pub fn remove(&mut self, token: RequestToken) -> Option<(RequestKind, CitizenId)> {
        let (kind, worker) = self.by_token.remove(&token)?;
        remove_from_list(&mut self.by_kind, kind, token);
        remove_from_list(&mut self.by_worker, worker, token);
        Some((kind, worker))
    }

    /// Stop tracking every token of `worker`. Returns them in request order.
    pub fn remove_worker(&mut self, worker: CitizenId) -> Vec<RequestToken> {
        let tokens = self.by_worker.get(&worker).cloned().unwrap_or_default();
        for &token in &tokens {
            self.remove(token);
        }
        tokens
    }

    /// Drop everything. Returns the tokens that were tracked.
    pub fn clear(&mut self) -> Vec<RequestToken> {
        let tokens = self.by_kind.values().flatten().copied().collect();
        self.by_kind.clear();
        self.by_token.clear();
        self.by_worker.clear();
        tokens
    }

    pub fn tokens_of_kind(&self, kind: RequestKind) -> &[RequestToken] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tokens_of_worker(&self, worker: CitizenId) -> &[RequestToken] {
        self.by_worker.get(&worker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn requester_of(&self, token: RequestToken) -> Option<CitizenId> {
        self.by_token.get(&token).map(|&(_, worker)| worker)
    }

    pub fn kind_of(&self, token: RequestToken) -> Option<RequestKind> {
        self.by_token.get(&token).map(|&(kind, _)| kind)
    }

    pub fn contains(&self, token: RequestToken) -> bool {
        self.by_token.contains_key(&token)
    }

    /// Whether any request of `kind` is open.
    pub fn has_kind(&self, kind: RequestKind) -> bool {
        self.by_kind.get(&kind).is_some_and(|tokens| !tokens.is_empty())
    }

    /// True iff the worker has no entry or an empty list.
    ///
    /// The polarity is inverted relative to the name. Save and replication
    /// compatibility depend on the current behaviour, so it is kept.
    pub fn has_worker_open_requests(&self, worker: CitizenId) -> bool {
        self.by_worker
            .get(&worker)
            .is_none_or(|tokens| tokens.is_empty())
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

fn remove_from_list<K: Ord>(map: &mut BTreeMap<K, Vec<RequestToken>>, key: K, token: RequestToken) {
    if let Some(tokens) = map.get_mut(&key) {
        tokens.retain(|&t| t != token);
        if tokens.is_empty() {
            map.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn make_tokens(count: usize) -> (SlotMap<RequestToken, ()>, Vec<RequestToken>) {
        let mut sm: SlotMap<RequestToken, ()> = SlotMap::with_key();
        let ids: Vec<RequestToken> = (0..count).map(|_| sm.insert(())).collect();
        (sm, ids)
    }

    /// Every token is listed once under its kind and once under its worker.
    fn assert_consistent(index: &RequestIndex) {
        let by_kind: usize = index.by_kind.values().map(Vec::len).sum();
        let by_worker: usize = index.by_worker.values().map(Vec::len).sum();
        assert_eq!(by_kind, index.by_token.len());
        assert_eq!(by_worker, index.by_token.len());
        for (&token, &(kind, worker)) in &index.by_token {
            assert!(index.tokens_of_kind(kind).contains(&token));
            assert!(index.tokens_of_worker(worker).contains(&token));
        }
        assert!(index.by_kind.values().all(|l| !l.is_empty()));
        assert!(index.by_worker.values().all(|l| !l.is_empty()));
    }

    #[test]
    fn insert_preserves_request_order() {
        let (_sm, t) = make_tokens(3);
        let mut index = RequestIndex::new();
        index.insert(RequestKind::Tool, t[0], CitizenId(1));
        index.insert(RequestKind::Tool, t[1], CitizenId(2));
        index.insert(RequestKind::Tool, t[2], CitizenId(1));
        assert_eq!(index.tokens_of_kind(RequestKind::Tool), &[t[0], t[1], t[2]]);
        assert_eq!(index.tokens_of_worker(CitizenId(1)), &[t[0], t[2]]);
        assert_eq!(index.requester_of(t[1]), Some(CitizenId(2)));
        assert_consistent(&index);
    }

    #[test]
    fn duplicate_token_rejected() {
        let (_sm, t) = make_tokens(1);
        let mut index = RequestIndex::new();
        assert!(index.insert(RequestKind::Tool, t[0], CitizenId(1)));
        assert!(!index.insert(RequestKind::Food, t[0], CitizenId(2)));
        assert_eq!(index.kind_of(t[0]), Some(RequestKind::Tool));
        assert!(!index.has_kind(RequestKind::Food));
        assert_consistent(&index);
    }

    #[test]
    fn remove_clears_all_three_views() {
        let (_sm, t) = make_tokens(2);
        let mut index = RequestIndex::new();
        index.insert(RequestKind::Stack, t[0], CitizenId(1));
        index.insert(RequestKind::Tool, t[1], CitizenId(1));
        assert_eq!(index.remove(t[0]), Some((RequestKind::Stack, CitizenId(1))));
        assert!(!index.contains(t[0]));
        assert!(!index.has_kind(RequestKind::Stack));
        assert_eq!(index.tokens_of_worker(CitizenId(1)), &[t[1]]);
        assert_consistent(&index);
        assert_eq!(index.remove(t[0]), None);
    }

    #[test]
    fn removing_last_token_empties_index() {
        let (_sm, t) = make_tokens(1);
        let mut index = RequestIndex::new();
        index.insert(RequestKind::Food, t[0], CitizenId(4));
        index.remove(t[0]);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.tokens_of_worker(CitizenId(4)).is_empty());
    }

    #[test]
    fn remove_worker_drops_only_that_worker() {
        let (_sm, t) = make_tokens(3);
        let mut index = RequestIndex::new();
        index.insert(RequestKind::Tool, t[0], CitizenId(1));
        index.insert(RequestKind::Food, t[1], CitizenId(2));
        index.insert(RequestKind::Stack, t[2], CitizenId(1));
        assert_eq!(index.remove_worker(CitizenId(1)), vec![t[0], t[2]]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.requester_of(t[1]), Some(CitizenId(2)));
        assert_consistent(&index);
    }

    #[test]
    fn clear_returns_everything() {
        let (_sm, t) = make_tokens(2);
        let mut index = RequestIndex::new();
        index.insert(RequestKind::Tool, t[0], CitizenId(1));
        index.insert(RequestKind::Food, t[1], CitizenId(2));
        let mut cleared = index.clear();
        cleared.sort();
        let mut expected = t.clone();
        expected.sort();
        assert_eq!(cleared, expected);
        assert!(index.is_empty());
    }

    #[test]
    fn worker_open_requests_reports_inverted() {
        let (_sm, t) = make_tokens(1);
        let mut index = RequestIndex::new();
        assert!(index.has_worker_open_requests(CitizenId(1)));
        index.insert(RequestKind::Tool, t[0], CitizenId(1));
        assert!(!index.has_worker_open_requests(CitizenId(1)));
        assert!(index.has_worker_open_requests(CitizenId(2)));
    }
}
