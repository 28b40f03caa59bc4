//! Integration tests for the deck aggregator against in-memory backends.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cardroom_deck::{DeckAggregator, DeckView};
use cardroom_protocol::{
    CardId, CardPlacement, CardPosition, CatalogCard, DeckName, DeckSummary, GameRoomRecord,
    RoomId,
};
use cardroom_transport::{
    CatalogReader, Diagnostic, DiscardStage, MemorySink, PlacementReader, RoomReader,
    TransportError,
};
use serde_json::json;

// =========================================================================
// In-memory backend
// =========================================================================

/// One fake backend serving all three resources, counting every read.
#[derive(Default)]
struct Backend {
    rooms: HashMap<RoomId, GameRoomRecord>,
    top_discard: HashMap<RoomId, CardPlacement>,
    decks: HashMap<(RoomId, String), Vec<CardPlacement>>,
    cards: HashMap<CardId, CatalogCard>,
    /// Lookup latency per card, to shuffle completion order.
    card_delay: HashMap<CardId, Duration>,
    fail_placements: bool,
    room_reads: AtomicUsize,
    placement_reads: AtomicUsize,
    catalog_reads: AtomicUsize,
}

impl RoomReader for Backend {
    async fn get_room(&self, room: RoomId) -> Result<GameRoomRecord, TransportError> {
        self.room_reads.fetch_add(1, Ordering::SeqCst);
        self.rooms
            .get(&room)
            .cloned()
            .ok_or_else(|| TransportError::http(404, Some("Game not found")))
    }
}

impl PlacementReader for Backend {
    async fn top_discard(&self, room: RoomId) -> Result<Option<CardPlacement>, TransportError> {
        self.placement_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_placements {
            return Err(TransportError::http(500, None::<String>));
        }
        Ok(self.top_discard.get(&room).cloned())
    }

    async fn placements_in_deck(
        &self,
        room: RoomId,
        deck: &DeckName,
    ) -> Result<Vec<CardPlacement>, TransportError> {
        self.placement_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_placements {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(self
            .decks
            .get(&(room, deck.as_str().to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

impl CatalogReader for Backend {
    async fn get_card(&self, card: CardId) -> Result<CatalogCard, TransportError> {
        self.catalog_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.card_delay.get(&card) {
            tokio::time::sleep(*delay).await;
        }
        self.cards
            .get(&card)
            .cloned()
            .ok_or_else(|| TransportError::http(404, Some("Card not found")))
    }
}

type SharedAggregator = DeckAggregator<Arc<Backend>, Arc<Backend>, Arc<Backend>>;

fn aggregator(backend: &Arc<Backend>) -> (SharedAggregator, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let agg = DeckAggregator::new(
        Arc::clone(backend),
        Arc::clone(backend),
        Arc::clone(backend),
    )
    .with_sink(sink.clone());
    (agg, sink)
}

// =========================================================================
// Helpers
// =========================================================================

const ROOM: RoomId = RoomId(1);

fn room(draw: u32, discard: u32) -> GameRoomRecord {
    let mut record = GameRoomRecord::new(ROOM, "Partida 1");
    record.draw_top = draw;
    record.discard_top = discard;
    record
}

fn placement(card: u64, position: CardPosition, order: u32) -> CardPlacement {
    CardPlacement {
        game_id: ROOM,
        card_id: CardId(card),
        card_position: Some(position),
        card_order: Some(order),
    }
}

fn card(id: u64, image: &str, name: &str) -> CatalogCard {
    CatalogCard {
        id: CardId(id),
        name: name.into(),
        description: String::new(),
        image_url: image.into(),
        card_type: None,
    }
}

fn draft_backend(cards: &[u64]) -> Backend {
    let list = cards
        .iter()
        .enumerate()
        .map(|(i, &c)| placement(c, CardPosition::MazoDraft, i as u32 + 1))
        .collect();
    Backend {
        rooms: HashMap::from([(ROOM, room(20, 0))]),
        decks: HashMap::from([((ROOM, "mazo_draft".to_string()), list)]),
        ..Backend::default()
    }
}

// =========================================================================
// Draft enrichment
// =========================================================================

#[tokio::test]
async fn test_enrichment_failure_is_isolated_per_card() {
    let mut backend = draft_backend(&[5, 6]);
    backend.cards.insert(CardId(5), card(5, "i5", "C5"));
    let backend = Arc::new(backend);
    let (agg, sink) = aggregator(&backend);

    let draft = agg.draft_cards_enriched(ROOM).await;

    assert_eq!(draft.len(), 2);
    assert_eq!(draft[0].card_id(), CardId(5));
    assert_eq!(draft[0].image_url.as_deref(), Some("i5"));
    assert_eq!(draft[0].name.as_deref(), Some("C5"));
    assert_eq!(draft[0].card_type, None);
    assert_eq!(draft[1].card_id(), CardId(6));
    assert!(!draft[1].is_enriched());

    // The bare card keeps its placement fields and omits the rest.
    let bare = serde_json::to_value(&draft[1]).unwrap();
    assert_eq!(bare["card_id"], json!(6));
    assert_eq!(bare["card_position"], json!("mazo_draft"));
    assert!(bare.get("image_url").is_none());
    assert!(bare.get("name").is_none());
    assert!(bare.get("type").is_none());

    let reports = sink.take();
    assert_eq!(reports.len(), 1);
    assert!(matches!(
        reports[0],
        Diagnostic::EnrichmentFailed {
            card: CardId(6),
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_enrichment_preserves_placement_order() {
    let mut backend = draft_backend(&[1, 2, 3, 4]);
    for id in 1..=4 {
        backend
            .cards
            .insert(CardId(id), card(id, &format!("/img/{id}.png"), &format!("C{id}")));
        // Earlier cards answer later.
        backend
            .card_delay
            .insert(CardId(id), Duration::from_millis(100 * (5 - id)));
    }
    let backend = Arc::new(backend);
    let (agg, sink) = aggregator(&backend);

    let draft = agg.draft_cards_enriched(ROOM).await;

    let ids: Vec<u64> = draft.iter().map(|c| c.card_id().0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert!(draft.iter().all(|c| c.is_enriched()));
    assert_eq!(backend.catalog_reads.load(Ordering::SeqCst), 4);
    assert!(sink.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_enrichment_lookups_run_concurrently() {
    let mut backend = draft_backend(&[1, 2, 3]);
    for id in 1..=3 {
        backend.cards.insert(CardId(id), card(id, "i", "c"));
        backend.card_delay.insert(CardId(id), Duration::from_secs(1));
    }
    let backend = Arc::new(backend);
    let (agg, _sink) = aggregator(&backend);

    let start = tokio::time::Instant::now();
    let draft = agg.draft_cards_enriched(ROOM).await;

    assert_eq!(draft.len(), 3);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_draft_list_failure_skips_enrichment() {
    let mut backend = draft_backend(&[1, 2]);
    backend.fail_placements = true;
    let backend = Arc::new(backend);
    let (agg, sink) = aggregator(&backend);

    assert!(agg.draft_cards_enriched(ROOM).await.is_empty());
    assert_eq!(backend.catalog_reads.load(Ordering::SeqCst), 0);
    assert!(matches!(
        sink.take().as_slice(),
        [Diagnostic::DraftListFailed { room: ROOM, .. }]
    ));
}

#[tokio::test]
async fn test_empty_draft_deck() {
    let backend = Arc::new(draft_backend(&[]));
    let (agg, sink) = aggregator(&backend);

    assert!(agg.draft_cards_enriched(ROOM).await.is_empty());
    assert!(sink.is_empty());
}

// =========================================================================
// Discard-top chain
// =========================================================================

fn discard_backend() -> Backend {
    Backend {
        rooms: HashMap::from([(ROOM, room(30, 2))]),
        top_discard: HashMap::from([(ROOM, placement(9, CardPosition::MazoDescarte, 2))]),
        cards: HashMap::from([(CardId(9), card(9, "/img/9.png", "Nueve"))]),
        ..Backend::default()
    }
}

#[tokio::test]
async fn test_discard_top_image() {
    let backend = Arc::new(discard_backend());
    let (agg, sink) = aggregator(&backend);

    assert_eq!(agg.discard_top_image(ROOM).await.as_deref(), Some("/img/9.png"));
    assert_eq!(backend.room_reads.load(Ordering::SeqCst), 1);
    assert_eq!(backend.placement_reads.load(Ordering::SeqCst), 1);
    assert_eq!(backend.catalog_reads.load(Ordering::SeqCst), 1);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_discard_chain_stops_at_failed_placement_read() {
    let mut backend = discard_backend();
    backend.fail_placements = true;
    let backend = Arc::new(backend);
    let (agg, sink) = aggregator(&backend);

    assert_eq!(agg.discard_top_image(ROOM).await, None);
    assert_eq!(backend.catalog_reads.load(Ordering::SeqCst), 0);

    let reports = sink.take();
    assert_eq!(reports.len(), 1);
    let Diagnostic::DiscardTopUnavailable { room, stage, error } = &reports[0] else {
        panic!("unexpected diagnostic: {:?}", reports[0]);
    };
    assert_eq!(*room, ROOM);
    assert_eq!(*stage, DiscardStage::Placement);
    assert_eq!(error.to_string(), "HTTP Error 500");
}

#[tokio::test]
async fn test_discard_chain_stops_at_failed_room_read() {
    let backend = Arc::new(discard_backend());
    let (agg, sink) = aggregator(&backend);

    assert_eq!(agg.discard_top_image(RoomId(404)).await, None);
    assert_eq!(backend.placement_reads.load(Ordering::SeqCst), 0);
    assert_eq!(backend.catalog_reads.load(Ordering::SeqCst), 0);
    assert!(matches!(
        sink.take().as_slice(),
        [Diagnostic::DiscardTopUnavailable {
            stage: DiscardStage::Room,
            ..
        }]
    ));
}

#[tokio::test]
async fn test_discard_chain_fails_closed_on_catalog_miss() {
    let mut backend = discard_backend();
    backend.cards.clear();
    let backend = Arc::new(backend);
    let (agg, sink) = aggregator(&backend);

    assert_eq!(agg.discard_top_image(ROOM).await, None);
    assert!(matches!(
        sink.take().as_slice(),
        [Diagnostic::DiscardTopUnavailable {
            stage: DiscardStage::Catalog,
            ..
        }]
    ));
}

#[tokio::test]
async fn test_empty_discard_pile_has_no_image_and_no_report() {
    let mut backend = discard_backend();
    backend.top_discard.clear();
    let backend = Arc::new(backend);
    let (agg, sink) = aggregator(&backend);

    assert_eq!(agg.discard_top_image(ROOM).await, None);
    assert_eq!(backend.catalog_reads.load(Ordering::SeqCst), 0);
    assert!(sink.is_empty());
}

// =========================================================================
// Combined view
// =========================================================================

#[tokio::test]
async fn test_deck_view_degrades_each_part_independently() {
    let mut backend = discard_backend();
    backend.decks.insert(
        (ROOM, "mazo_draft".to_string()),
        vec![
            placement(9, CardPosition::MazoDraft, 1),
            placement(10, CardPosition::MazoDraft, 2),
        ],
    );
    let backend = Arc::new(backend);
    let (agg, sink) = aggregator(&backend);

    let view = agg.deck_view(ROOM).await;

    assert_eq!(
        view.counts,
        Some(DeckSummary {
            draw_top: 30,
            discard_top: 2
        })
    );
    assert_eq!(view.discard_top_image.as_deref(), Some("/img/9.png"));
    assert_eq!(view.draft.len(), 2);
    assert!(view.draft[0].is_enriched());
    assert!(!view.draft[1].is_enriched());
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_deck_view_for_unknown_room() {
    let backend = Arc::new(Backend::default());
    let (agg, sink) = aggregator(&backend);

    assert_eq!(agg.deck_view(RoomId(3)).await, DeckView::default());
    // Counts and discard chain both fail; an unknown deck is just empty.
    assert_eq!(sink.len(), 2);
}
